//! Development session journaling.

mod error;
mod manager;
pub mod model;
pub mod render;

#[cfg(test)]
mod manager_test;

pub use error::{SessionError, SessionResult};
pub use manager::{SessionFilter, SessionListing, SessionManager};
pub use model::{Session, SessionDecision, SessionInsight, SessionStatus};
