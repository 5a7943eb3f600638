//! SQLite implementation of the database traits.
//!
//! This module provides a SQLx-backed implementation of the repository
//! traits defined in the parent module.

mod concept;
mod connection;
mod helpers;
mod memory;
mod relationship;

#[cfg(test)]
mod concept_test;
#[cfg(test)]
mod memory_test;

pub use concept::SqliteConceptRepository;
pub use connection::SqliteDatabase;
pub use helpers::now_timestamp;
pub use memory::SqliteMemoryRepository;
pub use relationship::SqliteRelationshipRepository;
