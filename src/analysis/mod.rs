//! Static code analysis: regex-driven metrics, pattern review, targeted
//! suggestions, security audits and an isolated Python sandbox.

mod error;
pub mod language;
pub mod metrics;
pub mod render;
pub mod review;
pub mod sandbox;
pub mod security;
pub mod suggestions;
mod tool;

#[cfg(test)]
mod analysis_test;
#[cfg(test)]
mod sandbox_test;

pub use error::{AnalysisError, AnalysisResult};
pub use language::Language;
pub use review::CodeAnalysis;
pub use sandbox::{Sandbox, SandboxOutcome};
pub use security::{AuditLevel, AuditReport, Severity};
pub use suggestions::{FocusArea, SkillLevel};
pub use tool::{CodeAnalyzer, Source, SuggestionReport};
