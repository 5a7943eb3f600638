//! Project context: directory inventory, framework detection, manifest
//! parsing and a health score.

pub mod deps;
mod error;
pub mod health;
pub mod languages;
pub mod render;
pub mod scan;
pub mod structure;


pub use deps::{Dependency, DependencyReport, project_dependencies};
pub use error::{ProjectError, ProjectResult};
pub use health::{HealthLevel, HealthReport, health_check};
pub use scan::{Inventory, ScanOptions};
pub use structure::{StructureReport, analyze_structure};
