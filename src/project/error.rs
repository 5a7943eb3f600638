//! Project analysis errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ProjectError {
    #[error("Project path not found: {}", path.display())]
    #[diagnostic(code(bb7::project::not_found))]
    NotFound { path: PathBuf },

    #[error("Project path is not a directory: {}", path.display())]
    #[diagnostic(code(bb7::project::not_a_directory))]
    NotADirectory { path: PathBuf },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(bb7::project::invalid_input))]
    InvalidInput { message: String },
}

pub type ProjectResult<T> = Result<T, ProjectError>;
