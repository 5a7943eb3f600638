//! Code analysis errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum AnalysisError {
    #[error("No code provided")]
    #[diagnostic(
        code(bb7::analysis::empty_code),
        help("Pass the source in `code` or point `file_path` at a readable file.")
    )]
    EmptyCode,

    #[error("Error reading file '{}': {source}", path.display())]
    #[diagnostic(code(bb7::analysis::read_failed))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(bb7::analysis::invalid_input))]
    InvalidInput { message: String },

    #[error("Python interpreter '{program}' not found on PATH")]
    #[diagnostic(code(bb7::analysis::interpreter_not_found))]
    InterpreterNotFound { program: String },

    #[error("Sandbox failure: {message}")]
    #[diagnostic(code(bb7::analysis::sandbox))]
    Sandbox {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
