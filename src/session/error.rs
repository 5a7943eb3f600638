//! Session journal errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum SessionError {
    #[error("Session not found: {id}")]
    #[diagnostic(
        code(bb7::session::not_found),
        help("Use bb7_list_sessions to see known session ids.")
    )]
    NotFound { id: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(bb7::session::validation_error))]
    Validation { message: String },

    #[error("Failed to access {path}: {source}")]
    #[diagnostic(code(bb7::session::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session file {path}: {source}")]
    #[diagnostic(
        code(bb7::session::corrupt),
        help("Remove or repair the file; it is plain JSON.")
    )]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;
