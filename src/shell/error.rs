//! Shell tool errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ShellError {
    #[error("Shell '{name}' not available. Available: {available}")]
    #[diagnostic(code(bb7::shell::unknown_shell))]
    UnknownShell { name: String, available: String },

    #[error("No shell environments detected")]
    #[diagnostic(
        code(bb7::shell::no_shells),
        help("Install sh or bash and make sure it is on PATH.")
    )]
    NoShells,

    #[error("Working directory not found: {}", path.display())]
    #[diagnostic(code(bb7::shell::working_dir_not_found))]
    WorkingDirNotFound { path: PathBuf },

    #[error("Failed to spawn {program}: {source}")]
    #[diagnostic(code(bb7::shell::spawn_failed))]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(bb7::shell::invalid_input))]
    InvalidInput { message: String },

    #[error("IO error on {}: {source}", path.display())]
    #[diagnostic(code(bb7::shell::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ShellResult<T> = Result<T, ShellError>;
