//! File tool errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum FileError {
    #[error("Path not found: {}", path.display())]
    #[diagnostic(code(bb7::files::not_found))]
    NotFound { path: PathBuf },

    #[error("Path is a directory, not a file: {}", path.display())]
    #[diagnostic(code(bb7::files::not_a_file))]
    NotAFile { path: PathBuf },

    #[error("Path is not a directory: {}", path.display())]
    #[diagnostic(code(bb7::files::not_a_directory))]
    NotADirectory { path: PathBuf },

    #[error("Destination exists: {}", path.display())]
    #[diagnostic(
        code(bb7::files::already_exists),
        help("Pass overwrite=true to replace it.")
    )]
    AlreadyExists { path: PathBuf },

    #[error("File too large ({size} bytes, limit {max} bytes): {}", path.display())]
    #[diagnostic(
        code(bb7::files::too_large),
        help("Raise max_size or pass force_text=true.")
    )]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Directory is not empty: {}", path.display())]
    #[diagnostic(
        code(bb7::files::directory_not_empty),
        help("Pass force=true to delete it recursively.")
    )]
    DirectoryNotEmpty { path: PathBuf },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(bb7::files::invalid_input))]
    InvalidInput { message: String },

    #[error("IO error on {}: {source}", path.display())]
    #[diagnostic(code(bb7::files::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> FileError {
        let path = path.into();
        move |source| FileError::Io { path, source }
    }
}

pub type FileResult<T> = Result<T, FileError>;
