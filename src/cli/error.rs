use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;
use crate::web::WebError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Failed to prepare data directory: {source}")]
    #[diagnostic(
        code(bb7::cli::data_dir),
        help("Check permissions, or point BB7_DATA_DIR / --data-dir somewhere writable.")
    )]
    DataDir {
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    #[diagnostic(code(bb7::cli::database))]
    Database(#[from] DbError),

    #[error("Failed to initialize web client: {0}")]
    #[diagnostic(code(bb7::cli::web))]
    Web(#[from] WebError),

    #[error("Failed to load API key: {source}")]
    #[diagnostic(code(bb7::cli::api_key))]
    ApiKey {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(bb7::cli::bind),
        help("Is another server already listening on this port? Try --port.")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {source}")]
    #[diagnostic(code(bb7::cli::http))]
    Http {
        #[source]
        source: std::io::Error,
    },

    #[error("MCP transport error: {message}")]
    #[diagnostic(code(bb7::cli::transport))]
    Transport { message: String },
}

pub type CliResult<T> = Result<T, CliError>;
