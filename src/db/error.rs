//! Database error types.
//!
//! Storage-backend agnostic errors for the memory store, with miette
//! diagnostics for CLI output.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Entity not found: {entity_type} with id '{id}'")]
    #[diagnostic(code(bb7::db::not_found))]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(bb7::db::validation_error))]
    Validation { message: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(bb7::db::database_error))]
    Database { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(
        code(bb7::db::migration_error),
        help("Delete the memory database or restore a backup if the schema is corrupt.")
    )]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(
        code(bb7::db::connection_error),
        help("Check that the data directory exists and is writable.")
    )]
    Connection { message: String },
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        DbError::Database {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Database {
            message: format!("Failed to (de)serialize column: {}", e),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
