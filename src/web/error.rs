//! Web tool errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum WebError {
    #[error("Invalid URL format: '{url}'")]
    #[diagnostic(
        code(bb7::web::invalid_url),
        help("Provide an http(s) URL with a host, e.g. https://example.com")
    )]
    InvalidUrl { url: String },

    #[error("Network error fetching {url}: {source}")]
    #[diagnostic(code(bb7::web::network))]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {source}")]
    #[diagnostic(code(bb7::web::client))]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status}: {message}")]
    #[diagnostic(code(bb7::web::http_status), help("{suggestion}"))]
    Status {
        status: u16,
        message: String,
        suggestion: String,
    },

    #[error("Content too large: {size} bytes exceeds limit of {max} bytes")]
    #[diagnostic(code(bb7::web::too_large))]
    TooLarge { size: u64, max: u64 },

    #[error("Search engine '{engine}' not supported. Available: {available}")]
    #[diagnostic(code(bb7::web::unsupported_engine))]
    UnsupportedEngine { engine: String, available: String },

    #[error("URL does not point to a webpage (content type: {content_type})")]
    #[diagnostic(code(bb7::web::not_html))]
    NotHtml { content_type: String },

    #[error("File already exists: {}", path.display())]
    #[diagnostic(
        code(bb7::web::already_exists),
        help("Pass overwrite=true to replace it.")
    )]
    AlreadyExists { path: PathBuf },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(bb7::web::invalid_input))]
    InvalidInput { message: String },

    #[error("IO error on {}: {source}", path.display())]
    #[diagnostic(code(bb7::web::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WebError {
    /// Explanation and suggestion for an unsuccessful HTTP status.
    pub fn from_status(status: u16) -> Self {
        let (message, suggestion) = match status {
            400 => (
                "Bad Request - the server couldn't understand the request",
                "Check the URL format and any parameters",
            ),
            401 => (
                "Unauthorized - authentication is required",
                "This resource requires login or an API key",
            ),
            403 => (
                "Forbidden - access to this resource is denied",
                "You don't have permission to access this resource",
            ),
            404 => (
                "Not Found - the requested resource doesn't exist",
                "Check the URL spelling and path",
            ),
            429 => (
                "Too Many Requests - rate limit exceeded",
                "Wait a few moments before trying again",
            ),
            500 => (
                "Internal Server Error - the server encountered an error",
                "This is a server-side issue, try again later",
            ),
            502 => (
                "Bad Gateway - the server received an invalid response",
                "Server configuration issue, try again later",
            ),
            503 => (
                "Service Unavailable - the server is temporarily unavailable",
                "The server may be down for maintenance, try again later",
            ),
            _ => ("Unexpected response status", "Check the URL and try again"),
        };
        WebError::Status {
            status,
            message: message.to_string(),
            suggestion: suggestion.to_string(),
        }
    }
}

pub type WebResult<T> = Result<T, WebError>;
