//! MCP tool implementations
//!
//! One tool struct per family, each with its own router. The server
//! dispatches a call to whichever router owns the tool name.

pub mod code;
pub mod files;
pub mod memory;
pub mod project;
pub mod session;
pub mod shell;
pub mod system;
pub mod web;

#[cfg(test)]
mod code_test;
#[cfg(test)]
mod memory_test;
#[cfg(test)]
mod shell_test;

use std::fmt::Display;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde_json::json;

pub use code::CodeTools;
pub use files::FileTools;
pub use memory::MemoryTools;
pub use project::ProjectTools;
pub use session::SessionTools;
pub use shell::ShellTools;
pub use system::SystemTools;
pub use web::WebTools;

/// Successful markdown result.
pub(crate) fn markdown(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub(crate) fn internal(kind: &'static str, error: impl Display) -> McpError {
    McpError::internal_error(kind, Some(json!({"error": error.to_string()})))
}

pub(crate) fn invalid(error: impl Display) -> McpError {
    McpError::invalid_params(error.to_string(), None)
}

pub(crate) fn not_found(kind: &'static str, error: impl Display) -> McpError {
    McpError::resource_not_found(kind, Some(json!({"error": error.to_string()})))
}

/// Run synchronous filesystem work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, McpError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| internal("task_error", e))
}
