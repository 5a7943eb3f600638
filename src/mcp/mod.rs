//! Model Context Protocol (MCP) server
//!
//! - **server**: [`Toolbox`] of shared services and the [`McpServer`]
//!   dispatching calls across tool families
//! - **tools**: one tool struct per family (memory, session, files, shell,
//!   web, code, project, system)
//! - **service**: Streamable HTTP service and the axum app around it
//! - **security**: loopback, rate limit and API key guard for HTTP
//!
//! Tool structs that touch storage are generic over `D: Database`.

pub mod security;
pub mod server;
mod service;
pub mod tools;

#[cfg(test)]
mod server_test;
#[cfg(test)]
mod service_test;

pub use server::{McpServer, Toolbox};
pub use service::{create_app, create_mcp_service};
