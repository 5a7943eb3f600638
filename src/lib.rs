//! bb7: an MCP developer toolbox.
//!
//! Persistent memory, session journaling, file and shell access, web
//! fetching, code analysis and project inspection, exposed as `bb7_*`
//! tools over stdio or Streamable HTTP.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod db;
pub mod files;
pub mod mcp;
pub mod memory;
pub mod project;
pub mod render;
pub mod session;
pub mod shell;
pub mod web;

#[cfg(test)]
mod config_test;
