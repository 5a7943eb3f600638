//! Shell command execution: shell discovery, timeouts, an environment
//! overlay, execution history and stored scripts.

pub mod discovery;
pub mod environment;
mod error;
pub mod executor;
pub mod history;
pub mod render;
mod tool;

#[cfg(test)]
mod tool_test;

pub use discovery::{ShellInfo, ShellKind, ShellLocator, ShellRegistry, SystemLocator};
pub use environment::{EnvAction, EnvListing, EnvOverlay};
pub use error::{ShellError, ShellResult};
pub use executor::{CommandAnalysis, CommandOutput, CommandType};
pub use history::{CommandHistoryView, CommandRecord};
pub use tool::{
    EnvOutcome, ExecRequest, Execution, ScriptRequest, ScriptRun, ShellEntry, ShellTool,
    SystemInfo, script_path,
};
