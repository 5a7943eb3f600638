//! MCP tools for shell execution.

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::session::SessionManager;
use crate::shell::{
    EnvAction, ExecRequest, ScriptRequest, ShellError, ShellTool, SystemLocator, render,
};

use super::{blocking, internal, invalid, markdown, not_found};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteCommandParams {
    #[schemars(description = "Command to execute")]
    pub command: String,
    #[schemars(description = "Shell to use (default: the current default shell)")]
    pub shell: Option<String>,
    #[schemars(description = "Working directory (default: current directory)")]
    pub working_dir: Option<String>,
    #[schemars(description = "Timeout in seconds, 1 to 300 (default: 30)")]
    pub timeout: Option<u64>,
    #[schemars(description = "Extra environment variables for this command")]
    pub environment: Option<HashMap<String, String>>,
    #[schemars(description = "Include command analysis (default: true)")]
    pub show_analysis: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListShellsParams {
    #[schemars(description = "Show executable paths and versions (default: true)")]
    pub show_details: Option<bool>,
    #[schemars(description = "Check each shell for its version (default: false)")]
    pub test_shells: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SetDefaultShellParams {
    #[schemars(description = "Name of the shell to make default")]
    pub shell: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CommandHistoryParams {
    #[schemars(description = "Number of commands to show (default: 20)")]
    pub limit: Option<usize>,
    #[schemars(description = "Only show commands run in this shell")]
    pub shell_filter: Option<String>,
    #[schemars(description = "Include statistics (default: true)")]
    pub show_analysis: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ManageEnvironmentParams {
    #[schemars(description = "Action: list, set, unset or export (default: list)")]
    pub action: Option<String>,
    #[schemars(description = "Variable name (required for set and unset)")]
    pub variable: Option<String>,
    #[schemars(description = "Variable value (for set and export)")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ShellScriptingParams {
    #[schemars(description = "Script content")]
    pub script: String,
    #[schemars(description = "Shell to run the script with (default: the current default shell)")]
    pub shell: Option<String>,
    #[schemars(description = "Keep the script in the scripts directory (default: false)")]
    pub save_script: Option<bool>,
    #[schemars(description = "File name for the script (generated when omitted)")]
    pub script_name: Option<String>,
    #[schemars(description = "Working directory (default: current directory)")]
    pub working_dir: Option<String>,
    #[schemars(description = "Timeout in seconds, 1 to 300 (default: 30)")]
    pub timeout: Option<u64>,
    #[schemars(description = "Include analysis of the run (default: true)")]
    pub show_analysis: Option<bool>,
}

fn shell_error(e: ShellError) -> McpError {
    match e {
        ShellError::WorkingDirNotFound { .. } => not_found("working_dir_not_found", e),
        ShellError::UnknownShell { .. } | ShellError::InvalidInput { .. } => invalid(e),
        _ => internal("shell_error", e),
    }
}

#[derive(Clone)]
pub struct ShellTools {
    shell: Arc<ShellTool>,
    sessions: Arc<SessionManager>,
    locator: SystemLocator,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ShellTools {
    pub fn new(shell: Arc<ShellTool>, sessions: Arc<SessionManager>) -> Self {
        Self {
            shell,
            sessions,
            locator: SystemLocator,
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "bb7_execute_command",
        description = "Run a command in one of the detected shells with a timeout, returning exit code, output and analysis."
    )]
    pub async fn execute_command(
        &self,
        params: Parameters<ExecuteCommandParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let execution = self
            .shell
            .execute(ExecRequest {
                command: p.command,
                shell: p.shell,
                working_dir: p.working_dir,
                timeout_secs: p.timeout,
                environment: p.environment.unwrap_or_default(),
            })
            .await
            .map_err(shell_error)?;

        if let Err(e) = self.sessions.track_command(&execution.command).await {
            tracing::warn!(error = %e, "Failed to track command in session");
        }
        markdown(render::execution(&execution, p.show_analysis.unwrap_or(true)))
    }

    #[tool(
        name = "bb7_list_shells",
        description = "List the shells detected on this system and which one is the default."
    )]
    pub async fn list_shells(
        &self,
        params: Parameters<ListShellsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let shell = Arc::clone(&self.shell);
        let locator = self.locator;
        let test_versions = p.test_shells.unwrap_or(false);
        let entries = blocking(move || shell.list_shells(&locator, test_versions)).await?;
        markdown(render::shells(&entries, p.show_details.unwrap_or(true)))
    }

    #[tool(
        name = "bb7_set_default_shell",
        description = "Change the shell used when a command does not name one."
    )]
    pub async fn set_default_shell(
        &self,
        params: Parameters<SetDefaultShellParams>,
    ) -> Result<CallToolResult, McpError> {
        let shell = self
            .shell
            .set_default_shell(&params.0.shell)
            .map_err(shell_error)?;
        markdown(render::default_set(&shell))
    }

    #[tool(
        name = "bb7_command_history",
        description = "Recent commands, newest first, with success rate and average duration."
    )]
    pub async fn command_history(
        &self,
        params: Parameters<CommandHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let shell = p.shell_filter.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let view = self.shell.history(p.limit.unwrap_or(20).max(1), shell);
        markdown(render::history(&view, p.show_analysis.unwrap_or(true)))
    }

    #[tool(
        name = "bb7_get_system_info",
        description = "Operating system, architecture, host, user, CPU count and shell summary."
    )]
    pub async fn get_system_info(&self) -> Result<CallToolResult, McpError> {
        markdown(render::system_info(&self.shell.system_info()))
    }

    #[tool(
        name = "bb7_manage_environment",
        description = "List, set, unset or export variables in the environment overlay applied to every command."
    )]
    pub async fn manage_environment(
        &self,
        params: Parameters<ManageEnvironmentParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let action: EnvAction = p
            .action
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(shell_error)?;
        let outcome = self
            .shell
            .manage_environment(action, p.variable.as_deref(), p.value.as_deref())
            .map_err(shell_error)?;
        markdown(render::environment(&outcome))
    }

    #[tool(
        name = "bb7_shell_scripting",
        description = "Write a script to a file and run it with the chosen shell, optionally keeping it."
    )]
    pub async fn shell_scripting(
        &self,
        params: Parameters<ShellScriptingParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let run = self
            .shell
            .run_script(ScriptRequest {
                script: p.script,
                shell: p.shell,
                save: p.save_script.unwrap_or(false),
                name: p.script_name,
                working_dir: p.working_dir,
                timeout_secs: p.timeout,
            })
            .await
            .map_err(shell_error)?;
        markdown(render::script(&run, p.show_analysis.unwrap_or(true)))
    }
}
