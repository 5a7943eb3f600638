//! Process execution with timeouts and output analysis.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use super::error::{ShellError, ShellResult};

/// Exit code reported when a command is killed for running too long.
pub const TIMEOUT_EXIT_CODE: i32 = -1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const MAX_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Clamp a requested timeout into `1..=MAX_TIMEOUT_SECS`.
pub fn clamp_timeout(secs: Option<u64>) -> u64 {
    secs.unwrap_or(DEFAULT_TIMEOUT_SECS).clamp(1, MAX_TIMEOUT_SECS)
}

fn clean(bytes: &[u8]) -> String {
    strip_ansi_escapes::strip_str(String::from_utf8_lossy(bytes))
}

/// Run `program args..` in `working_dir`, inheriting the process environment
/// with `env` layered on top. The child is killed when `timeout` elapses.
pub async fn run(
    program: &Path,
    args: &[String],
    working_dir: &Path,
    env: &HashMap<String, String>,
    timeout: Duration,
) -> ShellResult<CommandOutput> {
    let mut command = Command::new(program);
    command.args(args).current_dir(working_dir).envs(env);
    run_command(command, &program.display().to_string(), timeout).await
}

/// Spawn a prepared command with piped output and wait for it, killing the
/// child when `timeout` elapses.
pub async fn run_command(
    mut command: Command,
    label: &str,
    timeout: Duration,
) -> ShellResult<CommandOutput> {
    let started = Instant::now();
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ShellError::Spawn {
            program: label.to_string(),
            source,
        })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(CommandOutput {
            stdout: clean(&output.stdout),
            stderr: clean(&output.stderr),
            exit_code: output.status.code().unwrap_or(TIMEOUT_EXIT_CODE),
            duration: started.elapsed(),
            timed_out: false,
        }),
        Ok(Err(source)) => Err(ShellError::Spawn {
            program: label.to_string(),
            source,
        }),
        Err(_) => {
            tracing::warn!(program = label, ?timeout, "Command timed out");
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: format!("Command timed out after {} seconds", timeout.as_secs()),
                exit_code: TIMEOUT_EXIT_CODE,
                duration: started.elapsed(),
                timed_out: true,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    ListDirectory,
    ChangeDirectory,
    ReadFile,
    OutputText,
    ListProcesses,
    TerminateProcess,
    VersionControl,
    PackageManager,
    ScriptExecution,
    General,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::ListDirectory => "list_directory",
            CommandType::ChangeDirectory => "change_directory",
            CommandType::ReadFile => "read_file",
            CommandType::OutputText => "output_text",
            CommandType::ListProcesses => "list_processes",
            CommandType::TerminateProcess => "terminate_process",
            CommandType::VersionControl => "version_control",
            CommandType::PackageManager => "package_manager",
            CommandType::ScriptExecution => "script_execution",
            CommandType::General => "general",
        }
    }
}

const COMMAND_TYPES: &[(CommandType, &[&str])] = &[
    (CommandType::ListDirectory, &["ls", "dir", "get-childitem", "tree"]),
    (CommandType::ChangeDirectory, &["cd", "set-location", "pushd", "popd"]),
    (CommandType::ReadFile, &["cat", "type", "get-content", "head", "tail", "less", "more"]),
    (CommandType::OutputText, &["echo", "printf", "write-output", "write-host"]),
    (CommandType::ListProcesses, &["ps", "top", "htop", "get-process", "tasklist"]),
    (CommandType::TerminateProcess, &["kill", "pkill", "killall", "stop-process", "taskkill"]),
    (CommandType::VersionControl, &["git", "hg", "svn"]),
    (
        CommandType::PackageManager,
        &["npm", "yarn", "pnpm", "pip", "pip3", "cargo", "dotnet", "apt", "brew", "go"],
    ),
    (
        CommandType::ScriptExecution,
        &["python", "python3", "node", "java", "ruby", "perl", "bash", "sh", "deno"],
    ),
];

/// Classify a command by its first word.
pub fn classify(command: &str) -> CommandType {
    let first = command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    COMMAND_TYPES
        .iter()
        .find(|(_, words)| words.contains(&first.as_str()))
        .map(|(kind, _)| *kind)
        .unwrap_or(CommandType::General)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandAnalysis {
    pub command_type: CommandType,
    pub success: bool,
    pub has_output: bool,
    pub output_lines: usize,
    pub error_lines: usize,
    pub contains_errors: bool,
    pub contains_warnings: bool,
    pub likely_successful: bool,
}

pub fn analyze(command: &str, output: &CommandOutput) -> CommandAnalysis {
    let stderr = output.stderr.to_lowercase();
    CommandAnalysis {
        command_type: classify(command),
        success: output.success(),
        has_output: !output.stdout.trim().is_empty(),
        output_lines: output.stdout.lines().count(),
        error_lines: output.stderr.lines().count(),
        contains_errors: stderr.contains("error") || stderr.contains("exception"),
        contains_warnings: stderr.contains("warning"),
        likely_successful: output.success() && !output.stdout.is_empty(),
    }
}
