//! The shell tool: discovered shells, environment overlay, history and
//! script storage behind one handle.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;

use super::discovery::{ShellInfo, ShellLocator, ShellRegistry};
use super::environment::{EnvAction, EnvListing, EnvOverlay, validate_name};
use super::error::{ShellError, ShellResult};
use super::executor::{self, CommandAnalysis, CommandOutput, clamp_timeout};
use super::history::{CommandHistory, CommandHistoryView, CommandRecord};

#[derive(Debug, Clone, Default)]
pub struct ExecRequest {
    pub command: String,
    pub shell: Option<String>,
    pub working_dir: Option<String>,
    pub timeout_secs: Option<u64>,
    pub environment: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Execution {
    pub command: String,
    pub shell: ShellInfo,
    pub working_dir: PathBuf,
    pub timeout_secs: u64,
    pub output: CommandOutput,
    pub analysis: CommandAnalysis,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptRequest {
    pub script: String,
    pub shell: Option<String>,
    pub save: bool,
    pub name: Option<String>,
    pub working_dir: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ScriptRun {
    pub path: PathBuf,
    pub saved: bool,
    pub length: usize,
    pub execution: Execution,
}

#[derive(Debug, Clone)]
pub struct ShellEntry {
    pub info: ShellInfo,
    pub is_default: bool,
    /// `Some` only when versions were checked; the inner `None` means the
    /// shell did not report one.
    pub version: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub family: &'static str,
    pub hostname: String,
    pub cwd: PathBuf,
    pub user: String,
    pub cpu_count: usize,
    pub shells: Vec<String>,
    pub default_shell: String,
    pub overlay_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvOutcome {
    Listing(EnvListing),
    Set { name: String, value: String },
    Unset { name: String, removed: bool },
    /// `lines` are the shell statements reproducing the exported state.
    Export { name: Option<String>, lines: Vec<String> },
}

#[derive(Debug)]
pub struct ShellTool {
    registry: ShellRegistry,
    overlay: EnvOverlay,
    history: CommandHistory,
    scripts_dir: PathBuf,
}

impl ShellTool {
    /// Discover shells through `locator`, honouring `$SHELL` for the default.
    pub fn new(scripts_dir: impl Into<PathBuf>, locator: &impl ShellLocator) -> Self {
        let login = std::env::var("SHELL").ok();
        Self {
            registry: ShellRegistry::discover(locator, login.as_deref()),
            overlay: EnvOverlay::new(),
            history: CommandHistory::default(),
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn registry(&self) -> &ShellRegistry {
        &self.registry
    }

    pub fn overlay(&self) -> &EnvOverlay {
        &self.overlay
    }

    pub async fn execute(&self, request: ExecRequest) -> ShellResult<Execution> {
        let command = request.command.trim();
        if command.is_empty() {
            return Err(ShellError::InvalidInput {
                message: "command cannot be empty".to_string(),
            });
        }
        let shell = self.registry.resolve(request.shell.as_deref())?.clone();
        let args = shell.command_args(command);
        self.run(
            command,
            shell,
            args,
            request.working_dir.as_deref(),
            request.timeout_secs,
            &request.environment,
        )
        .await
    }

    async fn run(
        &self,
        label: &str,
        shell: ShellInfo,
        args: Vec<String>,
        working_dir: Option<&str>,
        timeout_secs: Option<u64>,
        extra_env: &HashMap<String, String>,
    ) -> ShellResult<Execution> {
        let working_dir = resolve_working_dir(working_dir.unwrap_or("."))?;
        let timeout_secs = clamp_timeout(timeout_secs);
        let env = self.overlay.merged_with(extra_env);

        tracing::debug!(shell = %shell.key, dir = %working_dir.display(), "Executing command");
        let output = executor::run(
            &shell.executable,
            &args,
            &working_dir,
            &env,
            Duration::from_secs(timeout_secs),
        )
        .await?;
        let analysis = executor::analyze(label, &output);

        self.history.push(CommandRecord {
            timestamp: Local::now(),
            command: label.to_string(),
            shell: shell.key.clone(),
            working_dir: working_dir.display().to_string(),
            exit_code: output.exit_code,
            duration: output.duration,
            success: analysis.success,
            output_size: output.stdout.len(),
            error_size: output.stderr.len(),
            command_type: analysis.command_type,
        });

        Ok(Execution {
            command: label.to_string(),
            shell,
            working_dir,
            timeout_secs,
            output,
            analysis,
        })
    }

    pub fn list_shells(&self, locator: &impl ShellLocator, test_versions: bool) -> Vec<ShellEntry> {
        let default = self.registry.default_key();
        self.registry
            .shells()
            .map(|info| ShellEntry {
                is_default: info.key == default,
                version: test_versions.then(|| locator.version(info)),
                info: info.clone(),
            })
            .collect()
    }

    pub fn set_default_shell(&self, name: &str) -> ShellResult<ShellInfo> {
        self.registry.set_default(name)
    }

    pub fn history(&self, limit: usize, shell: Option<&str>) -> CommandHistoryView {
        self.history.view(limit, shell)
    }

    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            family: std::env::consts::FAMILY,
            hostname: hostname(),
            cwd: std::env::current_dir().unwrap_or_default(),
            user: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string()),
            cpu_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            shells: self.registry.shells().map(|s| s.key.clone()).collect(),
            default_shell: self.registry.default_key(),
            overlay_size: self.overlay.len(),
        }
    }

    pub fn manage_environment(
        &self,
        action: EnvAction,
        variable: Option<&str>,
        value: Option<&str>,
    ) -> ShellResult<EnvOutcome> {
        match action {
            EnvAction::List => Ok(EnvOutcome::Listing(self.overlay.listing(std::env::vars()))),
            EnvAction::Set => {
                let name = validate_name(variable.unwrap_or_default())?;
                let value = value.unwrap_or_default();
                self.overlay.set(name, value)?;
                Ok(EnvOutcome::Set {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            }
            EnvAction::Unset => {
                let name = validate_name(variable.unwrap_or_default())?;
                Ok(EnvOutcome::Unset {
                    name: name.to_string(),
                    removed: self.overlay.unset(name)?,
                })
            }
            EnvAction::Export => {
                let name = match variable.map(str::trim).filter(|v| !v.is_empty()) {
                    Some(name) => {
                        let name = validate_name(name)?;
                        if let Some(value) = value {
                            self.overlay.set(name, value)?;
                        }
                        Some(name.to_string())
                    }
                    None => None,
                };
                Ok(EnvOutcome::Export {
                    name,
                    lines: self.overlay.export_lines(),
                })
            }
        }
    }

    /// Write the script under the scripts directory, run it and remove it
    /// again unless `save` is set.
    pub async fn run_script(&self, request: ScriptRequest) -> ShellResult<ScriptRun> {
        if request.script.trim().is_empty() {
            return Err(ShellError::InvalidInput {
                message: "script cannot be empty".to_string(),
            });
        }
        let shell = self.registry.resolve(request.shell.as_deref())?.clone();

        fs::create_dir_all(&self.scripts_dir).map_err(|source| ShellError::Io {
            path: self.scripts_dir.clone(),
            source,
        })?;
        let path = script_path(
            &self.scripts_dir,
            request.name.as_deref(),
            shell.script_extension(),
        );
        write_script(&path, &request.script)?;

        let args = shell.script_args(&path);
        let label = format!("script {}", path.display());
        let result = self
            .run(
                &label,
                shell,
                args,
                request.working_dir.as_deref(),
                request.timeout_secs,
                &HashMap::new(),
            )
            .await;

        if !request.save {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove script");
            }
        }

        Ok(ScriptRun {
            path,
            saved: request.save,
            length: request.script.chars().count(),
            execution: result?,
        })
    }
}

fn resolve_working_dir(dir: &str) -> ShellResult<PathBuf> {
    let path = crate::files::resolve_path(dir).map_err(|e| ShellError::InvalidInput {
        message: e.to_string(),
    })?;
    if !path.is_dir() {
        return Err(ShellError::WorkingDirNotFound { path });
    }
    Ok(path)
}

/// `<name><ext>` when named, else `script_<timestamp><ext>`.
pub fn script_path(dir: &Path, name: Option<&str>, extension: &str) -> PathBuf {
    let stem = name
        .map(sanitize_filename::sanitize)
        .map(|n| n.trim_end_matches(extension).to_string())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("script_{}", Local::now().format("%Y%m%d_%H%M%S_%3f")));
    dir.join(format!("{}{}", stem, extension))
}

fn write_script(path: &Path, script: &str) -> ShellResult<()> {
    let io = |source| ShellError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::write(path, script).map_err(io)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(io)?;
    }
    Ok(())
}

fn hostname() -> String {
    sysinfo::System::host_name()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
