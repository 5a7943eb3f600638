//! Shell discovery.
//!
//! Lookups go through the [`ShellLocator`] trait so tests can stand in for
//! the host's PATH.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::RwLock;

#[cfg(test)]
use mockall::automock;

use super::error::{ShellError, ShellResult};

/// How a shell takes a command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Posix,
    PowerShell,
    Python,
}

impl ShellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellKind::Posix => "posix",
            ShellKind::PowerShell => "powershell",
            ShellKind::Python => "python",
        }
    }
}

/// A shell found on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInfo {
    pub key: String,
    pub name: &'static str,
    pub executable: PathBuf,
    pub kind: ShellKind,
    pub version_args: &'static [&'static str],
    pub capabilities: &'static [&'static str],
}

impl ShellInfo {
    /// Argument vector running `command` through this shell.
    pub fn command_args(&self, command: &str) -> Vec<String> {
        let mut args = match self.kind {
            ShellKind::PowerShell => vec![
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
            ],
            ShellKind::Posix | ShellKind::Python => vec!["-c".to_string()],
        };
        args.push(command.to_string());
        args
    }

    /// Argument vector running a script file through this shell.
    pub fn script_args(&self, script: &Path) -> Vec<String> {
        let path = script.to_string_lossy().into_owned();
        match self.kind {
            ShellKind::PowerShell => vec!["-NoProfile".to_string(), "-File".to_string(), path],
            ShellKind::Posix | ShellKind::Python => vec![path],
        }
    }

    /// Script file extension, including the dot.
    pub fn script_extension(&self) -> &'static str {
        match (self.kind, self.key.as_str()) {
            (ShellKind::PowerShell, _) => ".ps1",
            (ShellKind::Python, _) => ".py",
            (ShellKind::Posix, "zsh") => ".zsh",
            (ShellKind::Posix, "fish") => ".fish",
            (ShellKind::Posix, _) => ".sh",
        }
    }
}

struct KnownShell {
    key: &'static str,
    name: &'static str,
    kind: ShellKind,
    version_args: &'static [&'static str],
    capabilities: &'static [&'static str],
}

const KNOWN_SHELLS: &[KnownShell] = &[
    KnownShell {
        key: "sh",
        name: "POSIX Shell",
        kind: ShellKind::Posix,
        version_args: &[],
        capabilities: &["posix", "pipes", "redirection"],
    },
    KnownShell {
        key: "bash",
        name: "Bash",
        kind: ShellKind::Posix,
        version_args: &["--version"],
        capabilities: &["posix", "arrays", "job_control", "completion"],
    },
    KnownShell {
        key: "zsh",
        name: "Z Shell",
        kind: ShellKind::Posix,
        version_args: &["--version"],
        capabilities: &["posix", "arrays", "globbing", "completion"],
    },
    KnownShell {
        key: "fish",
        name: "Fish Shell",
        kind: ShellKind::Posix,
        version_args: &["--version"],
        capabilities: &["completion", "syntax_highlighting"],
    },
    KnownShell {
        key: "pwsh",
        name: "PowerShell Core",
        kind: ShellKind::PowerShell,
        version_args: &[
            "-NoProfile",
            "-Command",
            "$PSVersionTable.PSVersion.ToString()",
        ],
        capabilities: &["unicode", "objects", "async", "remoting"],
    },
    KnownShell {
        key: "python3",
        name: "Python 3",
        kind: ShellKind::Python,
        version_args: &["--version"],
        capabilities: &["scripting", "stdlib"],
    },
];

/// Host lookups used by discovery. Can be mocked in tests.
#[cfg_attr(test, automock)]
pub trait ShellLocator {
    /// Resolve a program name on PATH.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// First line of the shell's version output, if it reports one.
    fn version(&self, shell: &ShellInfo) -> Option<String>;
}

/// Locator backed by `which` and real process spawns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocator;

impl ShellLocator for SystemLocator {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn version(&self, shell: &ShellInfo) -> Option<String> {
        if shell.version_args.is_empty() {
            return None;
        }
        let output = Command::new(&shell.executable)
            .args(shell.version_args)
            .output()
            .ok()?;
        let text = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        String::from_utf8_lossy(&text)
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Discovered shells plus the mutable default.
#[derive(Debug)]
pub struct ShellRegistry {
    shells: BTreeMap<String, ShellInfo>,
    default: RwLock<String>,
}

impl ShellRegistry {
    /// Look up every known shell. The default is `$SHELL` when it names a
    /// discovered shell, then bash, then sh.
    pub fn discover(locator: &impl ShellLocator, login_shell: Option<&str>) -> Self {
        let shells: BTreeMap<String, ShellInfo> = KNOWN_SHELLS
            .iter()
            .filter_map(|known| {
                locator.locate(known.key).map(|executable| {
                    (
                        known.key.to_string(),
                        ShellInfo {
                            key: known.key.to_string(),
                            name: known.name,
                            executable,
                            kind: known.kind,
                            version_args: known.version_args,
                            capabilities: known.capabilities,
                        },
                    )
                })
            })
            .collect();

        let login = login_shell
            .and_then(|s| Path::new(s).file_name())
            .map(|n| n.to_string_lossy().into_owned());
        let default = login
            .filter(|name| shells.contains_key(name))
            .or_else(|| {
                ["bash", "sh"]
                    .iter()
                    .find(|k| shells.contains_key(**k))
                    .map(|k| k.to_string())
            })
            .or_else(|| shells.keys().next().cloned())
            .unwrap_or_default();

        tracing::debug!(shells = shells.len(), default = %default, "Discovered shells");

        Self {
            shells,
            default: RwLock::new(default),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    pub fn shells(&self) -> impl Iterator<Item = &ShellInfo> {
        self.shells.values()
    }

    pub fn available(&self) -> String {
        self.shells.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    pub fn default_key(&self) -> String {
        self.default
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Resolve an explicit shell name, or the default when `None`.
    pub fn resolve(&self, name: Option<&str>) -> ShellResult<&ShellInfo> {
        if self.shells.is_empty() {
            return Err(ShellError::NoShells);
        }
        let key = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_lowercase(),
            None => self.default_key(),
        };
        self.shells
            .get(&key)
            .ok_or_else(|| ShellError::UnknownShell {
                name: key,
                available: self.available(),
            })
    }

    pub fn set_default(&self, name: &str) -> ShellResult<ShellInfo> {
        let shell = self.resolve(Some(name))?.clone();
        *self.default.write().unwrap_or_else(|e| e.into_inner()) = shell.key.clone();
        tracing::info!(shell = %shell.key, "Default shell changed");
        Ok(shell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator_with(found: &'static [&'static str]) -> MockShellLocator {
        let mut locator = MockShellLocator::new();
        locator
            .expect_locate()
            .returning(move |program| {
                found
                    .contains(&program)
                    .then(|| PathBuf::from(format!("/usr/bin/{}", program)))
            });
        locator
    }

    #[test]
    fn discovers_only_located_shells() {
        let locator = locator_with(&["sh", "bash"]);
        let registry = ShellRegistry::discover(&locator, None);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.available(), "bash, sh");
        assert_eq!(registry.default_key(), "bash");
    }

    #[test]
    fn login_shell_wins_when_discovered() {
        let locator = locator_with(&["sh", "bash", "zsh"]);
        let registry = ShellRegistry::discover(&locator, Some("/bin/zsh"));
        assert_eq!(registry.default_key(), "zsh");

        let registry = ShellRegistry::discover(&locator, Some("/usr/local/bin/tcsh"));
        assert_eq!(registry.default_key(), "bash");
    }

    #[test]
    fn falls_back_to_sh() {
        let locator = locator_with(&["sh", "python3"]);
        let registry = ShellRegistry::discover(&locator, None);
        assert_eq!(registry.default_key(), "sh");
    }

    #[test]
    fn resolve_and_set_default() {
        let locator = locator_with(&["sh", "bash"]);
        let registry = ShellRegistry::discover(&locator, None);

        assert_eq!(registry.resolve(Some("SH")).unwrap().key, "sh");
        assert!(matches!(
            registry.resolve(Some("fish")),
            Err(ShellError::UnknownShell { .. })
        ));

        registry.set_default("sh").unwrap();
        assert_eq!(registry.resolve(None).unwrap().key, "sh");
        assert!(registry.set_default("pwsh").is_err());
        assert_eq!(registry.default_key(), "sh");
    }

    #[test]
    fn empty_registry_reports_no_shells() {
        let locator = locator_with(&[]);
        let registry = ShellRegistry::discover(&locator, Some("/bin/bash"));
        assert!(registry.is_empty());
        assert!(matches!(registry.resolve(None), Err(ShellError::NoShells)));
    }

    #[test]
    fn version_lookup_is_called_per_shell() {
        let mut locator = locator_with(&["bash"]);
        locator
            .expect_version()
            .withf(|shell| shell.key == "bash")
            .times(1)
            .returning(|_| Some("GNU bash, version 5.2".to_string()));
        let registry = ShellRegistry::discover(&locator, None);

        let shell = registry.resolve(None).unwrap();
        assert_eq!(
            locator.version(shell).as_deref(),
            Some("GNU bash, version 5.2")
        );
    }

    #[test]
    fn command_and_script_args_per_kind() {
        let locator = locator_with(&["bash", "pwsh", "python3"]);
        let registry = ShellRegistry::discover(&locator, None);

        let bash = registry.resolve(Some("bash")).unwrap();
        assert_eq!(bash.command_args("ls -la"), vec!["-c", "ls -la"]);
        assert_eq!(bash.script_extension(), ".sh");

        let pwsh = registry.resolve(Some("pwsh")).unwrap();
        assert_eq!(pwsh.command_args("Get-Date")[2], "-Command");
        assert_eq!(pwsh.script_extension(), ".ps1");
        assert_eq!(
            pwsh.script_args(Path::new("/tmp/x.ps1")),
            vec!["-NoProfile", "-File", "/tmp/x.ps1"]
        );

        let python = registry.resolve(Some("python3")).unwrap();
        assert_eq!(python.command_args("print(1)"), vec!["-c", "print(1)"]);
        assert_eq!(python.script_extension(), ".py");
    }
}
