//! Runtime configuration.
//!
//! Resolution order for every setting: explicit builder value (CLI flag),
//! then environment variable, then default.

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Directory name used below `$XDG_DATA_HOME`.
const APP_DIR: &str = "bb7";

pub const DEFAULT_PORT: u16 = 8443;
pub const DEFAULT_RATE_LIMIT: usize = 100;
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

/// Get the XDG data directory for bb7.
///
/// `BB7_DATA_DIR` wins over `XDG_DATA_HOME`; without either the path falls
/// back to `~/.local/share/bb7` (or `./.bb7` when HOME is unset).
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("BB7_DATA_DIR") {
        return PathBuf::from(dir);
    }

    env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .map(|base| base.join(APP_DIR))
        .unwrap_or_else(|_| PathBuf::from(".bb7"))
}

/// Parse a boolean-ish env var ("true", "1", "yes", "on").
pub fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(false)
}

/// Assistant-facing feature flags surfaced by `bb7_server_info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub claude_mode: bool,
    pub enhanced_reasoning: bool,
    pub long_context: bool,
    pub cross_project_synthesis: bool,
}

impl Flags {
    pub fn from_env() -> Self {
        Self {
            claude_mode: env_flag("CLAUDE_MODE"),
            enhanced_reasoning: env_flag("ENHANCED_REASONING"),
            long_context: env_flag("LONG_CONTEXT_MODE"),
            cross_project_synthesis: env_flag("CROSS_PROJECT_SYNTHESIS"),
        }
    }
}

/// Settings for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Explicit API key. When `None` a key is loaded from (or generated into)
    /// the data directory.
    pub api_key: Option<String>,
    pub rate_limit: usize,
    pub rate_window_secs: u64,
    pub max_request_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            api_key: env::var("BB7_API_KEY").ok().filter(|k| !k.is_empty()),
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window_secs: DEFAULT_RATE_WINDOW_SECS,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

/// Top-level configuration shared by every tool family.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub flags: Flags,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Build a config from the environment.
    pub fn new() -> Self {
        Self {
            data_dir: get_data_dir(),
            flags: Flags::from_env(),
            http: HttpConfig::default(),
        }
    }

    /// Override the data directory (CLI `--data-dir`).
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn memory_db_path(&self) -> PathBuf {
        self.data_dir.join("memory").join("memories.db")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    pub fn web_cache_dir(&self) -> PathBuf {
        self.data_dir.join("web_cache")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.data_dir.join("scripts")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir.join("downloads")
    }

    pub fn security_dir(&self) -> PathBuf {
        self.data_dir.join("security")
    }

    /// Every directory the server writes into.
    pub fn data_dirs(&self) -> Vec<PathBuf> {
        let memory_dir = self
            .memory_db_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.data_dir.join("memory"));

        vec![
            memory_dir,
            self.sessions_dir(),
            self.web_cache_dir(),
            self.backups_dir(),
            self.scripts_dir(),
            self.downloads_dir(),
            self.security_dir(),
        ]
    }

    /// Create every data directory.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in self.data_dirs() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
