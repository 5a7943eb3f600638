//! Environment overlay applied to spawned commands.
//!
//! The server's own process environment is never modified; variables set
//! here only reach child processes.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use dashmap::DashMap;

use super::error::{ShellError, ShellResult};

const MASK: &str = "********";
const SECRET_NAME_MARKERS: &[&str] = &[
    "KEY",
    "TOKEN",
    "SECRET",
    "PASSWORD",
    "PASSWD",
    "CREDENTIAL",
    "AUTH",
];
const IMPORTANT_NAME_MARKERS: &[&str] = &[
    "PATH", "HOME", "USER", "SHELL", "LANG", "TERM", "TMP", "TEMP", "PYTHON", "CARGO", "RUST",
];
const MAX_IMPORTANT: usize = 20;
const MAX_VALUE_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvAction {
    List,
    Set,
    Unset,
    Export,
}

impl FromStr for EnvAction {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "list" => Ok(EnvAction::List),
            "set" => Ok(EnvAction::Set),
            "unset" => Ok(EnvAction::Unset),
            "export" => Ok(EnvAction::Export),
            other => Err(ShellError::InvalidInput {
                message: format!(
                    "unknown action '{}'. Available: list, set, unset, export",
                    other
                ),
            }),
        }
    }
}

pub fn is_secret_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    SECRET_NAME_MARKERS.iter().any(|m| upper.contains(m))
}

/// Value safe to display: secrets masked, long values shortened.
pub fn display_value(name: &str, value: &str) -> String {
    if is_secret_name(name) {
        MASK.to_string()
    } else {
        crate::render::truncate_with_ellipsis(value, MAX_VALUE_CHARS)
    }
}

/// Single-quoted for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn validate_name(name: &str) -> ShellResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShellError::InvalidInput {
            message: "variable name is required".to_string(),
        });
    }
    if name.contains('=') || name.contains('\0') || name.chars().any(char::is_whitespace) {
        return Err(ShellError::InvalidInput {
            message: format!("invalid variable name '{}'", name),
        });
    }
    Ok(name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvListing {
    /// Well-known process variables, masked and shortened.
    pub important: Vec<(String, String)>,
    /// Overlay variables, masked.
    pub overlay: Vec<(String, String)>,
    /// Distinct names across process env and overlay.
    pub total: usize,
}

#[derive(Debug, Default)]
pub struct EnvOverlay {
    vars: DashMap<String, String>,
}

impl EnvOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: &str) -> ShellResult<()> {
        let name = validate_name(name)?;
        self.vars.insert(name.to_string(), value.to_string());
        tracing::debug!(name, "Overlay variable set");
        Ok(())
    }

    /// Returns whether the variable was present.
    pub fn unset(&self, name: &str) -> ShellResult<bool> {
        let name = validate_name(name)?;
        Ok(self.vars.remove(name).is_some())
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).map(|v| v.value().clone())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Sorted copy of the overlay.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Overlay merged with per-call variables; per-call values win.
    pub fn merged_with(&self, extra: &HashMap<String, String>) -> HashMap<String, String> {
        let mut env: HashMap<String, String> = self.snapshot().into_iter().collect();
        env.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }

    /// `export K='V'` for every overlay variable.
    pub fn export_lines(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|(k, v)| format!("export {}={}", k, shell_quote(v)))
            .collect()
    }

    pub fn listing(&self, process_env: impl IntoIterator<Item = (String, String)>) -> EnvListing {
        let process: BTreeMap<String, String> = process_env.into_iter().collect();
        let overlay = self.snapshot();

        let important = process
            .iter()
            .filter(|(name, _)| {
                let upper = name.to_uppercase();
                IMPORTANT_NAME_MARKERS.iter().any(|m| upper.contains(m))
            })
            .take(MAX_IMPORTANT)
            .map(|(k, v)| (k.clone(), display_value(k, v)))
            .collect();

        let total = process
            .keys()
            .chain(overlay.keys().filter(|k| !process.contains_key(*k)))
            .count();

        EnvListing {
            important,
            overlay: overlay
                .iter()
                .map(|(k, v)| (k.clone(), display_value(k, v)))
                .collect(),
            total,
        }
    }
}
