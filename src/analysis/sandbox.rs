//! Isolated Python execution with a pre-execution block list, timing
//! ratings and a bounded run history.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tokio::process::Command;

use super::error::{AnalysisError, AnalysisResult};
use super::language::Language;
use super::review::{dependencies, functions};
use crate::shell::executor::run_command;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 30;
pub const HISTORY_LIMIT: usize = 50;
pub const DEFAULT_INTERPRETER: &str = "python3";

pub fn clamp_timeout(secs: Option<u64>) -> u64 {
    secs.unwrap_or(DEFAULT_TIMEOUT_SECS).clamp(1, MAX_TIMEOUT_SECS)
}

static BLOCKED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"import\s+os\b", "OS module import"),
        (r"import\s+subprocess\b", "Subprocess module import"),
        (r"import\s+sys\b", "System module import"),
        (r"from\s+(?:os|subprocess|sys)\b", "System module import"),
        (r#"open\s*\([^)]*["'][wax]\+?b?["']"#, "File write operation"),
        (r"\beval\s*\(", "eval() function usage"),
        (r"\bexec\s*\(", "exec() function usage"),
        (r"__import__", "Dynamic import"),
        (r"\bcompile\s*\(", "Code compilation"),
        (r"\bglobals\s*\(\s*\)", "Global namespace access"),
    ]
    .into_iter()
    .filter_map(|(p, d)| Regex::new(p).ok().map(|re| (re, d)))
    .collect()
});

/// The reason `code` may not run, if any.
pub fn blocked_reason(code: &str) -> Option<&'static str> {
    BLOCKED
        .iter()
        .find(|(re, _)| re.is_match(code))
        .map(|(_, reason)| *reason)
}

/// Guidance keyed on the Python exception name in `error`.
pub fn error_hint(error: &str) -> &'static str {
    const HINTS: &[(&str, &str)] = &[
        (
            "indentationerror",
            "Indentation Error: inconsistent indentation. Use spaces or tabs consistently",
        ),
        (
            "syntaxerror",
            "Syntax Error: check for missing colons, parentheses, or incorrect indentation",
        ),
        (
            "nameerror",
            "Name Error: variable or function not defined. Check spelling and scope",
        ),
        (
            "typeerror",
            "Type Error: incompatible data types. Check function arguments and operations",
        ),
        ("indexerror", "Index Error: list or string index out of range"),
        ("keyerror", "Key Error: dictionary key does not exist"),
        (
            "valueerror",
            "Value Error: invalid value for the operation. Check input data",
        ),
        (
            "zerodivisionerror",
            "Zero Division Error: division by zero. Validate divisors first",
        ),
        (
            "importerror",
            "Import Error: module unavailable in the isolated interpreter",
        ),
        (
            "modulenotfounderror",
            "Import Error: module unavailable in the isolated interpreter",
        ),
    ];
    let lower = error.to_lowercase();
    HINTS
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, hint)| *hint)
        .unwrap_or("Check the error message for specific details about what went wrong")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Performance {
    pub speed: &'static str,
    pub efficiency: &'static str,
    pub resources: &'static str,
}

pub fn rate(elapsed: Duration) -> Performance {
    let ms = elapsed.as_secs_f64() * 1000.0;
    let speed = if ms < 1.0 {
        "Very Fast"
    } else if ms < 10.0 {
        "Fast"
    } else if ms < 100.0 {
        "Moderate"
    } else {
        "Slow"
    };
    let efficiency = if ms < 50.0 {
        "Good"
    } else if ms < 200.0 {
        "Fair"
    } else {
        "Poor"
    };
    let resources = if ms < 10.0 {
        "Low"
    } else if ms < 100.0 {
        "Medium"
    } else {
        "High"
    };
    Performance {
        speed,
        efficiency,
        resources,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    pub success: bool,
    pub timed_out: bool,
    pub exit_code: i32,
    /// Empty when output capture was off.
    pub output: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub timeout_secs: u64,
}

impl Execution {
    /// The final traceback line, e.g. `ZeroDivisionError: division by zero`.
    pub fn error(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.stderr.lines().rev().map(str::trim).find(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultAnalysis {
    pub functions_defined: Vec<String>,
    pub imports_used: Vec<String>,
}

pub fn analyze_result(code: &str) -> ResultAnalysis {
    ResultAnalysis {
        functions_defined: functions(code, Language::Python)
            .into_iter()
            .map(|f| f.name)
            .collect(),
        imports_used: dependencies(code, Language::Python).imports,
    }
}

pub fn suggestions(code: &str, execution: &Execution) -> Vec<&'static str> {
    let mut out = Vec::new();
    if execution.elapsed > Duration::from_millis(100) {
        out.push("Consider optimizing for better performance");
    }
    if code.contains("print(") {
        out.push("Consider using logging instead of print for production code");
    }
    if code.contains("for") && code.contains("range(") {
        out.push("Consider using more Pythonic iteration patterns");
    }
    if execution.success && execution.output.trim().is_empty() {
        out.push("Consider adding output to verify code behavior");
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub code_hash: String,
    pub success: bool,
    pub elapsed: Duration,
    pub lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub success_rate: f64,
    pub avg_elapsed: Duration,
}

#[derive(Debug, Default)]
pub struct ExecutionHistory {
    records: VecDeque<ExecutionRecord>,
}

impl ExecutionHistory {
    pub fn push(&mut self, code: &str, execution: &Execution) {
        let digest = format!("{:x}", Sha256::digest(code.as_bytes()));
        self.records.push_back(ExecutionRecord {
            timestamp: Utc::now(),
            code_hash: digest[..8].to_string(),
            success: execution.success,
            elapsed: execution.elapsed,
            lines: code.lines().count(),
        });
        while self.records.len() > HISTORY_LIMIT {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> HistoryStats {
        let total = self.records.len();
        if total == 0 {
            return HistoryStats {
                total,
                success_rate: 0.0,
                avg_elapsed: Duration::ZERO,
            };
        }
        let ok = self.records.iter().filter(|r| r.success).count();
        let elapsed: Duration = self.records.iter().map(|r| r.elapsed).sum();
        HistoryStats {
            total,
            success_rate: ok as f64 / total as f64,
            avg_elapsed: elapsed / total as u32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SandboxRun {
    pub execution: Execution,
    pub analysis: Option<ResultAnalysis>,
    pub performance: Option<Performance>,
    pub suggestions: Vec<&'static str>,
    /// Present once more than one run is recorded.
    pub stats: Option<HistoryStats>,
}

#[derive(Debug, Clone)]
pub enum SandboxOutcome {
    Blocked { reason: &'static str },
    Ran(Box<SandboxRun>),
}

#[derive(Debug)]
pub struct Sandbox {
    interpreter: String,
    history: Mutex<ExecutionHistory>,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl Sandbox {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            history: Mutex::new(ExecutionHistory::default()),
        }
    }

    fn interpreter_path(&self) -> AnalysisResult<PathBuf> {
        which::which(&self.interpreter).map_err(|_| AnalysisError::InterpreterNotFound {
            program: self.interpreter.clone(),
        })
    }

    /// Runs `python3 -I -c code` in a scratch directory with an empty
    /// environment. Blocked code never reaches the interpreter.
    pub async fn execute(
        &self,
        code: &str,
        timeout_secs: Option<u64>,
        capture_output: bool,
        analyze: bool,
    ) -> AnalysisResult<SandboxOutcome> {
        if code.trim().is_empty() {
            return Err(AnalysisError::EmptyCode);
        }
        if let Some(reason) = blocked_reason(code) {
            tracing::info!(reason, "Sandbox blocked code");
            return Ok(SandboxOutcome::Blocked { reason });
        }

        let timeout_secs = clamp_timeout(timeout_secs);
        let python = self.interpreter_path()?;
        let scratch = TempDir::new().map_err(|source| AnalysisError::Sandbox {
            message: "cannot create scratch directory".to_string(),
            source: Some(source),
        })?;

        let mut command = Command::new(&python);
        command
            .arg("-I")
            .arg("-c")
            .arg(code)
            .env_clear()
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .current_dir(scratch.path());

        let output = run_command(
            command,
            &python.display().to_string(),
            Duration::from_secs(timeout_secs),
        )
        .await
        .map_err(|e| AnalysisError::Sandbox {
            message: e.to_string(),
            source: None,
        })?;

        let execution = Execution {
            success: output.success(),
            timed_out: output.timed_out,
            exit_code: output.exit_code,
            output: if capture_output {
                output.stdout
            } else {
                String::new()
            },
            stderr: output.stderr,
            elapsed: output.duration,
            timeout_secs,
        };
        tracing::info!(
            success = execution.success,
            elapsed_ms = execution.elapsed.as_millis() as u64,
            "Sandbox execution finished"
        );

        let stats = {
            let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            history.push(code, &execution);
            (history.len() > 1).then(|| history.stats())
        };

        let success = execution.success;
        Ok(SandboxOutcome::Ran(Box::new(SandboxRun {
            analysis: (analyze && success).then(|| analyze_result(code)),
            performance: success.then(|| rate(execution.elapsed)),
            suggestions: if success {
                suggestions(code, &execution)
            } else {
                Vec::new()
            },
            stats,
            execution,
        })))
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .stats()
    }
}
