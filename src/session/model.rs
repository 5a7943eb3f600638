//! On-disk session journal types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GOAL: &str = "General development work";
pub const DEFAULT_INSIGHT_CATEGORY: &str = "general";
pub const DEFAULT_INSIGHT_IMPORTANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("Unknown session status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInsight {
    pub id: String,
    pub insight: String,
    pub category: String,
    pub importance: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDecision {
    pub id: String,
    pub decision: String,
    pub reasoning: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemContext {
    pub platform: String,
    pub working_directory: String,
}

impl SystemContext {
    pub fn capture() -> Self {
        Self {
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            working_directory: std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub events_count: usize,
    pub insights_count: usize,
    pub decisions_count: usize,
    /// Set when the session ends.
    pub duration_secs: Option<i64>,
}

/// A full session journal, stored as `<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub goal: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub context: Option<String>,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub status: SessionStatus,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    #[serde(default)]
    pub insights: Vec<SessionInsight>,
    #[serde(default)]
    pub decisions: Vec<SessionDecision>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default)]
    pub commands_run: Vec<String>,
    pub system_context: SystemContext,
    #[serde(default)]
    pub metrics: SessionMetrics,
    pub summary: Option<String>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn push_event(&mut self, kind: &str, description: String) {
        let now = Utc::now();
        self.events.push(SessionEvent {
            timestamp: now,
            kind: kind.to_string(),
            description,
        });
        self.last_updated = now;
        self.refresh_metrics();
    }

    pub fn refresh_metrics(&mut self) {
        self.metrics.events_count = self.events.len();
        self.metrics.insights_count = self.insights.len();
        self.metrics.decisions_count = self.decisions.len();
    }

    /// Hours between creation and the end (or last update while active).
    pub fn duration_hours(&self) -> f64 {
        let end = self.ended_at.unwrap_or(self.last_updated);
        (end - self.created).num_seconds().max(0) as f64 / 3600.0
    }
}

/// Index entry kept in `session_index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub goal: String,
    pub created: DateTime<Utc>,
    pub status: SessionStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionIndex {
    pub current_session: Option<String>,
    #[serde(default)]
    pub sessions: BTreeMap<String, SessionSummary>,
    #[serde(default)]
    pub total_sessions: usize,
}
