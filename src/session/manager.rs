//! JSON-file session journal.
//!
//! Layout under the sessions directory:
//! - `session_index.json`: current session id plus a summary per session
//! - `<id>.json`: the full journal of one session
//!
//! Every operation reloads from disk under a single async mutex, so several
//! server instances pointed at the same directory see each other's writes.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use super::error::{SessionError, SessionResult};
use super::model::{
    DEFAULT_GOAL, DEFAULT_INSIGHT_CATEGORY, DEFAULT_INSIGHT_IMPORTANCE, Session, SessionDecision,
    SessionIndex, SessionInsight, SessionMetrics, SessionStatus, SessionSummary, SystemContext,
};

const INDEX_FILE: &str = "session_index.json";

/// Session ids are uuids; anything else could name a file outside the
/// sessions directory.
fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Filters for [`SessionManager::list`].
#[derive(Debug, Clone)]
pub struct SessionFilter {
    pub limit: usize,
    pub status: Option<SessionStatus>,
    pub tag: Option<String>,
}

impl Default for SessionFilter {
    fn default() -> Self {
        Self {
            limit: 10,
            status: None,
            tag: None,
        }
    }
}

/// Result of [`SessionManager::list`].
#[derive(Debug, Clone)]
pub struct SessionListing {
    pub sessions: Vec<(String, SessionSummary)>,
    pub total: usize,
    pub current: Option<String>,
}

pub struct SessionManager {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Start a new session and make it current.
    pub async fn start(
        &self,
        goal: Option<String>,
        tags: Vec<String>,
        context: Option<String>,
    ) -> SessionResult<Session> {
        let _guard = self.lock.lock().await;

        let goal = goal
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_GOAL.to_string());
        let tags: Vec<String> = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let context = context.filter(|c| !c.trim().is_empty());

        let now = Utc::now();
        let mut session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            goal: goal.clone(),
            tags: tags.clone(),
            context,
            created: now,
            last_updated: now,
            status: SessionStatus::Active,
            events: Vec::new(),
            insights: Vec::new(),
            decisions: Vec::new(),
            files_modified: Vec::new(),
            commands_run: Vec::new(),
            system_context: SystemContext::capture(),
            metrics: SessionMetrics::default(),
            summary: None,
            ended_at: None,
        };
        session.push_event("session_start", format!("Started session: {}", goal));

        self.ensure_dir().await?;
        self.save_session(&session).await?;

        let mut index = self.load_index().await?;
        index.sessions.insert(
            session.id.clone(),
            SessionSummary {
                goal,
                created: now,
                status: SessionStatus::Active,
                tags,
            },
        );
        index.current_session = Some(session.id.clone());
        index.total_sessions = index.sessions.len();
        self.save_index(&index).await?;

        tracing::info!(session_id = %session.id, "Started session");
        Ok(session)
    }

    /// Append an insight to the current session. `None` without an active session.
    pub async fn record_insight(
        &self,
        insight: &str,
        category: Option<String>,
        importance: Option<f64>,
    ) -> SessionResult<Option<SessionInsight>> {
        let insight = required(insight, "insight")?;
        let _guard = self.lock.lock().await;

        let Some(mut session) = self.load_current().await? else {
            return Ok(None);
        };

        let importance = importance
            .filter(|i| !i.is_nan())
            .unwrap_or(DEFAULT_INSIGHT_IMPORTANCE)
            .clamp(0.0, 1.0);
        let record = SessionInsight {
            id: short_id(insight),
            insight: insight.to_string(),
            category: category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_INSIGHT_CATEGORY.to_string()),
            importance,
            timestamp: Utc::now(),
        };

        session.insights.push(record.clone());
        session.push_event(
            "insight_recorded",
            format!("Recorded insight: {}", crate::render::preview(insight, 50)),
        );
        self.save_session(&session).await?;

        Ok(Some(record))
    }

    /// Append a decision to the current session. `None` without an active session.
    pub async fn record_decision(
        &self,
        decision: &str,
        reasoning: Option<String>,
        alternatives: Vec<String>,
    ) -> SessionResult<Option<SessionDecision>> {
        let decision = required(decision, "decision")?;
        let _guard = self.lock.lock().await;

        let Some(mut session) = self.load_current().await? else {
            return Ok(None);
        };

        let record = SessionDecision {
            id: short_id(decision),
            decision: decision.to_string(),
            reasoning: reasoning.filter(|r| !r.trim().is_empty()),
            alternatives: alternatives
                .into_iter()
                .filter(|a| !a.trim().is_empty())
                .collect(),
            timestamp: Utc::now(),
        };

        session.decisions.push(record.clone());
        session.push_event(
            "decision_made",
            format!("Decision: {}", crate::render::preview(decision, 50)),
        );
        self.save_session(&session).await?;

        Ok(Some(record))
    }

    /// Note a file touched by a tool in the current session, if any.
    pub async fn track_file(&self, path: &str) -> SessionResult<()> {
        let _guard = self.lock.lock().await;
        if let Some(mut session) = self.load_current().await? {
            if !session.files_modified.iter().any(|p| p == path) {
                session.files_modified.push(path.to_string());
                session.last_updated = Utc::now();
                self.save_session(&session).await?;
            }
        }
        Ok(())
    }

    /// Note a command run by a tool in the current session, if any.
    pub async fn track_command(&self, command: &str) -> SessionResult<()> {
        let _guard = self.lock.lock().await;
        if let Some(mut session) = self.load_current().await? {
            session.commands_run.push(command.to_string());
            session.last_updated = Utc::now();
            self.save_session(&session).await?;
        }
        Ok(())
    }

    /// Load a session by id, or the current one. `None` when neither exists.
    pub async fn summary(&self, session_id: Option<&str>) -> SessionResult<Option<Session>> {
        let _guard = self.lock.lock().await;

        match session_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let id = self.resolve_id(id).await?;
                self.load_session(&id).await.map(Some)
            }
            None => self.load_current().await,
        }
    }

    /// Sessions from the index, newest first.
    pub async fn list(&self, filter: &SessionFilter) -> SessionResult<SessionListing> {
        let _guard = self.lock.lock().await;
        let index = self.load_index().await?;

        let total = index.sessions.len();
        let mut sessions: Vec<(String, SessionSummary)> = index
            .sessions
            .into_iter()
            .filter(|(_, s)| filter.status.is_none_or(|status| s.status == status))
            .filter(|(_, s)| {
                filter
                    .tag
                    .as_ref()
                    .is_none_or(|tag| s.tags.iter().any(|t| t == tag))
            })
            .collect();
        sessions.sort_by(|a, b| b.1.created.cmp(&a.1.created));
        sessions.truncate(filter.limit);

        Ok(SessionListing {
            sessions,
            total,
            current: index.current_session,
        })
    }

    /// Complete the current session. `None` without an active session.
    pub async fn end(&self, summary: Option<String>) -> SessionResult<Option<Session>> {
        let _guard = self.lock.lock().await;

        let Some(mut session) = self.load_current().await? else {
            return Ok(None);
        };

        let summary = summary.filter(|s| !s.trim().is_empty());
        let description = match &summary {
            Some(text) => format!("Session ended: {}", text),
            None => "Session ended".to_string(),
        };
        session.push_event("session_end", description);

        let now = session.last_updated;
        session.status = SessionStatus::Completed;
        session.summary = summary;
        session.ended_at = Some(now);
        session.metrics.duration_secs = Some((now - session.created).num_seconds().max(0));
        self.save_session(&session).await?;

        let mut index = self.load_index().await?;
        if let Some(entry) = index.sessions.get_mut(&session.id) {
            entry.status = SessionStatus::Completed;
        }
        index.current_session = None;
        self.save_index(&index).await?;

        tracing::info!(session_id = %session.id, "Ended session");
        Ok(Some(session))
    }

    /// Accept a full id or an unambiguous prefix (listings show 8 chars).
    async fn resolve_id(&self, id: &str) -> SessionResult<String> {
        if !is_plain_id(id) {
            return Err(SessionError::Validation {
                message: format!("invalid session id: {}", id),
            });
        }
        if self.session_path(id).exists() {
            return Ok(id.to_string());
        }
        let index = self.load_index().await?;
        let mut matches = index.sessions.keys().filter(|k| k.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(full), None) => Ok(full.clone()),
            _ => Err(SessionError::NotFound { id: id.to_string() }),
        }
    }

    async fn load_current(&self) -> SessionResult<Option<Session>> {
        let index = self.load_index().await?;
        let Some(id) = index.current_session else {
            return Ok(None);
        };
        match self.load_session(&id).await {
            Ok(session) => Ok(Some(session)),
            Err(SessionError::NotFound { .. }) => {
                tracing::warn!(session_id = %id, "Current session file is missing");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn load_index(&self) -> SessionResult<SessionIndex> {
        let path = self.dir.join(INDEX_FILE);
        Ok(read_json(&path).await?.unwrap_or_default())
    }

    async fn save_index(&self, index: &SessionIndex) -> SessionResult<()> {
        write_json(&self.dir.join(INDEX_FILE), index).await
    }

    async fn load_session(&self, id: &str) -> SessionResult<Session> {
        read_json(&self.session_path(id))
            .await?
            .ok_or_else(|| SessionError::NotFound { id: id.to_string() })
    }

    async fn save_session(&self, session: &Session) -> SessionResult<()> {
        write_json(&self.session_path(&session.id), session).await
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn ensure_dir(&self) -> SessionResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SessionError::Io {
                path: self.dir.clone(),
                source,
            })
    }
}

fn required<'a>(value: &'a str, field: &str) -> SessionResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(SessionError::Validation {
            message: format!("{} cannot be empty", field),
        })
    } else {
        Ok(trimmed)
    }
}

/// First 8 hex chars of the SHA-256 of the text.
fn short_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())[..8].to_string()
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> SessionResult<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| SessionError::Corrupt {
                path: path.to_path_buf(),
                source,
            }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SessionError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> SessionResult<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| SessionError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })
}
