//! MCP tools for session journaling.

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

use crate::session::{SessionError, SessionFilter, SessionManager, SessionStatus, render};

use super::{internal, invalid, markdown, not_found};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StartSessionParams {
    #[schemars(description = "Goal of the session (default: General development work)")]
    pub goal: Option<String>,
    #[schemars(description = "Tags for the session")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Additional context")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecordInsightParams {
    #[schemars(description = "The insight to record")]
    pub insight: String,
    #[schemars(description = "Insight category (default: general)")]
    pub category: Option<String>,
    #[schemars(description = "Importance from 0.0 to 1.0 (default: 0.5)")]
    pub importance: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecordDecisionParams {
    #[schemars(description = "The decision made")]
    pub decision: String,
    #[schemars(description = "Why it was made")]
    pub reasoning: Option<String>,
    #[schemars(description = "Alternatives that were considered")]
    pub alternatives: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SessionSummaryParams {
    #[schemars(description = "Session ID or unique prefix (default: current session)")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListSessionsParams {
    #[schemars(description = "Maximum number of sessions (default: 10)")]
    pub limit: Option<usize>,
    #[schemars(description = "Filter by status: active or completed")]
    pub status: Option<String>,
    #[schemars(description = "Filter by tag")]
    pub tag: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EndSessionParams {
    #[schemars(description = "Closing summary of the session")]
    pub summary: Option<String>,
}

fn session_error(e: SessionError) -> McpError {
    match e {
        SessionError::NotFound { .. } => not_found("session_not_found", e),
        SessionError::Validation { .. } => invalid(e),
        _ => internal("session_error", e),
    }
}

#[derive(Clone)]
pub struct SessionTools {
    sessions: Arc<SessionManager>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SessionTools {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "bb7_start_session",
        description = "Start a development session and make it current. Files written and commands run are tracked against it."
    )]
    pub async fn start_session(
        &self,
        params: Parameters<StartSessionParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let session = self
            .sessions
            .start(p.goal, p.tags.unwrap_or_default(), p.context)
            .await
            .map_err(session_error)?;
        markdown(render::started(&session))
    }

    #[tool(
        name = "bb7_record_insight",
        description = "Record an insight in the current session."
    )]
    pub async fn record_insight(
        &self,
        params: Parameters<RecordInsightParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let recorded = self
            .sessions
            .record_insight(&p.insight, p.category, p.importance)
            .await
            .map_err(session_error)?;
        match recorded {
            Some(insight) => markdown(render::insight(&insight)),
            None => markdown(render::NO_ACTIVE_SESSION.to_string()),
        }
    }

    #[tool(
        name = "bb7_record_decision",
        description = "Record a decision with its reasoning and alternatives in the current session."
    )]
    pub async fn record_decision(
        &self,
        params: Parameters<RecordDecisionParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let recorded = self
            .sessions
            .record_decision(&p.decision, p.reasoning, p.alternatives.unwrap_or_default())
            .await
            .map_err(session_error)?;
        match recorded {
            Some(decision) => markdown(render::decision(&decision)),
            None => markdown(render::NO_ACTIVE_SESSION.to_string()),
        }
    }

    #[tool(
        name = "bb7_session_summary",
        description = "Summarize a session: recent events, insights, decisions, tracked files and commands."
    )]
    pub async fn session_summary(
        &self,
        params: Parameters<SessionSummaryParams>,
    ) -> Result<CallToolResult, McpError> {
        let session = self
            .sessions
            .summary(params.0.session_id.as_deref())
            .await
            .map_err(session_error)?;
        match session {
            Some(session) => markdown(render::summary(&session)),
            None => markdown(render::NO_ACTIVE_SESSION.to_string()),
        }
    }

    #[tool(
        name = "bb7_list_sessions",
        description = "List sessions newest first, optionally filtered by status or tag."
    )]
    pub async fn list_sessions(
        &self,
        params: Parameters<ListSessionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let status = match p.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(status) => Some(status.parse::<SessionStatus>().map_err(invalid)?),
            None => None,
        };
        let filter = SessionFilter {
            limit: p.limit.unwrap_or(10).max(1),
            status,
            tag: p.tag.filter(|t| !t.trim().is_empty()),
        };
        let listing = self.sessions.list(&filter).await.map_err(session_error)?;
        markdown(render::listing(&listing))
    }

    #[tool(
        name = "bb7_end_session",
        description = "Complete the current session with an optional summary."
    )]
    pub async fn end_session(
        &self,
        params: Parameters<EndSessionParams>,
    ) -> Result<CallToolResult, McpError> {
        let ended = self
            .sessions
            .end(params.0.summary)
            .await
            .map_err(session_error)?;
        match ended {
            Some(session) => markdown(render::ended(&session)),
            None => markdown(render::NO_ACTIVE_SESSION.to_string()),
        }
    }
}
