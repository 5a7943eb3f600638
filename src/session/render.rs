//! Markdown rendering of session journal results.

use crate::render::{format_tags, preview, title_case};

use super::manager::SessionListing;
use super::model::{Session, SessionDecision, SessionInsight};

pub const NO_ACTIVE_SESSION: &str = "No active session. Start one first with bb7_start_session.";

pub fn started(session: &Session) -> String {
    let mut lines = vec![
        "## New Session Started".to_string(),
        String::new(),
        format!("- **Session ID:** {}", session.id),
        format!("- **Goal:** {}", session.goal),
    ];
    if !session.tags.is_empty() {
        lines.push(format!("- **Tags:** {}", format_tags(&session.tags)));
    }
    if let Some(context) = &session.context {
        lines.push(format!("- **Context:** {}", context));
    }
    lines.push(format!(
        "- **Started:** {}",
        session.created.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(String::new());
    lines.push("Session tracking is active. Insights and decisions are recorded against it.".to_string());
    lines.join("\n")
}

pub fn insight(record: &SessionInsight) -> String {
    format!(
        "## Insight Recorded\n\n- **Content:** {}\n- **Category:** {}\n- **Importance:** {:.1}/1.0\n- **ID:** {}",
        record.insight, record.category, record.importance, record.id
    )
}

pub fn decision(record: &SessionDecision) -> String {
    let mut lines = vec![
        "## Decision Recorded".to_string(),
        String::new(),
        format!("- **Decision:** {}", record.decision),
    ];
    if let Some(reasoning) = &record.reasoning {
        lines.push(format!("- **Reasoning:** {}", reasoning));
    }
    if !record.alternatives.is_empty() {
        lines.push(format!(
            "- **Alternatives:** {}",
            record.alternatives.join(", ")
        ));
    }
    lines.push(format!("- **ID:** {}", record.id));
    lines.join("\n")
}

pub fn summary(session: &Session) -> String {
    let mut lines = vec![
        format!("## Session Summary: {}", short(&session.id)),
        String::new(),
        format!("- **Goal:** {}", session.goal),
        format!(
            "- **Created:** {}",
            session.created.format("%Y-%m-%d %H:%M:%S")
        ),
        format!("- **Duration:** {:.1} hours", session.duration_hours()),
        format!("- **Status:** {}", session.status),
    ];
    if !session.tags.is_empty() {
        lines.push(format!("- **Tags:** {}", format_tags(&session.tags)));
    }

    if !session.events.is_empty() {
        lines.push(String::new());
        lines.push(format!("### Events ({} total)", session.events.len()));
        let skip = session.events.len().saturating_sub(5);
        for event in &session.events[skip..] {
            lines.push(format!(
                "- {}: {}",
                event.timestamp.format("%H:%M"),
                event.description
            ));
        }
    }

    if !session.insights.is_empty() {
        lines.push(String::new());
        lines.push(format!("### Insights ({} total)", session.insights.len()));
        let skip = session.insights.len().saturating_sub(3);
        for insight in &session.insights[skip..] {
            lines.push(format!(
                "- [{}] {}",
                title_case(&insight.category),
                preview(&insight.insight, 80)
            ));
        }
    }

    if !session.decisions.is_empty() {
        lines.push(String::new());
        lines.push(format!("### Decisions ({} total)", session.decisions.len()));
        let skip = session.decisions.len().saturating_sub(3);
        for decision in &session.decisions[skip..] {
            lines.push(format!("- {}", preview(&decision.decision, 80)));
        }
    }

    if !session.files_modified.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "**Files Modified:** {}",
            session.files_modified.len()
        ));
    }
    if !session.commands_run.is_empty() {
        lines.push(format!("**Commands Run:** {}", session.commands_run.len()));
    }
    if let Some(text) = &session.summary {
        lines.push(String::new());
        lines.push(format!("**Final Summary:** {}", text));
    }

    lines.join("\n")
}

pub fn listing(listing: &SessionListing) -> String {
    if listing.total == 0 {
        return "No sessions found. Create your first session with bb7_start_session.".to_string();
    }

    let mut lines = vec![
        format!(
            "## Sessions ({} shown, {} total)",
            listing.sessions.len(),
            listing.total
        ),
        String::new(),
    ];
    for (id, summary) in &listing.sessions {
        lines.push(format!("**{}** - {}", short(id), summary.goal));
        lines.push(format!(
            "  {} | {}",
            summary.created.format("%Y-%m-%d %H:%M"),
            summary.status
        ));
        if !summary.tags.is_empty() {
            lines.push(format!("  tags: {}", format_tags(&summary.tags)));
        }
        lines.push(String::new());
    }
    if let Some(current) = &listing.current {
        lines.push(format!("**Current Session:** {}", short(current)));
    }
    lines.join("\n")
}

pub fn ended(session: &Session) -> String {
    let mut lines = vec![
        "## Session Completed".to_string(),
        String::new(),
        format!("- **Session ID:** {}", short(&session.id)),
        format!("- **Duration:** {:.1} hours", session.duration_hours()),
        format!("- **Insights Captured:** {}", session.insights.len()),
        format!("- **Decisions Recorded:** {}", session.decisions.len()),
        format!("- **Total Events:** {}", session.events.len()),
    ];
    if let Some(text) = &session.summary {
        lines.push(format!("- **Final Summary:** {}", text));
    }
    lines.join("\n")
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
