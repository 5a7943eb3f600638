//! Tests for SessionManager.

use tempfile::TempDir;

use crate::session::model::DEFAULT_GOAL;
use crate::session::render;
use crate::session::{SessionError, SessionFilter, SessionManager, SessionStatus};

fn setup() -> (TempDir, SessionManager) {
    let temp = TempDir::new().unwrap();
    let manager = SessionManager::new(temp.path().join("sessions"));
    (temp, manager)
}

#[tokio::test(flavor = "multi_thread")]
async fn start_session_writes_index_and_journal() {
    let (_temp, manager) = setup();

    let session = manager
        .start(
            Some("Ship the parser".to_string()),
            vec!["parser".to_string(), " ".to_string()],
            Some("after review".to_string()),
        )
        .await
        .expect("start should succeed");

    assert_eq!(session.goal, "Ship the parser");
    assert_eq!(session.tags, vec!["parser"]);
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.events.len(), 1);
    assert_eq!(session.events[0].kind, "session_start");

    assert!(manager.dir().join("session_index.json").exists());
    assert!(manager.dir().join(format!("{}.json", session.id)).exists());

    let listing = manager.list(&SessionFilter::default()).await.unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.current.as_deref(), Some(session.id.as_str()));
}

#[tokio::test(flavor = "multi_thread")]
async fn start_session_defaults_goal() {
    let (_temp, manager) = setup();

    let session = manager.start(None, vec![], None).await.unwrap();
    assert_eq!(session.goal, DEFAULT_GOAL);
    assert!(session.context.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn recording_without_session_returns_none() {
    let (_temp, manager) = setup();

    assert!(
        manager
            .record_insight("something", None, None)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        manager
            .record_decision("something", None, vec![])
            .await
            .unwrap()
            .is_none()
    );
    assert!(manager.end(None).await.unwrap().is_none());
    assert!(manager.summary(None).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn record_insight_clamps_importance_and_hashes_id() {
    let (_temp, manager) = setup();
    manager.start(None, vec![], None).await.unwrap();

    let insight = manager
        .record_insight("Batching writes halves latency", None, Some(3.0))
        .await
        .unwrap()
        .expect("active session");

    assert_eq!(insight.category, "general");
    assert_eq!(insight.importance, 1.0);
    assert_eq!(insight.id.len(), 8);
    assert!(insight.id.chars().all(|c| c.is_ascii_hexdigit()));

    let session = manager.summary(None).await.unwrap().unwrap();
    assert_eq!(session.insights.len(), 1);
    assert_eq!(session.metrics.insights_count, 1);
    assert_eq!(session.events.last().unwrap().kind, "insight_recorded");
}

#[tokio::test(flavor = "multi_thread")]
async fn record_insight_rejects_empty_text() {
    let (_temp, manager) = setup();
    manager.start(None, vec![], None).await.unwrap();

    let result = manager.record_insight("   ", None, None).await;
    assert!(matches!(result, Err(SessionError::Validation { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn record_decision_keeps_reasoning_and_alternatives() {
    let (_temp, manager) = setup();
    manager.start(None, vec![], None).await.unwrap();

    let decision = manager
        .record_decision(
            "Use SQLite",
            Some("single file, no server".to_string()),
            vec!["Postgres".to_string(), "".to_string()],
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(decision.alternatives, vec!["Postgres"]);
    let text = render::decision(&decision);
    assert!(text.contains("**Reasoning:** single file, no server"));
    assert!(text.contains("**Alternatives:** Postgres"));
}

#[tokio::test(flavor = "multi_thread")]
async fn end_session_completes_and_clears_current() {
    let (_temp, manager) = setup();
    let started = manager.start(None, vec![], None).await.unwrap();
    manager.record_insight("one", None, None).await.unwrap();

    let ended = manager
        .end(Some("done for today".to_string()))
        .await
        .unwrap()
        .expect("active session");

    assert_eq!(ended.id, started.id);
    assert_eq!(ended.status, SessionStatus::Completed);
    assert_eq!(ended.summary.as_deref(), Some("done for today"));
    assert!(ended.ended_at.is_some());
    assert!(ended.metrics.duration_secs.is_some());

    let listing = manager.list(&SessionFilter::default()).await.unwrap();
    assert!(listing.current.is_none());
    assert_eq!(listing.sessions[0].1.status, SessionStatus::Completed);

    // The ended session is still reachable by id and by prefix.
    let by_id = manager.summary(Some(&started.id)).await.unwrap().unwrap();
    assert_eq!(by_id.insights.len(), 1);
    let by_prefix = manager.summary(Some(&started.id[..8])).await.unwrap().unwrap();
    assert_eq!(by_prefix.id, started.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn summary_of_unknown_session_is_not_found() {
    let (_temp, manager) = setup();
    manager.start(None, vec![], None).await.unwrap();

    let result = manager.summary(Some("deadbeef-0000")).await;
    assert!(matches!(result, Err(SessionError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn summary_rejects_ids_that_leave_the_sessions_dir() {
    let (temp, manager) = setup();
    manager.start(None, vec![], None).await.unwrap();
    std::fs::write(temp.path().join("outside.json"), "{}").unwrap();

    for id in ["../outside", "..", "a/b", "a\\b", "index.json"] {
        let result = manager.summary(Some(id)).await;
        assert!(
            matches!(result, Err(SessionError::Validation { .. })),
            "{} should be rejected",
            id
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn list_filters_by_status_and_tag() {
    let (_temp, manager) = setup();
    manager
        .start(Some("first".to_string()), vec!["infra".to_string()], None)
        .await
        .unwrap();
    manager.end(None).await.unwrap();
    manager
        .start(Some("second".to_string()), vec!["docs".to_string()], None)
        .await
        .unwrap();

    let active = manager
        .list(&SessionFilter {
            status: Some(SessionStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.sessions.len(), 1);
    assert_eq!(active.sessions[0].1.goal, "second");

    let infra = manager
        .list(&SessionFilter {
            tag: Some("infra".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(infra.sessions.len(), 1);
    assert_eq!(infra.sessions[0].1.goal, "first");

    let limited = manager
        .list(&SessionFilter {
            limit: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.sessions.len(), 1);
    assert_eq!(limited.total, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn state_survives_a_new_manager() {
    let (temp, manager) = setup();
    let started = manager.start(None, vec![], None).await.unwrap();
    drop(manager);

    let reopened = SessionManager::new(temp.path().join("sessions"));
    let current = reopened.summary(None).await.unwrap().expect("still current");
    assert_eq!(current.id, started.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn tracking_files_and_commands() {
    let (_temp, manager) = setup();
    manager.track_file("ignored.rs").await.unwrap();
    manager.start(None, vec![], None).await.unwrap();

    manager.track_file("src/lib.rs").await.unwrap();
    manager.track_file("src/lib.rs").await.unwrap();
    manager.track_command("cargo fmt").await.unwrap();

    let session = manager.summary(None).await.unwrap().unwrap();
    assert_eq!(session.files_modified, vec!["src/lib.rs"]);
    assert_eq!(session.commands_run, vec!["cargo fmt"]);
    assert!(render::summary(&session).contains("**Files Modified:** 1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_listing_renders_guidance() {
    let (_temp, manager) = setup();

    let listing = manager.list(&SessionFilter::default()).await.unwrap();
    assert!(render::listing(&listing).contains("No sessions found"));
}
