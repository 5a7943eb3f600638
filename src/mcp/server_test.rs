//! Tests for MCP server composition

use std::collections::HashSet;

use rmcp::ServerHandler;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{Database, SqliteDatabase};
use crate::mcp::{McpServer, Toolbox};

async fn setup() -> (TempDir, McpServer<SqliteDatabase>) {
    let dir = TempDir::new().unwrap();
    let config = Config::new().with_data_dir(dir.path().join("data"));
    config.ensure_dirs().unwrap();

    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Failed to run migrations");

    let toolbox = Toolbox::new(config, db).expect("Failed to build toolbox");
    (dir, McpServer::new(&toolbox))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_info() {
    let (_dir, server) = setup().await;

    let info = server.get_info();
    assert!(info.capabilities.tools.is_some());
    assert!(
        info.instructions
            .as_deref()
            .is_some_and(|i| i.contains("bb7_welcome"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_all_tools_are_listed_once() {
    let (_dir, server) = setup().await;

    let tools = server.tools();
    let names: HashSet<&str> = tools.iter().map(|t| &*t.name).collect();
    assert_eq!(names.len(), tools.len(), "tool names must be unique");
    assert_eq!(tools.len(), 42);
    assert!(names.iter().all(|n| n.starts_with("bb7_")));

    for expected in [
        "bb7_memory_store",
        "bb7_start_session",
        "bb7_read_file",
        "bb7_execute_command",
        "bb7_fetch_url",
        "bb7_analyze_code",
        "bb7_project_health_check",
        "bb7_server_info",
    ] {
        assert!(names.contains(expected), "missing {}", expected);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_families_match_tool_count() {
    let (_dir, server) = setup().await;

    let families = server.families();
    let names: Vec<&str> = families.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        [
            "Memory",
            "Session",
            "Files",
            "Shell",
            "Web",
            "Code Analysis",
            "Project",
            "System"
        ]
    );
    let total: usize = families.iter().map(|f| f.tools).sum();
    assert_eq!(total, server.tools().len());
}
