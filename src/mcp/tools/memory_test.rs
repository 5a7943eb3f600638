//! Tests for memory MCP tools

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, RawContent};

use crate::db::{Database, SqliteDatabase};
use crate::mcp::tools::memory::{
    ListCategoriesParams, MemoryTools, RecallMemoryParams, SearchMemoryParams, StoreMemoryParams,
    SynthesizeParams,
};
use crate::memory::MemoryStore;

async fn setup() -> MemoryTools<SqliteDatabase> {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    MemoryTools::new(MemoryStore::new(Arc::new(db)))
}

fn text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    }
}

fn store_params(key: &str, content: &str) -> StoreMemoryParams {
    StoreMemoryParams {
        content: content.to_string(),
        category: Some("solution".to_string()),
        importance: None,
        tags: Some(vec!["async".to_string()]),
        context: None,
        project_context: Some("/work/bb7".to_string()),
        key: Some(key.to_string()),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_store_and_recall() {
    let tools = setup().await;

    let result = tools
        .memory_store(Parameters(store_params(
            "tokio-pool",
            "tokio runtime connection pool fix",
        )))
        .await
        .expect("store should succeed");
    let stored = text(&result);
    assert!(stored.contains("## Memory Stored"));
    assert!(stored.contains("`tokio-pool`"));
    assert!(stored.contains("**Tags:**"));

    let result = tools
        .memory_recall(Parameters(RecallMemoryParams {
            key: " tokio-pool ".to_string(),
            include_related: None,
        }))
        .await
        .expect("recall should succeed");
    let recalled = text(&result);
    assert!(recalled.contains("## Memory Recall: tokio-pool"));
    assert!(recalled.contains("tokio runtime connection pool fix"));
    assert!(recalled.contains("- **Project:** /work/bb7"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recall_missing_key_is_not_an_error() {
    let tools = setup().await;

    let result = tools
        .memory_recall(Parameters(RecallMemoryParams {
            key: "nope".to_string(),
            include_related: Some(false),
        }))
        .await
        .expect("missing key should still succeed");
    assert!(text(&result).starts_with("Memory 'nope' not found."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_store_rejects_empty_content() {
    let tools = setup().await;

    let err = tools
        .memory_store(Parameters(store_params("blank", "   ")))
        .await
        .expect_err("empty content should be rejected");
    assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_finds_stored_memory() {
    let tools = setup().await;
    tools
        .memory_store(Parameters(store_params("exact", "tokio runtime")))
        .await
        .unwrap();
    tools
        .memory_store(Parameters(store_params("garden", "gardening tips for spring")))
        .await
        .unwrap();

    let result = tools
        .memory_search(Parameters(SearchMemoryParams {
            query: "tokio runtime".to_string(),
            limit: Some(5),
            category: None,
            min_importance: None,
            include_context: Some(true),
        }))
        .await
        .unwrap();
    let found = text(&result);
    assert!(found.contains("## Memory Search Results"));
    assert!(found.contains("exact"));
    assert!(!found.contains("garden"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_empty_store() {
    let tools = setup().await;

    let result = tools
        .memory_search(Parameters(SearchMemoryParams {
            query: "anything".to_string(),
            limit: None,
            category: None,
            min_importance: None,
            include_context: None,
        }))
        .await
        .unwrap();
    assert!(text(&result).starts_with("No memories found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_synthesize_needs_enough_memories() {
    let tools = setup().await;
    tools
        .memory_store(Parameters(store_params("one", "tokio runtime notes")))
        .await
        .unwrap();

    let result = tools
        .memory_synthesize(Parameters(SynthesizeParams {
            topic: "tokio".to_string(),
            min_memories: None,
            include_cross_project: None,
        }))
        .await
        .unwrap();
    assert!(text(&result).contains("## Synthesis Incomplete"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_categories_and_insights() {
    let tools = setup().await;

    let empty = tools
        .memory_list_categories(Parameters(ListCategoriesParams {
            include_stats: None,
        }))
        .await
        .unwrap();
    assert!(text(&empty).starts_with("No memories found."));

    tools
        .memory_store(Parameters(store_params("k1", "sqlite migration strategy")))
        .await
        .unwrap();

    let listed = tools
        .memory_list_categories(Parameters(ListCategoriesParams {
            include_stats: Some(true),
        }))
        .await
        .unwrap();
    let listed = text(&listed);
    assert!(listed.contains("## Memory Categories"));
    assert!(listed.contains("### Solution"));

    let insights = tools.memory_insights().await.unwrap();
    assert!(text(&insights).contains("## Memory System Insights"));
}
