//! Tests for SqliteMemoryRepository.

use crate::db::{Database, DbError, Memory, MemoryQuery, MemoryRepository, SqliteDatabase};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

fn make_memory(key: &str, category: &str, importance: f64) -> Memory {
    Memory {
        key: key.to_string(),
        content: format!("content for {}", key),
        category: category.to_string(),
        importance,
        tags: vec![],
        context: None,
        project_context: None,
        concepts: vec![],
        content_hash: "0123456789abcdef".to_string(),
        created_at: "2025-01-01 00:00:00".to_string(),
        updated_at: "2025-01-01 00:00:00".to_string(),
        access_count: 0,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_upsert_and_get() {
    let db = setup_db().await;
    let memories = db.memories();

    let memory = Memory {
        tags: vec!["rust".to_string(), "async, io".to_string()],
        concepts: vec!["tokio runtime".to_string(), "spawn_blocking".to_string()],
        context: Some("debugging session".to_string()),
        project_context: Some("bb7".to_string()),
        ..make_memory("insight_1", "insight", 0.9)
    };

    memories.upsert(&memory).await.expect("Upsert should succeed");

    let retrieved = memories.get("insight_1").await.expect("Get should succeed");
    assert_eq!(retrieved, memory);
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_get_nonexistent_returns_not_found() {
    let db = setup_db().await;

    let result = db.memories().get("missing").await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_upsert_rejects_empty_key() {
    let db = setup_db().await;

    let result = db.memories().upsert(&make_memory("  ", "note", 0.4)).await;
    assert!(matches!(result, Err(DbError::Validation { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_upsert_replaces_existing_row() {
    let db = setup_db().await;
    let memories = db.memories();

    memories.upsert(&make_memory("k", "note", 0.4)).await.unwrap();
    memories.record_access(&["k".to_string()]).await.unwrap();

    let replacement = Memory {
        content: "new content".to_string(),
        ..make_memory("k", "decision", 0.9)
    };
    memories.upsert(&replacement).await.unwrap();

    let retrieved = memories.get("k").await.unwrap();
    assert_eq!(retrieved.content, "new content");
    assert_eq!(retrieved.category, "decision");
    assert_eq!(retrieved.access_count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_record_access_increments_counter() {
    let db = setup_db().await;
    let memories = db.memories();

    memories.upsert(&make_memory("a", "note", 0.4)).await.unwrap();
    memories.upsert(&make_memory("b", "note", 0.4)).await.unwrap();

    let keys = vec!["a".to_string(), "b".to_string()];
    memories.record_access(&keys).await.unwrap();
    memories.record_access(&keys[..1]).await.unwrap();

    assert_eq!(memories.get("a").await.unwrap().access_count, 2);
    assert_eq!(memories.get("b").await.unwrap().access_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_candidates_filter_and_order() {
    let db = setup_db().await;
    let memories = db.memories();

    memories.upsert(&make_memory("low", "note", 0.2)).await.unwrap();
    memories.upsert(&make_memory("mid", "insight", 0.6)).await.unwrap();
    memories.upsert(&make_memory("high", "insight", 0.95)).await.unwrap();

    let all = memories.candidates(&MemoryQuery::default()).await.unwrap();
    let keys: Vec<&str> = all.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["high", "mid", "low"]);

    let insights = memories
        .candidates(&MemoryQuery {
            category: Some("insight".to_string()),
            min_importance: Some(0.7),
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].key, "high");

    let limited = memories
        .candidates(&MemoryQuery {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_get_many_skips_unknown_keys() {
    let db = setup_db().await;
    let memories = db.memories();

    memories.upsert(&make_memory("a", "note", 0.3)).await.unwrap();
    memories.upsert(&make_memory("b", "note", 0.8)).await.unwrap();

    let found = memories
        .get_many(&["a".to_string(), "zzz".to_string(), "b".to_string()])
        .await
        .unwrap();
    let keys: Vec<&str> = found.iter().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["b", "a"]);

    assert!(memories.get_many(&[]).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_category_stats_and_totals() {
    let db = setup_db().await;
    let memories = db.memories();

    memories.upsert(&make_memory("i1", "insight", 0.9)).await.unwrap();
    memories.upsert(&make_memory("i2", "insight", 0.7)).await.unwrap();
    memories.upsert(&make_memory("n1", "note", 0.3)).await.unwrap();
    memories.record_access(&["n1".to_string()]).await.unwrap();

    let stats = memories.category_stats().await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].category, "insight");
    assert_eq!(stats[0].count, 2);
    assert!((stats[0].avg_importance - 0.8).abs() < 1e-9);

    let totals = memories.stats().await.unwrap();
    assert_eq!(totals.total, 3);
    assert_eq!(totals.high, 1);
    assert_eq!(totals.medium, 1);
    assert_eq!(totals.low, 1);
    assert_eq!(totals.total_accesses, 1);

    let accessed = memories.most_accessed(1).await.unwrap();
    assert_eq!(accessed[0].key, "n1");
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_stats_on_empty_store() {
    let db = setup_db().await;

    let totals = db.memories().stats().await.unwrap();
    assert_eq!(totals.total, 0);
    assert_eq!(totals.avg_importance, 0.0);
}
