//! Tests for MemoryStore.

use std::sync::Arc;

use crate::db::{
    Database, DbError, MemoryRepository, Relationship, RelationshipRepository, SqliteDatabase,
};
use crate::memory::render;
use crate::memory::{MemoryStore, NewMemory, SearchOutcome, SearchRequest, Synthesis};

async fn setup_store() -> MemoryStore<SqliteDatabase> {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    MemoryStore::new(Arc::new(db))
}

fn note(key: &str, content: &str) -> NewMemory {
    NewMemory {
        content: content.to_string(),
        key: Some(key.to_string()),
        project_context: Some("/work/bb7".to_string()),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn store_generates_key_and_scores_importance() {
    let store = setup_store().await;

    let stored = store
        .store(NewMemory {
            content: "Fixed the connection pool bug".to_string(),
            category: Some("solution".to_string()),
            ..Default::default()
        })
        .await
        .expect("store should succeed");

    let memory = &stored.memory;
    assert!(memory.key.starts_with("solution_"));
    assert_eq!(memory.key.rsplit('_').next().map(str::len), Some(8));
    assert_eq!(memory.content_hash.len(), 16);
    assert!(memory.importance > 0.80);
    assert!(memory.concepts.contains(&"connection pool".to_string()));
    assert!(stored.related.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_empty_content() {
    let store = setup_store().await;

    let result = store.store(note("k", "   ")).await;
    assert!(matches!(result, Err(DbError::Validation { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn store_normalizes_category_and_clamps_importance() {
    let store = setup_store().await;

    let stored = store
        .store(NewMemory {
            category: Some("rumour".to_string()),
            importance: Some(4.2),
            ..note("k", "some content here")
        })
        .await
        .unwrap();

    assert_eq!(stored.memory.category, "note");
    assert_eq!(stored.memory.importance, 1.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn store_links_related_memories_both_ways() {
    let store = setup_store().await;

    store
        .store(note("first", "tokio runtime scheduling internals"))
        .await
        .unwrap();
    let second = store
        .store(note("second", "tokio runtime blocking pitfalls"))
        .await
        .unwrap();

    assert_eq!(second.related.len(), 1);
    assert_eq!(second.related[0].key, "first");

    let relationships = store.db().relationships();
    let from_first = relationships.for_memory("first").await.unwrap();
    let from_second = relationships.for_memory("second").await.unwrap();
    assert_eq!(from_first[0].memory_b, "second");
    assert_eq!(from_second[0].memory_b, "first");

    let expected = (second.related[0].importance * 0.5 + 0.3).min(1.0);
    assert!((from_first[0].strength - expected).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn store_with_same_key_replaces_and_resets_access() {
    let store = setup_store().await;

    store.store(note("k", "original text body")).await.unwrap();
    store.recall("k", false).await.unwrap();
    store.store(note("k", "rewritten text body")).await.unwrap();

    let memory = store.db().memories().get("k").await.unwrap();
    assert_eq!(memory.content, "rewritten text body");
    assert_eq!(memory.access_count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_ranks_by_concept_overlap_and_bumps_access() {
    let store = setup_store().await;

    store
        .store(note("exact", "tokio runtime"))
        .await
        .unwrap();
    store
        .store(note("partial", "tokio runtime tuning guide for servers"))
        .await
        .unwrap();
    store
        .store(note("unrelated", "gardening tips for spring"))
        .await
        .unwrap();

    let outcome = store
        .search(&SearchRequest::new("tokio runtime"))
        .await
        .unwrap();

    let SearchOutcome::Found { hits, candidates, .. } = outcome else {
        panic!("expected search hits");
    };
    assert_eq!(candidates, 3);
    let keys: Vec<&str> = hits.iter().map(|h| h.memory.key.as_str()).collect();
    assert_eq!(keys, vec!["exact", "partial"]);
    assert!(hits[0].score > hits[1].score);
    assert_eq!(hits[0].memory.access_count, 1);

    let stored = store.db().memories().get("exact").await.unwrap();
    assert_eq!(stored.access_count, 1);
    let untouched = store.db().memories().get("unrelated").await.unwrap();
    assert_eq!(untouched.access_count, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_falls_back_to_substring_match() {
    let store = setup_store().await;
    store.store(note("magic", "xyzzy plugh")).await.unwrap();

    let outcome = store.search(&SearchRequest::new("zz")).await.unwrap();

    let SearchOutcome::Found { hits, .. } = outcome else {
        panic!("expected substring hit");
    };
    assert_eq!(hits.len(), 1);
    assert!((hits[0].score - 0.05).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_distinguishes_empty_store_from_no_match() {
    let store = setup_store().await;

    let empty = store.search(&SearchRequest::new("anything")).await.unwrap();
    assert!(matches!(empty, SearchOutcome::NoCandidates));

    store.store(note("k", "alpha beta gamma")).await.unwrap();
    let miss = store.search(&SearchRequest::new("qwertyuiop")).await.unwrap();
    assert!(matches!(miss, SearchOutcome::NoMatches));

    let filtered = store
        .search(&SearchRequest {
            category: Some("insight".to_string()),
            ..SearchRequest::new("alpha")
        })
        .await
        .unwrap();
    assert!(matches!(filtered, SearchOutcome::NoCandidates));
}

#[tokio::test(flavor = "multi_thread")]
async fn search_respects_limit() {
    let store = setup_store().await;
    for i in 0..5 {
        store
            .store(note(&format!("m{}", i), "shared vocabulary words"))
            .await
            .unwrap();
    }

    let outcome = store
        .search(&SearchRequest {
            limit: 2,
            ..SearchRequest::new("shared vocabulary")
        })
        .await
        .unwrap();

    let SearchOutcome::Found { hits, scored, .. } = outcome else {
        panic!("expected hits");
    };
    assert_eq!(hits.len(), 2);
    assert_eq!(scored, 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn recall_returns_none_for_missing_key() {
    let store = setup_store().await;

    assert!(store.recall("nope", true).await.unwrap().is_none());
    assert!(render::recall_missing("nope").contains("'nope' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn recall_bumps_access_and_lists_related() {
    let store = setup_store().await;
    store
        .store(note("a", "sqlite migrations checklist"))
        .await
        .unwrap();
    store
        .store(note("b", "sqlite migrations rollback"))
        .await
        .unwrap();

    let recalled = store.recall("a", true).await.unwrap().expect("exists");
    assert_eq!(recalled.memory.access_count, 1);
    assert_eq!(recalled.related.len(), 1);
    assert_eq!(recalled.related[0].key, "b");

    let again = store.recall("a", false).await.unwrap().expect("exists");
    assert_eq!(again.memory.access_count, 2);
    assert!(again.related.is_empty());

    let text = render::recall(&recalled);
    assert!(text.contains("## Memory Recall: a"));
    assert!(text.contains("Related Memories (1)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn recall_follows_stored_relationships() {
    let store = setup_store().await;
    store
        .store(note("deploy", "kubernetes rollout procedure"))
        .await
        .unwrap();
    store
        .store(note("recipe", "sourdough starter feeding"))
        .await
        .unwrap();

    let relationships = store.db().relationships();
    for (target, strength) in [("recipe", 0.9), ("gone", 1.0)] {
        relationships
            .link(&Relationship {
                memory_a: "deploy".to_string(),
                memory_b: target.to_string(),
                relationship_type: "manual".to_string(),
                strength,
            })
            .await
            .unwrap();
    }

    let recalled = store.recall("deploy", true).await.unwrap().expect("exists");
    let keys: Vec<&str> = recalled.related.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, ["recipe"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn synthesize_requires_minimum_memories() {
    let store = setup_store().await;
    store
        .store(note("one", "cache invalidation strategy"))
        .await
        .unwrap();

    let result = store.synthesize("cache invalidation", 3).await.unwrap();
    assert!(matches!(
        result,
        Synthesis::Incomplete {
            found: 1,
            needed: 3
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn synthesize_reports_categories_and_co_occurrences() {
    let store = setup_store().await;
    for (key, content) in [
        ("c1", "cache invalidation strategy for redis"),
        ("c2", "cache invalidation bugs in tests"),
        ("c3", "cache invalidation using ttl"),
    ] {
        store
            .store(NewMemory {
                category: Some("insight".to_string()),
                importance: Some(0.9),
                ..note(key, content)
            })
            .await
            .unwrap();
    }

    let result = store.synthesize("cache invalidation", 3).await.unwrap();
    let Synthesis::Complete(report) = &result else {
        panic!("expected a complete synthesis");
    };

    assert_eq!(report.memories.len(), 3);
    assert_eq!(report.categories, vec![("insight".to_string(), 3)]);
    assert_eq!(report.high_impact, 3);
    assert_eq!(report.projects, 1);
    assert!((report.avg_importance - 0.9).abs() < 1e-9);
    assert!(
        report
            .co_occurrences
            .iter()
            .any(|((a, b), count)| a == "cache" && b == "invalidation" && *count == 3)
    );

    let text = render::synthesis("cache invalidation", &result, true);
    assert!(text.contains("## Memory Synthesis: cache invalidation"));
    assert!(text.contains("insight: 3 memories (100.0%)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn synthesize_ignores_low_importance_memories() {
    let store = setup_store().await;
    store
        .store(NewMemory {
            importance: Some(0.1),
            ..note("low", "cache invalidation")
        })
        .await
        .unwrap();

    let result = store.synthesize("cache invalidation", 1).await.unwrap();
    assert!(matches!(result, Synthesis::Incomplete { found: 0, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_categories_and_insights() {
    let store = setup_store().await;
    store
        .store(NewMemory {
            category: Some("insight".to_string()),
            importance: Some(0.9),
            ..note("i1", "async runtime insight")
        })
        .await
        .unwrap();
    store
        .store(NewMemory {
            category: Some("temp".to_string()),
            importance: Some(0.2),
            ..note("t1", "scratch value")
        })
        .await
        .unwrap();
    store.recall("t1", false).await.unwrap();

    let (total, categories) = store.list_categories().await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(categories.len(), 2);
    let text = render::categories(total, &categories, true);
    assert!(text.contains("### Insight"));
    assert!(text.contains("Category Weight: 0.95"));

    let insights = store.insights().await.unwrap();
    assert_eq!(insights.stats.high, 1);
    assert_eq!(insights.stats.low, 1);
    assert_eq!(insights.most_accessed.len(), 1);
    assert_eq!(insights.most_accessed[0].key, "t1");
    assert!(
        insights
            .prolific_concepts
            .iter()
            .any(|(concept, _)| concept == "async runtime")
    );
    assert!(render::insights(&insights).contains("## Memory System Insights"));
}

#[tokio::test(flavor = "multi_thread")]
async fn insights_report_most_common_concepts() {
    let store = setup_store().await;
    store
        .store(note("first", "tokio runtime scheduling internals"))
        .await
        .unwrap();
    store
        .store(note("second", "tokio runtime blocking pitfalls"))
        .await
        .unwrap();

    let insights = store.insights().await.unwrap();
    let common = &insights.common_concepts;
    assert!(!common.is_empty() && common.len() <= 5);
    assert_eq!(common[0].1, 2);
    assert!(common.windows(2).all(|w| w[0].1 >= w[1].1));
    assert!(render::insights(&insights).contains("### Most Common Concepts"));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_store_renders_guidance() {
    let store = setup_store().await;

    let (total, categories) = store.list_categories().await.unwrap();
    assert!(render::categories(total, &categories, true).contains("No memories found"));

    let insights = store.insights().await.unwrap();
    assert!(render::insights(&insights).contains("No memories to analyze"));
}
