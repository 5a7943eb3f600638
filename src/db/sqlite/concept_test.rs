//! Tests for SqliteConceptRepository.

use crate::db::{ConceptRepository, Database, SqliteDatabase};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    db
}

#[tokio::test(flavor = "multi_thread")]
async fn concept_index_appends_keys_and_counts() {
    let db = setup_db().await;
    let concepts = db.concepts();

    let list = vec!["sqlite".to_string(), "connection pool".to_string()];
    concepts.index("m1", &list).await.unwrap();
    concepts.index("m2", &list[..1]).await.unwrap();

    let sqlite = concepts.lookup("sqlite").await.unwrap().expect("indexed");
    assert_eq!(sqlite.memory_ids, vec!["m1", "m2"]);
    assert_eq!(sqlite.frequency, 2);

    let pool = concepts.lookup("connection pool").await.unwrap().expect("indexed");
    assert_eq!(pool.frequency, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concept_index_is_idempotent_per_key() {
    let db = setup_db().await;
    let concepts = db.concepts();

    let list = vec!["retry".to_string()];
    concepts.index("m1", &list).await.unwrap();
    concepts.index("m1", &list).await.unwrap();

    let entry = concepts.lookup("retry").await.unwrap().unwrap();
    assert_eq!(entry.memory_ids, vec!["m1"]);
    assert_eq!(entry.frequency, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concept_lookup_missing_is_none() {
    let db = setup_db().await;

    assert!(db.concepts().lookup("nothing").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn concept_top_orders_by_frequency() {
    let db = setup_db().await;
    let concepts = db.concepts();

    concepts
        .index("m1", &["alpha".to_string(), "beta".to_string()])
        .await
        .unwrap();
    concepts.index("m2", &["beta".to_string()]).await.unwrap();

    let top = concepts.top(10).await.unwrap();
    assert_eq!(top[0].concept, "beta");
    assert_eq!(top[1].concept, "alpha");
}
