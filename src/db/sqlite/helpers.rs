//! Shared helper functions for SQLite repositories.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::db::{DbResult, Memory};

/// Column list shared by every memory SELECT.
pub const MEMORY_COLUMNS: &str = "memory_key, content, category, importance, tags, context, \
     project_context, semantic_keywords, content_hash, created_at, updated_at, access_count";

/// Current UTC time in the format stored in timestamp columns.
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Serialize a string list column.
pub fn encode_list(items: &[String]) -> DbResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Deserialize a string list column. Empty or NULL-ish text yields an empty list.
pub fn decode_list(raw: &str) -> DbResult<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Build a LIMIT clause; `None` leaves the query unbounded.
pub fn build_limit_clause(limit: Option<usize>) -> String {
    match limit {
        Some(limit) => format!(" LIMIT {}", limit),
        None => String::new(),
    }
}

/// `?, ?, ?` placeholder list for IN clauses.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Map a row selected with [`MEMORY_COLUMNS`] to a [`Memory`].
pub fn memory_from_row(row: &SqliteRow) -> DbResult<Memory> {
    let tags_json: String = row.get("tags");
    let concepts_json: String = row.get("semantic_keywords");

    Ok(Memory {
        key: row.get("memory_key"),
        content: row.get("content"),
        category: row.get("category"),
        importance: row.get("importance"),
        tags: decode_list(&tags_json)?,
        context: row.get("context"),
        project_context: row.get("project_context"),
        concepts: decode_list(&concepts_json)?,
        content_hash: row.get("content_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        access_count: row.get("access_count"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_round_trip_keeps_commas_inside_items() {
        let items = vec!["a, b".to_string(), "c".to_string()];
        let encoded = encode_list(&items).unwrap();
        assert_eq!(decode_list(&encoded).unwrap(), items);
    }

    #[test]
    fn decode_empty_column_is_empty_list() {
        assert!(decode_list("").unwrap().is_empty());
        assert!(decode_list("[]").unwrap().is_empty());
    }

    #[test]
    fn limit_clause() {
        assert_eq!(build_limit_clause(Some(10)), " LIMIT 10");
        assert_eq!(build_limit_clause(None), "");
    }

    #[test]
    fn placeholder_list() {
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(1), "?");
    }

    #[test]
    fn timestamp_format() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }
}
