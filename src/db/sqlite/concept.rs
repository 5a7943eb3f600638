//! SQLite ConceptRepository implementation.

use sqlx::{Row, SqlitePool};

use super::helpers::{decode_list, encode_list};
use crate::db::{ConceptEntry, ConceptRepository, DbResult};

/// SQLx-backed concept index.
pub struct SqliteConceptRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> ConceptRepository for SqliteConceptRepository<'a> {
    async fn index(&self, memory_key: &str, concepts: &[String]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for concept in concepts {
            let existing: Option<String> =
                sqlx::query_scalar("SELECT memory_ids FROM concepts WHERE concept = ?")
                    .bind(concept)
                    .fetch_optional(&mut *tx)
                    .await?;

            let mut ids = match existing {
                Some(raw) => decode_list(&raw)?,
                None => Vec::new(),
            };
            if !ids.iter().any(|id| id == memory_key) {
                ids.push(memory_key.to_string());
            }

            sqlx::query(
                "INSERT OR REPLACE INTO concepts (concept, memory_ids, frequency) VALUES (?, ?, ?)",
            )
            .bind(concept)
            .bind(encode_list(&ids)?)
            .bind(ids.len() as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn lookup(&self, concept: &str) -> DbResult<Option<ConceptEntry>> {
        let row = sqlx::query("SELECT concept, memory_ids, frequency FROM concepts WHERE concept = ?")
            .bind(concept)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => {
                let ids_json: String = row.get("memory_ids");
                Ok(Some(ConceptEntry {
                    concept: row.get("concept"),
                    memory_ids: decode_list(&ids_json)?,
                    frequency: row.get("frequency"),
                }))
            }
            None => Ok(None),
        }
    }

    async fn top(&self, limit: usize) -> DbResult<Vec<ConceptEntry>> {
        let rows = sqlx::query(
            "SELECT concept, memory_ids, frequency FROM concepts ORDER BY frequency DESC, concept ASC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let ids_json: String = row.get("memory_ids");
                Ok(ConceptEntry {
                    concept: row.get("concept"),
                    memory_ids: decode_list(&ids_json)?,
                    frequency: row.get("frequency"),
                })
            })
            .collect()
    }
}
