//! SQLite RelationshipRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::{DbResult, Relationship, RelationshipRepository};

/// SQLx-backed relationship repository.
pub struct SqliteRelationshipRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> RelationshipRepository for SqliteRelationshipRepository<'a> {
    async fn link(&self, relationship: &Relationship) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO memory_relationships
                (memory_a, memory_b, relationship_type, strength)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&relationship.memory_a)
        .bind(&relationship.memory_b)
        .bind(&relationship.relationship_type)
        .bind(relationship.strength)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn for_memory(&self, memory_key: &str) -> DbResult<Vec<Relationship>> {
        let rows = sqlx::query(
            r#"
            SELECT memory_a, memory_b, relationship_type, strength
            FROM memory_relationships
            WHERE memory_a = ?
            ORDER BY strength DESC, memory_b ASC
            "#,
        )
        .bind(memory_key)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Relationship {
                memory_a: row.get("memory_a"),
                memory_b: row.get("memory_b"),
                relationship_type: row.get("relationship_type"),
                strength: row.get("strength"),
            })
            .collect())
    }
}
