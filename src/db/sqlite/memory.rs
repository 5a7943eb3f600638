//! SQLite MemoryRepository implementation.

use sqlx::{Row, SqlitePool};

use super::helpers::{
    MEMORY_COLUMNS, build_limit_clause, encode_list, memory_from_row, placeholders,
};
use crate::db::{
    CategoryStats, DbError, DbResult, Memory, MemoryQuery, MemoryRepository, MemoryStats,
};

/// SQLx-backed memory repository.
pub struct SqliteMemoryRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> MemoryRepository for SqliteMemoryRepository<'a> {
    async fn upsert(&self, memory: &Memory) -> DbResult<()> {
        if memory.key.trim().is_empty() {
            return Err(DbError::Validation {
                message: "memory key cannot be empty".to_string(),
            });
        }

        let tags_json = encode_list(&memory.tags)?;
        let concepts_json = encode_list(&memory.concepts)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO memories
                (memory_key, content, category, importance, tags, context, project_context,
                 semantic_keywords, content_hash, created_at, updated_at, access_count)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&memory.key)
        .bind(&memory.content)
        .bind(&memory.category)
        .bind(memory.importance)
        .bind(tags_json)
        .bind(&memory.context)
        .bind(&memory.project_context)
        .bind(concepts_json)
        .bind(&memory.content_hash)
        .bind(&memory.created_at)
        .bind(&memory.updated_at)
        .bind(memory.access_count)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> DbResult<Memory> {
        let sql = format!("SELECT {} FROM memories WHERE memory_key = ?", MEMORY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => memory_from_row(&row),
            None => Err(DbError::NotFound {
                entity_type: "Memory".to_string(),
                id: key.to_string(),
            }),
        }
    }

    async fn get_many(&self, keys: &[String]) -> DbResult<Vec<Memory>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM memories WHERE memory_key IN ({}) ORDER BY importance DESC",
            MEMORY_COLUMNS,
            placeholders(keys.len())
        );
        let mut query = sqlx::query(&sql);
        for key in keys {
            query = query.bind(key);
        }

        let rows = query.fetch_all(self.pool).await?;
        rows.iter().map(memory_from_row).collect()
    }

    async fn record_access(&self, keys: &[String]) -> DbResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE memories SET access_count = access_count + 1 WHERE memory_key IN ({})",
            placeholders(keys.len())
        );
        let mut query = sqlx::query(&sql);
        for key in keys {
            query = query.bind(key);
        }
        query.execute(self.pool).await?;

        Ok(())
    }

    async fn candidates(&self, filter: &MemoryQuery) -> DbResult<Vec<Memory>> {
        let mut where_clauses: Vec<&str> = Vec::new();
        if filter.category.is_some() {
            where_clauses.push("category = ?");
        }
        if filter.min_importance.is_some() {
            where_clauses.push("importance >= ?");
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM memories{} ORDER BY importance DESC, updated_at DESC{}",
            MEMORY_COLUMNS,
            where_sql,
            build_limit_clause(filter.limit)
        );

        let mut query = sqlx::query(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }
        if let Some(min) = filter.min_importance {
            query = query.bind(min);
        }

        let rows = query.fetch_all(self.pool).await?;
        rows.iter().map(memory_from_row).collect()
    }

    async fn most_accessed(&self, limit: usize) -> DbResult<Vec<Memory>> {
        let sql = format!(
            "SELECT {} FROM memories ORDER BY access_count DESC, importance DESC LIMIT ?",
            MEMORY_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(self.pool)
            .await?;
        rows.iter().map(memory_from_row).collect()
    }

    async fn category_stats(&self) -> DbResult<Vec<CategoryStats>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) AS count, AVG(importance) AS avg_importance,
                   MAX(updated_at) AS last_updated
            FROM memories
            GROUP BY category
            ORDER BY count DESC, category ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CategoryStats {
                category: row.get("category"),
                count: row.get("count"),
                avg_importance: row.get("avg_importance"),
                last_updated: row.get("last_updated"),
            })
            .collect())
    }

    async fn stats(&self) -> DbResult<MemoryStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN importance >= 0.8 THEN 1 ELSE 0 END), 0) AS high,
                COALESCE(SUM(CASE WHEN importance >= 0.5 AND importance < 0.8 THEN 1 ELSE 0 END), 0) AS medium,
                COALESCE(SUM(CASE WHEN importance < 0.5 THEN 1 ELSE 0 END), 0) AS low,
                COALESCE(AVG(importance), 0.0) AS avg_importance,
                COALESCE(SUM(access_count), 0) AS total_accesses
            FROM memories
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(MemoryStats {
            total: row.get("total"),
            high: row.get("high"),
            medium: row.get("medium"),
            low: row.get("low"),
            avg_importance: row.get("avg_importance"),
            total_accesses: row.get("total_accesses"),
        })
    }
}
