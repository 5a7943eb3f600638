//! Domain models for the memory store.
//!
//! These models are storage-agnostic; the SQLite layer maps them onto the
//! `memories`, `concepts` and `memory_relationships` tables.

use serde::{Deserialize, Serialize};

/// Relationship type written by the store when linking related memories.
pub const SEMANTIC_RELATIONSHIP: &str = "semantic";

/// A persisted memory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub key: String,
    pub content: String,
    pub category: String,
    pub importance: f64,
    pub tags: Vec<String>,
    pub context: Option<String>,
    pub project_context: Option<String>,
    /// Concepts extracted from the content, lowercased.
    pub concepts: Vec<String>,
    pub content_hash: String,
    pub created_at: String,
    pub updated_at: String,
    pub access_count: i64,
}

/// Filters for candidate selection.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    pub category: Option<String>,
    pub min_importance: Option<f64>,
    /// Candidate cap; repositories order by importance descending.
    pub limit: Option<usize>,
}

/// Row of the concept index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEntry {
    pub concept: String,
    pub memory_ids: Vec<String>,
    pub frequency: i64,
}

/// Directed edge between two memories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub memory_a: String,
    pub memory_b: String,
    pub relationship_type: String,
    pub strength: f64,
}

/// Aggregates for a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub count: i64,
    pub avg_importance: f64,
    pub last_updated: Option<String>,
}

/// Store-wide aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: i64,
    /// importance >= 0.8
    pub high: i64,
    /// 0.5 <= importance < 0.8
    pub medium: i64,
    pub low: i64,
    pub avg_importance: f64,
    pub total_accesses: i64,
}
