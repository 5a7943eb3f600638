//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing the memory store logic.

use std::future::Future;

use crate::db::{
    DbResult,
    models::{CategoryStats, ConceptEntry, Memory, MemoryQuery, MemoryStats, Relationship},
};

/// Repository for memory rows.
pub trait MemoryRepository: Send + Sync {
    /// Insert or replace a memory by key.
    fn upsert(&self, memory: &Memory) -> impl Future<Output = DbResult<()>> + Send;

    /// Get a memory by key.
    fn get(&self, key: &str) -> impl Future<Output = DbResult<Memory>> + Send;

    /// Fetch several memories by key; unknown keys are skipped.
    fn get_many(&self, keys: &[String]) -> impl Future<Output = DbResult<Vec<Memory>>> + Send;

    /// Increment the access counter of each key.
    fn record_access(&self, keys: &[String]) -> impl Future<Output = DbResult<()>> + Send;

    /// Memories matching the filters, ordered by importance descending.
    fn candidates(
        &self,
        query: &MemoryQuery,
    ) -> impl Future<Output = DbResult<Vec<Memory>>> + Send;

    /// Most accessed memories first.
    fn most_accessed(&self, limit: usize) -> impl Future<Output = DbResult<Vec<Memory>>> + Send;

    /// Per-category aggregates ordered by count descending.
    fn category_stats(&self) -> impl Future<Output = DbResult<Vec<CategoryStats>>> + Send;

    /// Store-wide aggregates.
    fn stats(&self) -> impl Future<Output = DbResult<MemoryStats>> + Send;
}

/// Repository for the concept -> memory index.
pub trait ConceptRepository: Send + Sync {
    /// Append `memory_key` to the index row of every concept.
    fn index(
        &self,
        memory_key: &str,
        concepts: &[String],
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Look up a single concept.
    fn lookup(&self, concept: &str) -> impl Future<Output = DbResult<Option<ConceptEntry>>> + Send;

    /// Concepts ordered by frequency descending.
    fn top(&self, limit: usize) -> impl Future<Output = DbResult<Vec<ConceptEntry>>> + Send;
}

/// Repository for memory relationships.
pub trait RelationshipRepository: Send + Sync {
    /// Insert or replace an edge.
    fn link(&self, relationship: &Relationship) -> impl Future<Output = DbResult<()>> + Send;

    /// Outgoing edges of a memory, strongest first.
    fn for_memory(
        &self,
        memory_key: &str,
    ) -> impl Future<Output = DbResult<Vec<Relationship>>> + Send;
}

/// Database abstraction providing access to all repositories.
pub trait Database: Send + Sync {
    type Memories<'a>: MemoryRepository
    where
        Self: 'a;
    type Concepts<'a>: ConceptRepository
    where
        Self: 'a;
    type Relationships<'a>: RelationshipRepository
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Cheap round trip used by health checks.
    fn ping(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn memories(&self) -> Self::Memories<'_>;

    fn concepts(&self) -> Self::Concepts<'_>;

    fn relationships(&self) -> Self::Relationships<'_>;
}
