//! Persistent memory: concept extraction, scoring and the store itself.
//!
//! Memories are free-text notes with derived concepts. Retrieval is Jaccard
//! overlap between the concepts of a query and those of each memory; related
//! memories are found through the concept index and linked both ways.

pub mod concepts;
pub mod render;
pub mod scoring;
mod store;

#[cfg(test)]
mod store_test;

pub use concepts::extract_concepts;
pub use store::{
    Insights, MemoryStore, NewMemory, Recalled, RelatedMemory, ScoredMemory, SearchOutcome,
    SearchRequest, Stored, Synthesis, SynthesisReport,
};
