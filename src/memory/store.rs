//! The memory store: persistence, concept indexing, retrieval and synthesis
//! on top of the repository traits.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::db::{
    CategoryStats, ConceptRepository, Database, DbError, DbResult, Memory, MemoryQuery,
    MemoryRepository, MemoryStats, Relationship, RelationshipRepository, SEMANTIC_RELATIONSHIP,
    sqlite::now_timestamp,
};
use crate::render::preview;

use super::concepts::extract_concepts;
use super::scoring::{
    calculate_importance, clamp_importance, content_hash, default_key, normalize_category,
    relevance,
};

const RELATED_CONCEPT_LOOKUPS: usize = 10;
const RELATED_CANDIDATES: usize = 15;
const RELATED_KEPT: usize = 8;
const RELATED_LINKED: usize = 5;
const RELATED_PREVIEW_CHARS: usize = 60;

const SEARCH_CANDIDATES: usize = 200;
const SEARCH_FALLBACK_SCORE: f64 = 0.05;

const SYNTHESIS_MIN_IMPORTANCE: f64 = 0.3;
const SYNTHESIS_CANDIDATES: usize = 100;
const SYNTHESIS_FALLBACK_SCORE: f64 = 0.1;
const SYNTHESIS_KEPT: usize = 20;
const HIGH_IMPACT_THRESHOLD: f64 = 0.7;

const PROLIFIC_IMPORTANCE: f64 = 0.8;
const COMMON_CONCEPTS: usize = 5;

/// Input for [`MemoryStore::store`].
#[derive(Debug, Clone, Default)]
pub struct NewMemory {
    pub content: String,
    pub category: Option<String>,
    pub importance: Option<f64>,
    pub tags: Vec<String>,
    pub context: Option<String>,
    pub project_context: Option<String>,
    pub key: Option<String>,
}

/// A memory reached through the concept index.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedMemory {
    pub key: String,
    pub preview: String,
    pub importance: f64,
}

#[derive(Debug, Clone)]
pub struct Stored {
    pub memory: Memory,
    pub related: Vec<RelatedMemory>,
}

/// Input for [`MemoryStore::search`].
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    pub category: Option<String>,
    pub min_importance: f64,
    pub include_context: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 10,
            category: None,
            min_importance: 0.0,
            include_context: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub memory: Memory,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Category and importance filters left nothing to score.
    NoCandidates,
    /// Candidates existed but none were relevant.
    NoMatches,
    Found {
        query_concepts: Vec<String>,
        hits: Vec<ScoredMemory>,
        scored: usize,
        candidates: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Recalled {
    pub memory: Memory,
    pub related: Vec<RelatedMemory>,
}

#[derive(Debug, Clone)]
pub struct SynthesisReport {
    pub memories: Vec<ScoredMemory>,
    pub avg_importance: f64,
    pub projects: usize,
    pub categories: Vec<(String, usize)>,
    pub top_concepts: Vec<(String, usize)>,
    pub co_occurrences: Vec<((String, String), usize)>,
    pub high_impact: usize,
}

#[derive(Debug, Clone)]
pub enum Synthesis {
    Incomplete { found: usize, needed: usize },
    Complete(SynthesisReport),
}

#[derive(Debug, Clone)]
pub struct Insights {
    pub stats: MemoryStats,
    pub categories: Vec<CategoryStats>,
    pub most_accessed: Vec<Memory>,
    pub prolific_concepts: Vec<(String, usize)>,
    /// Most frequent concepts across the whole index.
    pub common_concepts: Vec<(String, usize)>,
}

/// Concept-indexed memory store over any [`Database`].
pub struct MemoryStore<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for MemoryStore<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database> MemoryStore<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &D {
        &self.db
    }

    /// Persist a memory, index its concepts and link it to related memories.
    pub async fn store(&self, input: NewMemory) -> DbResult<Stored> {
        if input.content.trim().is_empty() {
            return Err(DbError::Validation {
                message: "content cannot be empty".to_string(),
            });
        }

        let category = normalize_category(input.category.as_deref());
        let tags: Vec<String> = input
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let importance = input
            .importance
            .and_then(clamp_importance)
            .unwrap_or_else(|| calculate_importance(&input.content, &category, &tags));

        let concepts = extract_concepts(&input.content);
        let hash = content_hash(&input.content);
        let key = match input.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => default_key(&category, chrono::Utc::now().timestamp(), &hash),
        };
        let project_context = input.project_context.or_else(|| {
            std::env::current_dir()
                .ok()
                .map(|p| p.display().to_string())
        });

        let related = self.find_related(&concepts, &key).await?;

        let now = now_timestamp();
        let memory = Memory {
            key: key.clone(),
            content: input.content,
            category,
            importance,
            tags,
            context: input.context.filter(|c| !c.trim().is_empty()),
            project_context,
            concepts,
            content_hash: hash,
            created_at: now.clone(),
            updated_at: now,
            access_count: 0,
        };

        self.db.memories().upsert(&memory).await?;
        self.db.concepts().index(&key, &memory.concepts).await?;
        self.link_related(&key, &related).await?;

        tracing::info!(
            key = %memory.key,
            category = %memory.category,
            concepts = memory.concepts.len(),
            related = related.len(),
            "Stored memory"
        );

        Ok(Stored { memory, related })
    }

    /// Rank memories against a free-text query.
    pub async fn search(&self, request: &SearchRequest) -> DbResult<SearchOutcome> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(DbError::Validation {
                message: "query cannot be empty".to_string(),
            });
        }

        let candidates = self
            .db
            .memories()
            .candidates(&MemoryQuery {
                category: request.category.clone().filter(|c| !c.trim().is_empty()),
                min_importance: (request.min_importance > 0.0).then_some(request.min_importance),
                limit: Some(SEARCH_CANDIDATES),
            })
            .await?;

        if candidates.is_empty() {
            return Ok(SearchOutcome::NoCandidates);
        }

        let query_concepts = extract_concepts(query);
        let candidate_count = candidates.len();
        let scored = score_memories(candidates, &query_concepts, query, SEARCH_FALLBACK_SCORE);
        let scored_count = scored.len();

        let hits: Vec<ScoredMemory> = scored.into_iter().take(request.limit.max(1)).collect();
        if hits.is_empty() {
            return Ok(SearchOutcome::NoMatches);
        }

        let keys: Vec<String> = hits.iter().map(|h| h.memory.key.clone()).collect();
        self.db.memories().record_access(&keys).await?;

        let hits = hits
            .into_iter()
            .map(|mut hit| {
                hit.memory.access_count += 1;
                hit
            })
            .collect();

        Ok(SearchOutcome::Found {
            query_concepts,
            hits,
            scored: scored_count,
            candidates: candidate_count,
        })
    }

    /// Fetch one memory by key, bumping its access counter.
    pub async fn recall(&self, key: &str, include_related: bool) -> DbResult<Option<Recalled>> {
        let mut memory = match self.db.memories().get(key).await {
            Ok(memory) => memory,
            Err(DbError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        self.db
            .memories()
            .record_access(std::slice::from_ref(&memory.key))
            .await?;
        memory.access_count += 1;

        let related = if include_related {
            let mut related = self.linked(&memory.key).await?;
            for other in self.find_related(&memory.concepts, &memory.key).await? {
                if related.len() == RELATED_KEPT {
                    break;
                }
                if !related.iter().any(|r| r.key == other.key) {
                    related.push(other);
                }
            }
            related
        } else {
            Vec::new()
        };

        Ok(Some(Recalled { memory, related }))
    }

    /// Aggregate the memories relevant to a topic.
    pub async fn synthesize(&self, topic: &str, min_memories: usize) -> DbResult<Synthesis> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DbError::Validation {
                message: "topic cannot be empty".to_string(),
            });
        }

        let candidates = self
            .db
            .memories()
            .candidates(&MemoryQuery {
                category: None,
                min_importance: Some(SYNTHESIS_MIN_IMPORTANCE),
                limit: Some(SYNTHESIS_CANDIDATES),
            })
            .await?;

        let topic_concepts = extract_concepts(topic);
        let mut memories =
            score_memories(candidates, &topic_concepts, topic, SYNTHESIS_FALLBACK_SCORE);
        memories.truncate(SYNTHESIS_KEPT);

        if memories.len() < min_memories || memories.is_empty() {
            return Ok(Synthesis::Incomplete {
                found: memories.len(),
                needed: min_memories,
            });
        }

        let mut categories: HashMap<String, usize> = HashMap::new();
        let mut concepts: HashMap<String, usize> = HashMap::new();
        let mut projects: HashSet<String> = HashSet::new();
        let mut pairs: HashMap<(String, String), usize> = HashMap::new();

        for scored in &memories {
            let memory = &scored.memory;
            *categories.entry(memory.category.clone()).or_default() += 1;
            for concept in &memory.concepts {
                *concepts.entry(concept.clone()).or_default() += 1;
            }
            if let Some(project) = &memory.project_context {
                projects.insert(project.clone());
            }

            let distinct: Vec<&String> = memory
                .concepts
                .iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            for (i, first) in distinct.iter().enumerate() {
                for second in &distinct[i + 1..] {
                    *pairs
                        .entry(((*first).clone(), (*second).clone()))
                        .or_default() += 1;
                }
            }
        }

        let avg_importance =
            memories.iter().map(|m| m.memory.importance).sum::<f64>() / memories.len() as f64;
        let high_impact = memories
            .iter()
            .filter(|m| m.memory.importance > HIGH_IMPACT_THRESHOLD)
            .count();
        Ok(Synthesis::Complete(SynthesisReport {
            avg_importance,
            projects: projects.len(),
            categories: most_common(categories, 3),
            top_concepts: most_common(concepts, 8),
            co_occurrences: most_common(
                pairs.into_iter().filter(|(_, count)| *count > 1).collect(),
                5,
            ),
            high_impact,
            memories,
        }))
    }

    pub async fn list_categories(&self) -> DbResult<(i64, Vec<CategoryStats>)> {
        let memories = self.db.memories();
        let stats = memories.stats().await?;
        let categories = memories.category_stats().await?;
        Ok((stats.total, categories))
    }

    /// Store-wide quality and usage report.
    pub async fn insights(&self) -> DbResult<Insights> {
        let memories = self.db.memories();
        let stats = memories.stats().await?;
        let categories = memories.category_stats().await?;
        let most_accessed = memories
            .most_accessed(5)
            .await?
            .into_iter()
            .filter(|m| m.access_count > 0)
            .collect();

        let high = memories
            .candidates(&MemoryQuery {
                category: None,
                min_importance: Some(PROLIFIC_IMPORTANCE),
                limit: None,
            })
            .await?;
        let mut concepts: HashMap<String, usize> = HashMap::new();
        for memory in &high {
            for concept in &memory.concepts {
                *concepts.entry(concept.clone()).or_default() += 1;
            }
        }

        let common_concepts = self
            .db
            .concepts()
            .top(COMMON_CONCEPTS)
            .await?
            .into_iter()
            .map(|entry| (entry.concept, entry.frequency.max(0) as usize))
            .collect();

        Ok(Insights {
            stats,
            categories,
            most_accessed,
            prolific_concepts: most_common(concepts, 5),
            common_concepts,
        })
    }

    /// Memories sharing concepts with `concepts`, excluding `exclude`,
    /// most important first.
    pub async fn find_related(
        &self,
        concepts: &[String],
        exclude: &str,
    ) -> DbResult<Vec<RelatedMemory>> {
        let index = self.db.concepts();
        let mut keys: Vec<String> = Vec::new();

        'lookup: for concept in concepts.iter().take(RELATED_CONCEPT_LOOKUPS) {
            let Some(entry) = index.lookup(concept).await? else {
                continue;
            };
            for id in entry.memory_ids {
                if id == exclude || keys.contains(&id) {
                    continue;
                }
                keys.push(id);
                if keys.len() == RELATED_CANDIDATES {
                    break 'lookup;
                }
            }
        }

        let related = self
            .db
            .memories()
            .get_many(&keys)
            .await?
            .into_iter()
            .take(RELATED_KEPT)
            .map(|m| RelatedMemory {
                preview: preview(&m.content, RELATED_PREVIEW_CHARS),
                key: m.key,
                importance: m.importance,
            })
            .collect();

        Ok(related)
    }

    /// Memories reached through stored relationship edges, strongest first.
    /// Edges pointing at deleted memories are skipped.
    async fn linked(&self, key: &str) -> DbResult<Vec<RelatedMemory>> {
        let edges = self.db.relationships().for_memory(key).await?;
        let mut keys: Vec<String> = Vec::new();
        for edge in edges {
            if edge.memory_b != key && !keys.contains(&edge.memory_b) {
                keys.push(edge.memory_b);
            }
            if keys.len() == RELATED_KEPT {
                break;
            }
        }

        let mut found: HashMap<String, Memory> = self
            .db
            .memories()
            .get_many(&keys)
            .await?
            .into_iter()
            .map(|m| (m.key.clone(), m))
            .collect();

        Ok(keys
            .iter()
            .filter_map(|k| found.remove(k))
            .map(|m| RelatedMemory {
                preview: preview(&m.content, RELATED_PREVIEW_CHARS),
                key: m.key,
                importance: m.importance,
            })
            .collect())
    }

    async fn link_related(&self, key: &str, related: &[RelatedMemory]) -> DbResult<()> {
        let relationships = self.db.relationships();
        for other in related.iter().take(RELATED_LINKED) {
            if other.key == key {
                continue;
            }
            let strength = (other.importance * 0.5 + 0.3).min(1.0);
            for (a, b) in [(key, other.key.as_str()), (other.key.as_str(), key)] {
                relationships
                    .link(&Relationship {
                        memory_a: a.to_string(),
                        memory_b: b.to_string(),
                        relationship_type: SEMANTIC_RELATIONSHIP.to_string(),
                        strength,
                    })
                    .await?;
            }
        }
        Ok(())
    }
}

/// Score by concept overlap, falling back to a flat score on substring hits.
/// Result is sorted by (score, importance) descending; zero scores dropped.
fn score_memories(
    memories: Vec<Memory>,
    query_concepts: &[String],
    query: &str,
    fallback: f64,
) -> Vec<ScoredMemory> {
    let needle = query.to_lowercase();
    let mut scored: Vec<ScoredMemory> = memories
        .into_iter()
        .filter_map(|memory| {
            let mut score = relevance(query_concepts, &memory.concepts);
            if score == 0.0 && mentions(&memory, &needle) {
                score = fallback;
            }
            (score > 0.0).then_some(ScoredMemory { memory, score })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(b.memory.importance.total_cmp(&a.memory.importance))
    });
    scored
}

fn mentions(memory: &Memory, needle: &str) -> bool {
    memory.content.to_lowercase().contains(needle)
        || memory.tags.iter().any(|t| t.to_lowercase().contains(needle))
        || memory.concepts.iter().any(|c| c.contains(needle))
}

/// Highest counts first, ties broken by key.
fn most_common<K: Ord>(counts: HashMap<K, usize>, n: usize) -> Vec<(K, usize)> {
    let mut entries: Vec<(K, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}
