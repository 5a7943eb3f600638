//! MCP tools for the persistent memory store.

use rmcp::{
    ErrorData as McpError,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::db::{Database, DbError};
use crate::memory::{MemoryStore, NewMemory, SearchRequest, render};

use super::{internal, invalid, markdown, not_found};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoreMemoryParams {
    #[schemars(description = "The content to remember")]
    pub content: String,
    #[schemars(
        description = "Category: insight, decision, pattern, solution, architecture, learning, context, fact, note or temp (default: note)"
    )]
    pub category: Option<String>,
    #[schemars(description = "Importance from 0.0 to 1.0 (calculated when omitted)")]
    pub importance: Option<f64>,
    #[schemars(description = "Tags for organization")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Additional context about this memory")]
    pub context: Option<String>,
    #[schemars(description = "Project the memory belongs to (default: current directory)")]
    pub project_context: Option<String>,
    #[schemars(description = "Explicit key; generated when omitted. Storing under an existing key replaces it.")]
    #[serde(alias = "memory_key")]
    pub key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoryParams {
    #[schemars(description = "Search query")]
    pub query: String,
    #[schemars(description = "Maximum number of results (default: 10)")]
    pub limit: Option<usize>,
    #[schemars(description = "Only search this category")]
    pub category: Option<String>,
    #[schemars(description = "Minimum importance (default: 0.0)")]
    pub min_importance: Option<f64>,
    #[schemars(description = "Show context and project for each hit (default: true)")]
    pub include_context: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecallMemoryParams {
    #[schemars(description = "Memory key")]
    #[serde(alias = "memory_key")]
    pub key: String,
    #[schemars(description = "Include related memories (default: true)")]
    pub include_related: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SynthesizeParams {
    #[schemars(description = "Topic to synthesize knowledge about")]
    pub topic: String,
    #[schemars(description = "Minimum relevant memories required (default: 3)")]
    pub min_memories: Option<usize>,
    #[schemars(description = "Report the spread across projects (default: true)")]
    pub include_cross_project: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListCategoriesParams {
    #[schemars(description = "Include per-category statistics (default: true)")]
    pub include_stats: Option<bool>,
}

fn db_error(e: DbError) -> McpError {
    match e {
        DbError::NotFound { .. } => not_found("memory_not_found", e),
        DbError::Validation { .. } => invalid(e),
        _ => internal("database_error", e),
    }
}

pub struct MemoryTools<D: Database> {
    store: MemoryStore<D>,
    tool_router: ToolRouter<Self>,
}

impl<D: Database> Clone for MemoryTools<D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            tool_router: self.tool_router.clone(),
        }
    }
}

#[tool_router]
impl<D: Database + 'static> MemoryTools<D> {
    pub fn new(store: MemoryStore<D>) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "bb7_memory_store",
        description = "Store a memory with automatic concept extraction, importance scoring and links to related memories."
    )]
    pub async fn memory_store(
        &self,
        params: Parameters<StoreMemoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let stored = self
            .store
            .store(NewMemory {
                content: p.content,
                category: p.category,
                importance: p.importance,
                tags: p.tags.unwrap_or_default(),
                context: p.context,
                project_context: p.project_context,
                key: p.key,
            })
            .await
            .map_err(db_error)?;
        markdown(render::stored(&stored))
    }

    #[tool(
        name = "bb7_memory_search",
        description = "Search memories by concept overlap with the query, optionally filtered by category and minimum importance."
    )]
    pub async fn memory_search(
        &self,
        params: Parameters<SearchMemoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let mut request = SearchRequest::new(p.query);
        if let Some(limit) = p.limit {
            request.limit = limit.max(1);
        }
        request.category = p.category.filter(|c| !c.trim().is_empty());
        request.min_importance = p.min_importance.unwrap_or(0.0);
        request.include_context = p.include_context.unwrap_or(true);

        let outcome = self.store.search(&request).await.map_err(db_error)?;
        markdown(render::search(&request, &outcome))
    }

    #[tool(
        name = "bb7_memory_recall",
        description = "Recall a memory by key with its concepts and related memories."
    )]
    pub async fn memory_recall(
        &self,
        params: Parameters<RecallMemoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let key = params.0.key.trim().to_string();
        let recalled = self
            .store
            .recall(&key, params.0.include_related.unwrap_or(true))
            .await
            .map_err(db_error)?;
        match recalled {
            Some(recalled) => markdown(render::recall(&recalled)),
            None => markdown(render::recall_missing(&key)),
        }
    }

    #[tool(
        name = "bb7_memory_synthesize",
        description = "Synthesize what the store knows about a topic: categories, key concepts, co-occurring ideas and high-impact memories."
    )]
    pub async fn memory_synthesize(
        &self,
        params: Parameters<SynthesizeParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let synthesis = self
            .store
            .synthesize(&p.topic, p.min_memories.unwrap_or(3))
            .await
            .map_err(db_error)?;
        markdown(render::synthesis(
            p.topic.trim(),
            &synthesis,
            p.include_cross_project.unwrap_or(true),
        ))
    }

    #[tool(
        name = "bb7_memory_list_categories",
        description = "List memory categories with counts, average importance and last update."
    )]
    pub async fn memory_list_categories(
        &self,
        params: Parameters<ListCategoriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let (total, categories) = self.store.list_categories().await.map_err(db_error)?;
        markdown(render::categories(
            total,
            &categories,
            params.0.include_stats.unwrap_or(true),
        ))
    }

    #[tool(
        name = "bb7_memory_insights",
        description = "Overview of the memory store: totals, importance distribution, most accessed memories and prolific concepts."
    )]
    pub async fn memory_insights(&self) -> Result<CallToolResult, McpError> {
        let insights = self.store.insights().await.map_err(db_error)?;
        markdown(render::insights(&insights))
    }
}
