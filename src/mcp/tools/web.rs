//! MCP tools for web access.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::web::{FetchRequest, WebError, WebTool, render};

use super::{internal, invalid, markdown};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FetchUrlParams {
    #[schemars(description = "URL to fetch (https:// is assumed when no scheme is given)")]
    pub url: String,
    #[schemars(description = "Extract readable text (default: true)")]
    pub extract_text: Option<bool>,
    #[schemars(description = "Follow redirects (default: true)")]
    pub follow_redirects: Option<bool>,
    #[schemars(description = "Include HTML metadata (default: true)")]
    pub include_metadata: Option<bool>,
    #[schemars(description = "Save the fetched page under the web cache (default: false)")]
    pub save_content: Option<bool>,
    #[schemars(description = "Serve from the one-hour cache when possible (default: true)")]
    pub use_cache: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchWebParams {
    #[schemars(description = "Search query")]
    pub query: String,
    #[schemars(description = "Engine: duckduckgo, github, stackoverflow or docs (default: duckduckgo)")]
    pub search_engine: Option<String>,
    #[schemars(description = "Maximum results, 1 to 50 (default: 10)")]
    pub max_results: Option<usize>,
    #[schemars(description = "Include result snippets (default: true)")]
    pub include_snippets: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeWebpageParams {
    #[schemars(description = "URL of the page to analyze")]
    pub url: String,
    #[schemars(description = "Include link analysis (default: true)")]
    pub include_links: Option<bool>,
    #[schemars(description = "Include image analysis (default: true)")]
    pub include_images: Option<bool>,
    #[schemars(description = "Include script and stylesheet analysis (default: false)")]
    pub include_scripts: Option<bool>,
    #[schemars(description = "Score the page for SEO (default: true)")]
    pub analyze_seo: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DownloadFileParams {
    #[schemars(description = "URL of the file")]
    pub url: String,
    #[schemars(description = "File name (derived from the URL when omitted)")]
    pub filename: Option<String>,
    #[schemars(description = "Destination directory (default: the downloads directory)")]
    pub destination: Option<String>,
    #[schemars(description = "Maximum size in bytes (default: 100 MiB)")]
    pub max_size: Option<u64>,
    #[schemars(description = "Replace an existing file (default: false)")]
    pub overwrite: Option<bool>,
}

/// HTTP failures come back as tool errors carrying the explanation, so the
/// caller can read the suggestion. Everything else is a protocol error.
fn web_result(e: WebError) -> Result<CallToolResult, McpError> {
    match e {
        WebError::Status {
            status,
            ref message,
            ref suggestion,
        } => Ok(CallToolResult::error(vec![Content::text(format!(
            "## HTTP Error {}\n\n{}\n\n**Suggestion:** {}",
            status, message, suggestion
        ))])),
        WebError::InvalidUrl { .. }
        | WebError::InvalidInput { .. }
        | WebError::UnsupportedEngine { .. }
        | WebError::NotHtml { .. }
        | WebError::AlreadyExists { .. }
        | WebError::TooLarge { .. } => Err(invalid(e)),
        WebError::Network { .. } => Err(internal("network_error", e)),
        _ => Err(internal("web_error", e)),
    }
}

#[derive(Clone)]
pub struct WebTools {
    web: Arc<WebTool>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WebTools {
    pub fn new(web: Arc<WebTool>) -> Self {
        Self {
            web,
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "bb7_fetch_url",
        description = "Fetch a URL with caching. Returns status, metadata, readable text and content insights."
    )]
    pub async fn fetch_url(
        &self,
        params: Parameters<FetchUrlParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let mut request = FetchRequest::new(p.url);
        request.extract_text = p.extract_text.unwrap_or(true);
        request.follow_redirects = p.follow_redirects.unwrap_or(true);
        request.include_metadata = p.include_metadata.unwrap_or(true);
        request.save_content = p.save_content.unwrap_or(false);
        request.use_cache = p.use_cache.unwrap_or(true);

        match self.web.fetch_url(&request).await {
            Ok(report) => markdown(render::fetch(&report)),
            Err(e) => web_result(e),
        }
    }

    #[tool(
        name = "bb7_search_web",
        description = "Search the web or developer sites and rank results by relevance to the query."
    )]
    pub async fn search_web(
        &self,
        params: Parameters<SearchWebParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let engine = p.search_engine.as_deref().unwrap_or("duckduckgo");
        match self
            .web
            .search_web(&p.query, engine, p.max_results.unwrap_or(10))
            .await
        {
            Ok(report) => markdown(render::search(&report, p.include_snippets.unwrap_or(true))),
            Err(e) => web_result(e),
        }
    }

    #[tool(
        name = "bb7_analyze_webpage",
        description = "Analyze a webpage: structure, links, images, resources, SEO score and accessibility hints."
    )]
    pub async fn analyze_webpage(
        &self,
        params: Parameters<AnalyzeWebpageParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        match self
            .web
            .analyze_webpage(&p.url, p.analyze_seo.unwrap_or(true))
            .await
        {
            Ok(analysis) => markdown(render::analysis(
                &analysis,
                p.include_links.unwrap_or(true),
                p.include_images.unwrap_or(true),
                p.include_scripts.unwrap_or(false),
            )),
            Err(e) => web_result(e),
        }
    }

    #[tool(
        name = "bb7_download_file",
        description = "Download a file with a size cap, reporting type, speed and security notes."
    )]
    pub async fn download_file(
        &self,
        params: Parameters<DownloadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        match self
            .web
            .download_file(
                &p.url,
                p.filename.filter(|f| !f.trim().is_empty()),
                p.destination.as_deref(),
                p.max_size,
                p.overwrite.unwrap_or(false),
            )
            .await
        {
            Ok(result) => markdown(render::download(&result)),
            Err(e) => web_result(e),
        }
    }
}
