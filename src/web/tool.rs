//! The web tool: fetch, search, analyze and download.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::cache::{WebCache, url_hash};
use super::client::{FetchedPage, WebClient, normalize_url};
use super::download::{DEFAULT_MAX_DOWNLOAD_BYTES, DownloadRequest, DownloadResult};
use super::error::{WebError, WebResult};
use super::html::{self, PageMetadata};
use super::page::{self, PageAnalysis};
use super::search::{self, SearchEngine, SearchHit};

pub const MAX_SEARCH_RESULTS: usize = 50;

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub extract_text: bool,
    pub follow_redirects: bool,
    pub include_metadata: bool,
    pub save_content: bool,
    pub use_cache: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extract_text: true,
            follow_redirects: true,
            include_metadata: true,
            save_content: false,
            use_cache: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub page: FetchedPage,
    pub metadata: Option<PageMetadata>,
    /// Readable text, pretty JSON or raw text depending on content type.
    pub text: Option<String>,
    pub insights: Vec<String>,
    pub text_insights: Vec<String>,
    pub suggestions: Vec<String>,
    pub saved: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub query: String,
    pub engine: SearchEngine,
    pub hits: Vec<SearchHit>,
    pub elapsed: Duration,
    pub insights: Vec<String>,
    pub related: Vec<String>,
}

/// Text worth showing for a content type.
pub fn extract_text(page: &FetchedPage) -> Option<String> {
    let body = page.body.as_deref()?;
    let text = match page.content_type.as_str() {
        "text/html" | "application/xhtml+xml" => html::readable_text(body),
        "application/json" => serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
            .unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Observations about the raw response.
pub fn content_insights(page: &FetchedPage) -> Vec<String> {
    let mut out = Vec::new();
    let body = page.body.as_deref().unwrap_or_default();
    match page.content_type.as_str() {
        "application/json" => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => {
                out.push(format!("JSON object with {} top-level keys", map.len()))
            }
            Ok(serde_json::Value::Array(items)) => {
                out.push(format!("JSON array with {} items", items.len()))
            }
            Ok(_) => out.push("JSON scalar value".to_string()),
            Err(_) => out.push("Invalid JSON format detected".to_string()),
        },
        "text/html" => {
            let lower = body.to_lowercase();
            if lower.contains("<!doctype html") || lower.contains("<html") {
                out.push("Valid HTML document structure".to_string());
            }
            for (marker, label) in [
                ("react", "React framework detected"),
                ("vue", "Vue.js framework detected"),
                ("angular", "Angular framework detected"),
                ("wordpress", "WordPress CMS detected"),
            ] {
                if lower.contains(marker) {
                    out.push(label.to_string());
                }
            }
        }
        ct if ct.starts_with("text/") => out.push(format!(
            "Text content: {} words, {} lines",
            body.split_whitespace().count(),
            body.lines().count()
        )),
        _ => {}
    }
    if page.size > 1024 * 1024 {
        out.push("Large content size: may affect loading performance".to_string());
    } else if page.size < 1024 {
        out.push("Very small content: likely a lightweight resource".to_string());
    }
    out
}

/// Observations about extracted text.
pub fn text_insights(text: &str, content_type: &str) -> Vec<String> {
    let mut out = Vec::new();
    let words = text.split_whitespace().count();
    if words > 1000 {
        out.push(format!("Substantial content: {} words", words));
    } else if words < 50 {
        out.push(format!("Brief content: {} words", words));
    }
    if content_type == "text/html" {
        let lower = text.to_lowercase();
        if lower.contains("tutorial") || lower.contains("guide") {
            out.push("Educational content detected".to_string());
        }
        if lower.contains("api") && lower.contains("documentation") {
            out.push("API documentation detected".to_string());
        }
        if lower.contains("example") || lower.contains("sample") {
            out.push("Contains code examples or samples".to_string());
        }
    }
    if !text.is_ascii() {
        out.push("Contains non-ASCII characters".to_string());
    }
    out
}

fn suggestions(page: &FetchedPage) -> Vec<String> {
    let mut out = Vec::new();
    let ct = page.content_type.as_str();
    if ct == "application/json" {
        out.push("Save the JSON with save_content=true for offline processing".to_string());
    } else if page.is_html() {
        out.push("Use bb7_analyze_webpage for a full page analysis".to_string());
        if page.url.contains("docs") || page.url.contains("documentation") {
            out.push("This looks like documentation: store key findings with bb7_memory_store".to_string());
        }
    } else if ct.starts_with("text/") {
        out.push("Consider saving the content locally for offline reference".to_string());
    }
    if page.size > 100_000 {
        out.push("Large content: consider extracting specific sections".to_string());
    }
    out
}

#[derive(Debug, Clone)]
pub struct WebTool {
    client: WebClient,
    downloads_dir: PathBuf,
    saved_dir: PathBuf,
}

impl WebTool {
    pub fn new(cache_dir: impl Into<PathBuf>, downloads_dir: impl Into<PathBuf>) -> WebResult<Self> {
        let cache_dir = cache_dir.into();
        Ok(Self {
            client: WebClient::new(WebCache::new(&cache_dir))?,
            downloads_dir: downloads_dir.into(),
            saved_dir: cache_dir.join("saved"),
        })
    }

    pub fn with_client(client: WebClient, downloads_dir: impl Into<PathBuf>) -> Self {
        let saved_dir = client.cache().dir().join("saved");
        Self {
            client,
            downloads_dir: downloads_dir.into(),
            saved_dir,
        }
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    pub async fn fetch_url(&self, request: &FetchRequest) -> WebResult<FetchReport> {
        let url = normalize_url(&request.url)?;
        let page = self
            .client
            .fetch(&url, request.follow_redirects, request.use_cache)
            .await?;

        let metadata = (request.include_metadata && page.is_html())
            .then(|| html::metadata(page.body.as_deref().unwrap_or_default()))
            .filter(|m| !m.is_empty());
        let text = request.extract_text.then(|| extract_text(&page)).flatten();
        let text_insights = text
            .as_deref()
            .map(|t| text_insights(t, &page.content_type))
            .unwrap_or_default();
        let saved = if request.save_content && page.body.is_some() {
            Some(self.save_content(&page).await?)
        } else {
            None
        };

        Ok(FetchReport {
            insights: content_insights(&page),
            suggestions: suggestions(&page),
            text_insights,
            metadata,
            text,
            saved,
            page,
        })
    }

    /// Persist a fetched page as pretty JSON under the cache directory.
    pub async fn save_content(&self, page: &FetchedPage) -> WebResult<PathBuf> {
        tokio::fs::create_dir_all(&self.saved_dir)
            .await
            .map_err(|source| WebError::Io {
                path: self.saved_dir.clone(),
                source,
            })?;
        let path = self.saved_dir.join(format!("{}.json", url_hash(&page.url)));
        let json = serde_json::json!({
            "url": page.url,
            "saved_at": chrono::Utc::now().to_rfc3339(),
            "page": page,
        });
        let bytes = serde_json::to_vec_pretty(&json).map_err(|e| WebError::InvalidInput {
            message: format!("cannot serialize page: {}", e),
        })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| WebError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    pub async fn search_web(
        &self,
        query: &str,
        engine: &str,
        max_results: usize,
    ) -> WebResult<SearchReport> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WebError::InvalidInput {
                message: "search query cannot be empty".to_string(),
            });
        }
        let engine: SearchEngine = engine.parse()?;
        let started = Instant::now();

        let url = engine.search_url(query)?;
        let page = self.client.fetch(&url, true, true).await?;
        let mut hits = search::parse_results(page.body.as_deref().unwrap_or_default(), engine);
        hits.truncate(max_results.clamp(1, MAX_SEARCH_RESULTS));
        search::score(&mut hits, query);

        tracing::info!(query, engine = %engine, results = hits.len(), "Web search");
        Ok(SearchReport {
            query: query.to_string(),
            engine,
            insights: search::insights(&hits),
            related: search::related_queries(query, &hits),
            elapsed: started.elapsed(),
            hits,
        })
    }

    pub async fn analyze_webpage(&self, url: &str, analyze_seo: bool) -> WebResult<PageAnalysis> {
        let url = normalize_url(url)?;
        let page = self.client.fetch(&url, true, true).await?;
        page::analyze(&page, analyze_seo)
    }

    pub async fn download_file(
        &self,
        url: &str,
        filename: Option<String>,
        destination: Option<&str>,
        max_size: Option<u64>,
        overwrite: bool,
    ) -> WebResult<DownloadResult> {
        let url = normalize_url(url)?;
        let destination = match destination.map(str::trim).filter(|d| !d.is_empty()) {
            Some(dir) => crate::files::resolve_path(dir).map_err(|e| WebError::InvalidInput {
                message: e.to_string(),
            })?,
            None => self.downloads_dir.clone(),
        };
        let request = DownloadRequest {
            url,
            filename,
            destination,
            max_size: max_size.unwrap_or(DEFAULT_MAX_DOWNLOAD_BYTES),
            overwrite,
        };
        self.client.download(&request).await
    }
}
