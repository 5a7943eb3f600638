//! HTTP client with a size cap, optional redirects and the response cache.

use std::time::{Duration, Instant};

use futures_util::StreamExt;
use reqwest::{Client, Response, Url, redirect};
use serde::{Deserialize, Serialize};

use super::cache::WebCache;
use super::error::{WebError, WebResult};

pub const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; bb7-webtool/1.0; Development Assistant)";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_CONTENT_BYTES: u64 = 10 * 1024 * 1024;
const MAX_REDIRECTS: usize = 10;

/// Add `https://` when no scheme is given and require a host.
pub fn normalize_url(url: &str) -> WebResult<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(WebError::InvalidUrl {
            url: url.to_string(),
        });
    }
    let lower = trimmed.to_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    match Url::parse(&candidate) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(parsed),
        _ => Err(WebError::InvalidUrl {
            url: url.to_string(),
        }),
    }
}

/// Whether the body of this content type is worth decoding as text.
pub fn is_textual(content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    ct.is_empty()
        || ct.starts_with("text/")
        || ct.contains("json")
        || ct.contains("xml")
        || ct.contains("javascript")
}

/// A fetched response, as stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    /// Media type without parameters, e.g. `text/html`.
    pub content_type: String,
    pub content_encoding: Option<String>,
    pub size: u64,
    /// Decoded body for textual content types.
    pub body: Option<String>,
    pub elapsed: Duration,
    #[serde(skip)]
    pub from_cache: bool,
}

impl FetchedPage {
    pub fn is_html(&self) -> bool {
        self.content_type == "text/html" || self.content_type == "application/xhtml+xml"
    }

    pub fn redirected(&self) -> bool {
        self.final_url.trim_end_matches('/') != self.url.trim_end_matches('/')
    }
}

/// Cache entries for unfollowed fetches hold the redirect response itself,
/// so they live under their own key.
fn cache_key(url: &Url, follow_redirects: bool) -> String {
    if follow_redirects {
        url.to_string()
    } else {
        format!("{} no-redirect", url)
    }
}

fn media_type(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct WebClient {
    follow: Client,
    direct: Client,
    cache: WebCache,
    max_bytes: u64,
}

impl WebClient {
    pub fn new(cache: WebCache) -> WebResult<Self> {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let build = |policy: redirect::Policy| {
            Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .redirect(policy)
                .build()
                .map_err(|source| WebError::Client { source })
        };

        Ok(Self {
            follow: build(redirect::Policy::limited(MAX_REDIRECTS))?,
            direct: build(redirect::Policy::none())?,
            cache,
            max_bytes: MAX_CONTENT_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn cache(&self) -> &WebCache {
        &self.cache
    }

    /// Send a GET and fail on non-success statuses.
    pub async fn send(&self, url: &Url, follow_redirects: bool) -> WebResult<Response> {
        let client = if follow_redirects {
            &self.follow
        } else {
            &self.direct
        };
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| WebError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !(status.is_success() || (!follow_redirects && status.is_redirection())) {
            tracing::debug!(url = %url, status = status.as_u16(), "Unsuccessful response");
            return Err(WebError::from_status(status.as_u16()));
        }
        Ok(response)
    }

    /// Fetch a URL, reading at most the configured byte limit.
    pub async fn fetch(
        &self,
        url: &Url,
        follow_redirects: bool,
        use_cache: bool,
    ) -> WebResult<FetchedPage> {
        let key = cache_key(url, follow_redirects);
        if use_cache {
            if let Some(page) = self.cache.get(&key).await {
                tracing::debug!(url = %url, "Web cache hit");
                return Ok(page);
            }
        }

        let started = Instant::now();
        let response = self.send(url, follow_redirects).await?;

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(WebError::TooLarge {
                    size: length,
                    max: self.max_bytes,
                });
            }
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = media_type(&response);
        let content_encoding = response
            .headers()
            .get(reqwest::header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| WebError::Network {
                url: url.to_string(),
                source,
            })?;
            let size = (bytes.len() + chunk.len()) as u64;
            if size > self.max_bytes {
                return Err(WebError::TooLarge {
                    size,
                    max: self.max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let page = FetchedPage {
            url: url.to_string(),
            final_url,
            status,
            size: bytes.len() as u64,
            body: is_textual(&content_type).then(|| String::from_utf8_lossy(&bytes).into_owned()),
            content_type,
            content_encoding,
            elapsed: started.elapsed(),
            from_cache: false,
        };

        tracing::info!(url = %url, status, size = page.size, "Fetched URL");
        if use_cache {
            self.cache.put(&key, &page).await;
        }
        Ok(page)
    }
}
