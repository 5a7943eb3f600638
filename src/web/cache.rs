//! On-disk response cache keyed by the SHA-256 of the URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::client::FetchedPage;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    page: FetchedPage,
}

pub fn url_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct WebCache {
    dir: PathBuf,
    ttl: Duration,
}

impl WebCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_ttl(dir, DEFAULT_TTL)
    }

    pub fn with_ttl(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", url_hash(url)))
    }

    /// A fresh cached page, if any. Stale or unreadable entries count as a miss.
    pub async fn get(&self, url: &str) -> Option<FetchedPage> {
        let path = self.entry_path(url);
        let bytes = tokio::fs::read(&path).await.ok()?;
        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Ignoring corrupt cache entry");
                return None;
            }
        };
        let age = Utc::now()
            .signed_duration_since(entry.fetched_at)
            .to_std()
            .unwrap_or_default();
        if age > self.ttl {
            return None;
        }
        let mut page = entry.page;
        page.from_cache = true;
        Some(page)
    }

    /// Store a page. Failures are logged, never surfaced.
    pub async fn put(&self, url: &str, page: &FetchedPage) {
        let entry = CacheEntry {
            fetched_at: Utc::now(),
            page: page.clone(),
        };
        let result = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            let json = serde_json::to_vec(&entry).map_err(std::io::Error::other)?;
            tokio::fs::write(self.entry_path(url), json).await
        }
        .await;
        if let Err(e) = result {
            tracing::warn!(url, error = %e, "Failed to write web cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn page(body: &str) -> FetchedPage {
        FetchedPage {
            url: "https://example.com/".to_string(),
            final_url: "https://example.com/".to_string(),
            status: 200,
            content_type: "text/html".to_string(),
            content_encoding: None,
            size: body.len() as u64,
            body: Some(body.to_string()),
            elapsed: Duration::from_millis(12),
            from_cache: false,
        }
    }

    #[test]
    fn hash_is_stable_hex() {
        let hash = url_hash("https://example.com/");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, url_hash("https://example.com/"));
        assert_ne!(hash, url_hash("https://example.com"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn round_trip_marks_cached() {
        let temp = TempDir::new().unwrap();
        let cache = WebCache::new(temp.path());

        assert!(cache.get("https://example.com/").await.is_none());
        cache.put("https://example.com/", &page("<p>hi</p>")).await;

        let hit = cache.get("https://example.com/").await.expect("fresh entry");
        assert!(hit.from_cache);
        assert_eq!(hit.body.as_deref(), Some("<p>hi</p>"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stale_entries_are_misses() {
        let temp = TempDir::new().unwrap();
        let cache = WebCache::with_ttl(temp.path(), Duration::ZERO);
        cache.put("https://example.com/", &page("x")).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.get("https://example.com/").await.is_none());
    }
}
