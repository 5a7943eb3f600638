//! HTTP transport guard: loopback peers only, a per-IP sliding-window rate
//! limit and a bearer API key.

use std::fs;
use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use dashmap::DashMap;
use rand::RngCore;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::config::Config;

pub const API_KEY_FILE: &str = "api_key";

/// 32 random bytes, URL-safe base64 without padding.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// The configured key, else the persisted one, else a fresh key written to
/// `security/api_key` readable only by the owner.
pub fn load_or_create_api_key(config: &Config) -> std::io::Result<String> {
    if let Some(key) = config.http.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    let path = config.security_dir().join(API_KEY_FILE);
    if let Ok(existing) = fs::read_to_string(&path) {
        let existing = existing.trim();
        if !existing.is_empty() {
            return Ok(existing.to_string());
        }
    }

    let key = generate_api_key();
    write_private(&path, &key)?;
    tracing::info!(path = %path.display(), "Generated API key");
    Ok(key)
}

fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}

/// Sliding-window request counter per client address.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    clients: DashMap<IpAddr, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: DashMap::new(),
        }
    }

    /// Record a request from `client`; false once the window is full.
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        let mut requests = self.clients.entry(client).or_default();
        requests.retain(|t| now.duration_since(*t) < self.window);
        if requests.len() >= self.limit {
            return false;
        }
        requests.push(now);
        true
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn key_fingerprint(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..12].to_string()
}

/// Shared state for [`guard`].
#[derive(Debug, Clone)]
pub struct Guard {
    api_key: Arc<str>,
    limiter: Arc<RateLimiter>,
}

impl Guard {
    pub fn new(api_key: impl Into<Arc<str>>, limiter: RateLimiter) -> Self {
        Self {
            api_key: api_key.into(),
            limiter: Arc::new(limiter),
        }
    }

    pub fn from_config(config: &Config, api_key: impl Into<Arc<str>>) -> Self {
        Self::new(
            api_key,
            RateLimiter::new(
                config.http.rate_limit,
                Duration::from_secs(config.http.rate_window_secs),
            ),
        )
    }

    /// Bearer header first, then an `api_key` query parameter.
    fn provided_key<'a>(headers: &'a HeaderMap, query: Option<&'a str>) -> Option<&'a str> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        bearer.or_else(|| {
            query?
                .split('&')
                .find_map(|pair| pair.strip_prefix("api_key="))
        })
    }

    fn authorized(&self, headers: &HeaderMap, query: Option<&str>) -> bool {
        Self::provided_key(headers, query)
            .is_some_and(|k| constant_time_eq(k.as_bytes(), self.api_key.as_bytes()))
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": message,
            "status_code": status.as_u16(),
        })),
    )
        .into_response()
}

/// Axum middleware enforcing the guard. Requests without a known peer
/// address are treated as remote.
pub async fn guard(State(guard): State<Guard>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let Some(ip) = peer.filter(IpAddr::is_loopback) else {
        tracing::warn!(peer = ?peer, path = %request.uri().path(), "Rejected non-loopback client");
        return reject(
            StatusCode::FORBIDDEN,
            "Forbidden: Only localhost connections allowed",
        );
    };

    if !guard.limiter.check(ip) {
        tracing::warn!(client = %ip, path = %request.uri().path(), "Rate limit exceeded");
        return reject(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded");
    }

    if !guard.authorized(request.headers(), request.uri().query()) {
        let fingerprint = Guard::provided_key(request.headers(), request.uri().query())
            .map(key_fingerprint)
            .unwrap_or_else(|| "none".to_string());
        tracing::warn!(client = %ip, key = %fingerprint, "Rejected API key");
        return reject(StatusCode::UNAUTHORIZED, "Invalid or missing API key");
    }

    next.run(request).await
}
