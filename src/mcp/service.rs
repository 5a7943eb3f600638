//! MCP Streamable HTTP service and the axum app around it.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::get,
};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::db::Database;

use super::security::{self, Guard};
use super::server::{McpServer, Toolbox};

/// Create the MCP Streamable HTTP service.
///
/// Every transport session gets its own [`McpServer`] over the shared
/// toolbox.
///
/// # Example
/// ```no_run
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use bb7::config::Config;
/// # use bb7::db::{Database, SqliteDatabase};
/// # use bb7::mcp::{Toolbox, create_mcp_service};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let db = SqliteDatabase::in_memory().await?;
/// # db.migrate().await?;
/// let toolbox = Toolbox::new(Config::new(), db)?;
/// let app: Router = Router::new().nest_service("/mcp", create_mcp_service(toolbox, CancellationToken::new()));
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service<D: Database + 'static>(
    toolbox: Toolbox<D>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer<D>, LocalSessionManager> {
    // rmcp expects the factory to fail with io::Error
    let service_factory = move || -> Result<McpServer<D>, std::io::Error> {
        Ok(McpServer::new(&toolbox))
    };

    let mut config = StreamableHttpServerConfig::default();
    config.sse_keep_alive = None;
    config.sse_retry = None;
    config.stateful_mode = true;
    config.cancellation_token = cancellation_token;

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}

#[derive(Clone)]
struct InfoState {
    rate_limit: usize,
    rate_window_secs: u64,
    max_request_bytes: usize,
    tools: usize,
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bb7",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn api_info(State(info): State<InfoState>) -> Json<Value> {
    Json(json!({
        "api_version": "1.0",
        "server": {
            "name": "bb7",
            "version": env!("CARGO_PKG_VERSION"),
            "tools": info.tools,
        },
        "authentication": {
            "type": "API Key",
            "header": "Authorization: Bearer YOUR_API_KEY",
            "query_param": "?api_key=YOUR_API_KEY",
        },
        "endpoints": {
            "GET /health": "Server health check",
            "GET /api-info": "This API documentation",
            "POST /mcp": "MCP Streamable HTTP endpoint",
        },
        "rate_limits": {
            "requests_per_window": info.rate_limit,
            "window_seconds": info.rate_window_secs,
        },
        "security": {
            "localhost_only": true,
            "api_key_required": true,
            "request_size_limit": format!("{} bytes", info.max_request_bytes),
        },
    }))
}

/// Build the HTTP app: `/health` is open, `/api-info` and `/mcp` sit
/// behind the guard.
pub fn create_app<D: Database + 'static>(
    toolbox: Toolbox<D>,
    api_key: String,
    cancellation_token: CancellationToken,
) -> Router {
    let http = &toolbox.config.http;
    let guard = Guard::from_config(&toolbox.config, api_key);
    let info = InfoState {
        rate_limit: http.rate_limit,
        rate_window_secs: http.rate_window_secs,
        max_request_bytes: http.max_request_bytes,
        tools: McpServer::new(&toolbox).tools().len(),
    };
    let body_limit = http.max_request_bytes;

    let protected = Router::new()
        .route("/api-info", get(api_info))
        .with_state(info)
        .nest_service("/mcp", create_mcp_service(toolbox, cancellation_token))
        .layer(middleware::from_fn_with_state(guard, security::guard));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
}
