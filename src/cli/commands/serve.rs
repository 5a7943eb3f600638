//! `bb7 serve`: open storage, build the toolbox and run a transport.

use std::net::SocketAddr;

use rmcp::ServiceExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::error::{CliError, CliResult};
use crate::config::Config;
use crate::db::{Database, SqliteDatabase};
use crate::mcp::security::load_or_create_api_key;
use crate::mcp::{McpServer, Toolbox, create_app};

use crate::cli::Transport;

async fn toolbox(config: Config) -> CliResult<Toolbox<SqliteDatabase>> {
    config
        .ensure_dirs()
        .map_err(|source| CliError::DataDir { source })?;

    let db_path = config.memory_db_path();
    let db = SqliteDatabase::open(&db_path).await?;
    db.migrate().await?;
    info!(path = %db_path.display(), "Memory database ready");

    Ok(Toolbox::new(config, db)?)
}

pub async fn serve(config: Config, transport: Transport) -> CliResult<()> {
    info!(
        data_dir = %config.data_dir.display(),
        transport = ?transport,
        "Starting bb7 v{}",
        env!("CARGO_PKG_VERSION")
    );
    let toolbox = toolbox(config).await?;

    match transport {
        Transport::Stdio => serve_stdio(toolbox).await,
        Transport::Http => serve_http(toolbox).await,
    }
}

async fn serve_stdio(toolbox: Toolbox<SqliteDatabase>) -> CliResult<()> {
    let service = McpServer::new(&toolbox)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| CliError::Transport {
            message: e.to_string(),
        })?;

    let reason = service.waiting().await.map_err(|e| CliError::Transport {
        message: e.to_string(),
    })?;
    info!(reason = ?reason, "MCP stdio session ended");
    Ok(())
}

async fn serve_http(toolbox: Toolbox<SqliteDatabase>) -> CliResult<()> {
    let api_key =
        load_or_create_api_key(&toolbox.config).map_err(|source| CliError::ApiKey { source })?;
    let addr = SocketAddr::new(toolbox.config.http.host, toolbox.config.http.port);

    let ct = CancellationToken::new();
    let app = create_app(toolbox, api_key, ct.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| CliError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("MCP server listening on http://{}/mcp", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
        info!("Shutting down");
        ct.cancel();
    })
    .await
    .map_err(|source| CliError::Http { source })
}
