//! Tests for the HTTP app: open health route and the guarded routes

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header::AUTHORIZATION},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::{Database, SqliteDatabase};
use crate::mcp::{Toolbox, create_app};

const KEY: &str = "test-key";

async fn app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let config = Config::new().with_data_dir(dir.path().join("data"));
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Failed to run migrations");
    let toolbox = Toolbox::new(config, db).expect("Failed to build toolbox");
    let app = create_app(toolbox, KEY.to_string(), CancellationToken::new());
    (dir, app)
}

fn from_peer(uri: &str, peer: [u8; 4]) -> axum::http::request::Builder {
    Request::builder()
        .uri(uri)
        .extension(ConnectInfo(SocketAddr::from((peer, 40_000))))
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health_is_open() {
    let (_dir, app) = app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "bb7");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_peer_is_forbidden() {
    let (_dir, app) = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-info")
                .header(AUTHORIZATION, format!("Bearer {}", KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remote_peer_is_forbidden() {
    let (_dir, app) = app().await;

    let response = app
        .oneshot(
            from_peer("/api-info", [10, 0, 0, 7])
                .header(AUTHORIZATION, format!("Bearer {}", KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json(response).await;
    assert_eq!(body["status_code"], 403);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_key_is_unauthorized() {
    let (_dir, app) = app().await;

    let response = app
        .oneshot(from_peer("/api-info", [127, 0, 0, 1]).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_info_with_bearer_key() {
    let (_dir, app) = app().await;

    let response = app
        .oneshot(
            from_peer("/api-info", [127, 0, 0, 1])
                .header(AUTHORIZATION, format!("Bearer {}", KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["server"]["name"], "bb7");
    assert_eq!(body["server"]["tools"], 42);
    assert_eq!(body["security"]["localhost_only"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_info_with_query_key() {
    let (_dir, app) = app().await;

    let response = app
        .oneshot(
            from_peer(&format!("/api-info?api_key={}", KEY), [127, 0, 0, 1])
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mcp_route_is_mounted_behind_guard() {
    let (_dir, app) = app().await;

    let response = app
        .oneshot(
            from_peer("/mcp", [127, 0, 0, 1])
                .method("GET")
                .header(AUTHORIZATION, format!("Bearer {}", KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::NOT_FOUND);
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}
