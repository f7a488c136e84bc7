use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tower::ServiceExt;

use clio_connect_auth::{ClioClient, ClioConfig, SqliteStore, Stores, TokenManager};

use crate::{build_app, config::Config, health_check};

fn test_config(database_url: String) -> Config {
    Config {
        port: 4010,
        cors_origin: "http://localhost:3000".to_string(),
        app_url: "http://localhost:3000".to_string(),
        database_url,
        default_user_id: "default-user".to_string(),
    }
}

async fn test_manager(database_url: &str) -> Arc<TokenManager> {
    let store = SqliteStore::connect(database_url).await.unwrap();
    store.ensure_schema().await.unwrap();
    let client = ClioClient::new(ClioConfig::default()).unwrap();
    Arc::new(TokenManager::new(Stores::from_backend(store), client))
}

#[tokio::test]
async fn test_health_check_returns_ok() {
    let value = health_check().await.0;

    assert_eq!(
        value.get("status").and_then(|v| v.as_str()),
        Some("healthy")
    );
    assert_eq!(
        value.get("service").and_then(|v| v.as_str()),
        Some("clio-connect")
    );
    assert!(value.get("version").is_some());
}

#[tokio::test]
async fn test_app_serves_health_with_cors() {
    let temp_dir = TempDir::new().unwrap();
    let database_url = format!("sqlite://{}?mode=rwc", temp_dir.path().join("app.db").display());
    let config = test_config(database_url.clone());
    let app = build_app(&config, test_manager(&database_url).await).unwrap();

    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "healthy");
}

#[tokio::test]
async fn test_app_mounts_clio_routes() {
    let temp_dir = TempDir::new().unwrap();
    let database_url = format!("sqlite://{}?mode=rwc", temp_dir.path().join("app.db").display());
    let config = test_config(database_url.clone());
    let app = build_app(&config, test_manager(&database_url).await).unwrap();

    let request = Request::builder()
        .uri("/api/clio/token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    // Nothing stored yet
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
