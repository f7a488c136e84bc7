// ABOUTME: Clio Connect server bootstrap shared by the binary's subcommands
// ABOUTME: Wires configuration, token stores, the token manager and the HTTP router together

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clio_connect_api::{create_clio_router, ApiState};
use clio_connect_auth::{ClioClient, ClioConfig, MemoryTokenCache, Stores, TokenManager};

pub mod config;

#[cfg(test)]
mod tests;

use config::{Config, ConfigError};

const STATE_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Install the global tracing subscriber (RUST_LOG, default `info`)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Open the configured store and build a token manager with an in-process cache
pub async fn build_manager(config: &Config) -> anyhow::Result<TokenManager> {
    let stores = Stores::connect(&config.database_url)
        .await
        .context("Failed to open token store")?;
    let client =
        ClioClient::new(ClioConfig::from_env()).context("Failed to build CLIO HTTP client")?;

    Ok(TokenManager::new(stores, client).with_cache(Arc::new(MemoryTokenCache::new())))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "clio-connect"
    }))
}

/// Full application router with CORS and request tracing
pub fn build_app(config: &Config, manager: Arc<TokenManager>) -> Result<Router, ConfigError> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|_| ConfigError::InvalidCorsOrigin(config.cors_origin.clone()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let state = ApiState::new(manager, &config.app_url, &config.default_user_id);

    Ok(Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/clio", create_clio_router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Periodically drop OAuth states from flows that were never completed
fn spawn_state_sweeper(manager: Arc<TokenManager>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = manager.purge_expired_states().await {
                warn!("Failed to purge expired OAuth states: {}", e);
            }
        }
    });
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let manager = Arc::new(build_manager(&config).await?);
    let app = build_app(&config, manager.clone())?;
    spawn_state_sweeper(manager);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("🔗 CORS origin: {}", config.cors_origin);
    info!("✅ Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
