// ABOUTME: HTTP API layer for the CLIO connection providing REST endpoints and routing
// ABOUTME: Handlers delegate to the token lifecycle manager held in shared state

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use clio_connect_auth::TokenManager;

pub mod auth;
pub mod oauth_handlers;
pub mod response;

/// State shared by the CLIO routes
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<TokenManager>,
    /// Frontend base URL the OAuth callback redirects back to
    pub app_url: String,
    pub default_user_id: String,
}

impl ApiState {
    pub fn new(
        manager: Arc<TokenManager>,
        app_url: impl Into<String>,
        default_user_id: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            app_url: app_url.into(),
            default_user_id: default_user_id.into(),
        }
    }
}

/// Creates the CLIO API router (nested under /api/clio)
pub fn create_clio_router() -> Router<ApiState> {
    Router::new()
        .route("/connect", post(oauth_handlers::connect))
        .route("/callback", get(oauth_handlers::callback))
        .route("/status", get(oauth_handlers::status))
        .route("/user", get(oauth_handlers::user))
        .route("/disconnect", post(oauth_handlers::disconnect))
        .route("/token", get(oauth_handlers::token_info))
}
