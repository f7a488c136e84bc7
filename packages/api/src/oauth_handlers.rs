// ABOUTME: HTTP request handlers for the CLIO OAuth connection
// ABOUTME: Connect, callback, status, user profile, disconnect and token metadata endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use clio_connect_auth::{AuthError, AuthorizationOptions, ClioIdentity};

use crate::{
    auth::CurrentUser,
    response::{error_response, ApiError},
    ApiState,
};

const NOT_CONNECTED: &str = "No access token found. Please connect to CLIO first.";
const REAUTH_REQUIRED: &str = "Access token expired or invalid. Please reconnect to CLIO.";

#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub auth_url: String,
    pub message: String,
}

/// Query parameters CLIO appends to the redirect URI
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user: ClioIdentity,
    pub last_fetched: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub success: bool,
    pub message: String,
}

/// Start the OAuth flow and hand back the CLIO authorization URL
pub async fn connect(
    State(state): State<ApiState>,
    user: CurrentUser,
    Query(query): Query<ConnectQuery>,
) -> Result<Json<ConnectResponse>, ApiError> {
    info!("Starting CLIO OAuth flow for user: {}", user.id);

    let url = state
        .manager
        .build_authorization_url(&user.id, AuthorizationOptions { scope: query.scope })
        .await?;

    Ok(Json(ConnectResponse {
        auth_url: url.to_string(),
        message: "Redirecting to CLIO for authorization...".to_string(),
    }))
}

/// OAuth redirect target: validate state, exchange the code and send the browser back to the app
pub async fn callback(
    State(state): State<ApiState>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    if let Some(provider_error) = query.error {
        let message = query.error_description.unwrap_or(provider_error);
        warn!("CLIO OAuth error: {}", message);
        return redirect_with_error(&state.app_url, &message);
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return redirect_with_error(&state.app_url, "No authorization code received");
    };

    let Some(oauth_state) = query.state.filter(|s| !s.is_empty()) else {
        warn!("No state parameter received in OAuth callback");
        return redirect_with_error(&state.app_url, "Missing OAuth state");
    };

    match state.manager.complete_authorization(&oauth_state, &code).await {
        Ok(record) => {
            info!("🎉 CLIO connected for user {}", record.user_id);
            Redirect::to(&format!("{}/?connected=true", base_url(&state.app_url)))
        }
        Err(e) => {
            error!("OAuth callback failed: {}", e);
            redirect_with_error(&state.app_url, callback_failure_message(&e))
        }
    }
}

/// Check the CLIO connection for the current user
pub async fn status(State(state): State<ApiState>, user: CurrentUser) -> Response {
    let status = state.manager.check_connection(&user.id).await;
    Json(status).into_response()
}

/// CLIO profile of the connected account
pub async fn user(State(state): State<ApiState>, user: CurrentUser) -> Response {
    match state.manager.fetch_identity(&user.id).await {
        Ok(Some(identity)) => Json(UserResponse {
            user: identity,
            last_fetched: Utc::now(),
        })
        .into_response(),
        Ok(None) => error_response(StatusCode::UNAUTHORIZED, NOT_CONNECTED),
        Err(e) if e.is_auth_rejection() => error_response(StatusCode::UNAUTHORIZED, REAUTH_REQUIRED),
        Err(e) => {
            error!("Failed to fetch CLIO user: {}", e);
            ApiError(e).into_response()
        }
    }
}

/// Revoke the token with CLIO and remove it locally
pub async fn disconnect(State(state): State<ApiState>, user: CurrentUser) -> Response {
    info!("Disconnecting user {} from CLIO", user.id);

    if state.manager.revoke(&user.id).await {
        Json(DisconnectResponse {
            success: true,
            message: "Successfully disconnected from CLIO. You can reconnect at any time."
                .to_string(),
        })
        .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(DisconnectResponse {
                success: false,
                message: "Failed to disconnect from CLIO. Please try again.".to_string(),
            }),
        )
            .into_response()
    }
}

/// Non-secret metadata about the stored token
pub async fn token_info(State(state): State<ApiState>, user: CurrentUser) -> Response {
    match state.manager.token_info(&user.id).await {
        Ok(Some(info)) => Json(info).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No CLIO token stored"),
        Err(e) => ApiError(e).into_response(),
    }
}

fn callback_failure_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidState => "Invalid OAuth state",
        AuthError::Configuration(_) => "CLIO configuration missing",
        AuthError::TokenExchange { .. } => "Token exchange failed",
        AuthError::Validation(_) => "Invalid access token received",
        _ => "OAuth callback failed",
    }
}

fn base_url(app_url: &str) -> &str {
    app_url.trim_end_matches('/')
}

fn redirect_with_error(app_url: &str, message: &str) -> Redirect {
    Redirect::to(&format!(
        "{}/?error={}",
        base_url(app_url),
        urlencoding::encode(message)
    ))
}
