// ABOUTME: Shared API response types and error handling
// ABOUTME: Maps authentication errors onto HTTP status codes with a consistent JSON body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;
use tracing::error;

use clio_connect_auth::AuthError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Error returned from handlers
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) | AuthError::InvalidState => StatusCode::BAD_REQUEST,
        AuthError::TokenExchange { .. } | AuthError::Network(_) | AuthError::Api { .. } => {
            StatusCode::BAD_GATEWAY
        }
        AuthError::Configuration(_)
        | AuthError::Storage(_)
        | AuthError::Database(_)
        | AuthError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if self.0.is_storage() {
            error!("Storage error: {}", self.0);
            "Database error".to_string()
        } else {
            self.0.to_string()
        };

        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Plain `{ success: false, error }` response with the given status
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, ResponseJson(ApiResponse::<()>::error(message.into()))).into_response()
}
