// ABOUTME: Error types for CLIO OAuth operations
// ABOUTME: Separates configuration, token exchange, validation, storage and network failures

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Token exchange failed with status {status_code}")]
    TokenExchange { status_code: u16, body: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid or expired OAuth state: CSRF protection failed")]
    InvalidState,

    #[error("CLIO API returned status {status_code}")]
    Api { status_code: u16, body: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// True when CLIO rejected the bearer credential itself (401/403)
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Api { status_code: 401 | 403, .. }
        )
    }

    /// True for failures in the persistence layer
    pub fn is_storage(&self) -> bool {
        matches!(self, AuthError::Storage(_) | AuthError::Database(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Network(format!("Request to CLIO timed out: {}", e))
        } else {
            AuthError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_rejection_statuses() {
        let unauthorized = AuthError::Api {
            status_code: 401,
            body: String::new(),
        };
        let forbidden = AuthError::Api {
            status_code: 403,
            body: String::new(),
        };
        let server_error = AuthError::Api {
            status_code: 500,
            body: String::new(),
        };

        assert!(unauthorized.is_auth_rejection());
        assert!(forbidden.is_auth_rejection());
        assert!(!server_error.is_auth_rejection());
        assert!(!AuthError::Network("down".to_string()).is_auth_rejection());
    }

    #[test]
    fn test_token_exchange_display_hides_body() {
        let err = AuthError::TokenExchange {
            status_code: 400,
            body: "invalid_grant secret-detail".to_string(),
        };
        assert_eq!(err.to_string(), "Token exchange failed with status 400");
    }
}
