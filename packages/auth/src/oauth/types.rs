// ABOUTME: Core type definitions for CLIO OAuth authentication
// ABOUTME: Includes stored token records, token endpoint responses, OAuth state and connection status

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// CLIO documents a 7 day lifetime for access tokens
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 604_800;

pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Shortest access token accepted for storage
pub const MIN_ACCESS_TOKEN_LEN: usize = 20;

/// Longest token lifetime accepted from the token endpoint (one year)
pub const MAX_EXPIRES_IN_SECS: i64 = 31_536_000;

/// CLIO token stored in the database, one row per user
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64, // Seconds from created_at
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Build a fresh record from a token endpoint response, issued at `now`
    pub fn from_response(user_id: &str, response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            id: nanoid::nanoid!(),
            user_id: user_id.to_string(),
            access_token: response.access_token,
            refresh_token: response.refresh_token.filter(|rt| !rt.is_empty()),
            token_type: response
                .token_type
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            expires_in: response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            scope: response.scope.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Expiry is anchored on issue time. A lifetime that overflows the
    /// calendar collapses to `created_at`, so the record reads as expired.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.checked_expires_at().unwrap_or(self.created_at)
    }

    fn checked_expires_at(&self) -> Option<DateTime<Utc>> {
        Duration::try_seconds(self.expires_in).and_then(|d| self.created_at.checked_add_signed(d))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.checked_expires_at() {
            Some(expires_at) => now > expires_at,
            None => true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Non-secret view of this record
    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            user_id: self.user_id.clone(),
            token_type: self.token_type.clone(),
            scope: self.scope.clone(),
            expires_in: self.expires_in,
            created_at: self.created_at,
            expires_at: self.expires_at(),
            has_refresh_token: self.has_refresh_token(),
            expired: self.is_expired(),
        }
    }
}

// Token strings stay out of logs
impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(redact))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

fn redact(secret: &str) -> String {
    format!("<redacted {} chars>", secret.chars().count())
}

/// Reject empty and placeholder access tokens before they reach storage
pub fn validate_access_token(access_token: &str) -> AuthResult<()> {
    let len = access_token.trim().chars().count();
    if len < MIN_ACCESS_TOKEN_LEN {
        return Err(AuthError::Validation(format!(
            "Access token must be at least {} characters (got {})",
            MIN_ACCESS_TOKEN_LEN, len
        )));
    }
    Ok(())
}

/// Reject lifetimes outside `1..=MAX_EXPIRES_IN_SECS`; a missing value falls back to the default
pub fn validate_expires_in(expires_in: Option<i64>) -> AuthResult<()> {
    match expires_in {
        Some(secs) if secs <= 0 || secs > MAX_EXPIRES_IN_SECS => Err(AuthError::Validation(
            format!(
                "expires_in must be between 1 and {} seconds (got {})",
                MAX_EXPIRES_IN_SECS, secs
            ),
        )),
        _ => Ok(()),
    }
}

/// OAuth token response from the CLIO token endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>, // Seconds
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(redact))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Options for building an authorization URL
#[derive(Debug, Clone, Default)]
pub struct AuthorizationOptions {
    /// Space-delimited CLIO scopes; the configured default when unset
    pub scope: Option<String>,
}

/// OAuth state for CSRF protection, bound server-side to the user who started the flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthState {
    pub state: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OAuthState {
    pub fn new(state: String, user_id: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            state,
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// CLIO user profile returned by `who_am_i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClioIdentity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Envelope CLIO wraps API v4 payloads in
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Result of probing the CLIO connection for a user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub needs_reauth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn connected(identity: &ClioIdentity) -> Self {
        Self {
            connected: true,
            account_name: Some(
                identity
                    .name
                    .clone()
                    .unwrap_or_else(|| "Unknown User".to_string()),
            ),
            account_email: Some(
                identity
                    .email
                    .clone()
                    .unwrap_or_else(|| "Unknown Email".to_string()),
            ),
            needs_reauth: false,
            error: None,
        }
    }

    /// The user has to go through the browser redirect again
    pub fn needs_reauth(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            account_name: None,
            account_email: None,
            needs_reauth: true,
            error: Some(error.into()),
        }
    }

    /// Transient failure; stored state was left alone
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            account_name: None,
            account_email: None,
            needs_reauth: false,
            error: Some(error.into()),
        }
    }
}

/// Token metadata safe to show to users
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub user_id: String,
    pub token_type: String,
    pub scope: String,
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub has_refresh_token: bool,
    pub expired: bool,
}
