// ABOUTME: CLIO OAuth client configuration and endpoint URLs
// ABOUTME: Loads client credentials from the environment and derives authorize/token/revoke/identity URLs

use std::time::Duration;

use clio_connect_config::{constants, env_non_empty, env_parse_or};

use crate::error::{AuthError, AuthResult};

/// Credentials and endpoints for the CLIO OAuth application
#[derive(Clone)]
pub struct ClioConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub base_url: String,
    pub default_scope: String,
    pub request_timeout: Duration,
    pub state_ttl: chrono::Duration,
}

impl Default for ClioConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            base_url: constants::DEFAULT_CLIO_BASE_URL.to_string(),
            default_scope: constants::DEFAULT_CLIO_SCOPE.to_string(),
            request_timeout: Duration::from_secs(constants::DEFAULT_HTTP_TIMEOUT_SECS),
            state_ttl: chrono::Duration::seconds(constants::DEFAULT_OAUTH_STATE_TTL_SECS),
        }
    }
}

impl ClioConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing credentials are not an error here; operations that need them
    /// fail with [`AuthError::Configuration`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            client_id: env_non_empty(constants::CLIO_CLIENT_ID),
            client_secret: env_non_empty(constants::CLIO_CLIENT_SECRET),
            redirect_uri: env_non_empty(constants::CLIO_REDIRECT_URI),
            base_url: env_non_empty(constants::CLIO_BASE_URL).unwrap_or(defaults.base_url),
            default_scope: env_non_empty(constants::CLIO_DEFAULT_SCOPE)
                .unwrap_or(defaults.default_scope),
            request_timeout: Duration::from_secs(env_parse_or(
                constants::CLIO_HTTP_TIMEOUT_SECS,
                constants::DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            state_ttl: chrono::Duration::try_seconds(env_parse_or(
                constants::CLIO_OAUTH_STATE_TTL_SECS,
                constants::DEFAULT_OAUTH_STATE_TTL_SECS,
            ))
            .unwrap_or(defaults.state_ttl),
        }
    }

    /// Point every endpoint at a different host (used against mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn require_client_id(&self) -> AuthResult<&str> {
        self.client_id.as_deref().ok_or_else(|| {
            AuthError::Configuration(format!("{} is not set", constants::CLIO_CLIENT_ID))
        })
    }

    pub fn require_client_secret(&self) -> AuthResult<&str> {
        self.client_secret.as_deref().ok_or_else(|| {
            AuthError::Configuration(format!("{} is not set", constants::CLIO_CLIENT_SECRET))
        })
    }

    pub fn require_redirect_uri(&self) -> AuthResult<&str> {
        self.redirect_uri.as_deref().ok_or_else(|| {
            AuthError::Configuration(format!("{} is not set", constants::CLIO_REDIRECT_URI))
        })
    }

    /// Browser authorization endpoint
    pub fn auth_url(&self) -> String {
        self.endpoint("/oauth/authorize")
    }

    /// Token exchange and refresh endpoint
    pub fn token_url(&self) -> String {
        self.endpoint("/oauth/token")
    }

    /// Token revocation endpoint
    pub fn revoke_url(&self) -> String {
        self.endpoint("/oauth/deauthorize")
    }

    /// Diagnostic identity endpoint
    pub fn identity_url(&self) -> String {
        self.endpoint("/api/v4/users/who_am_i.json")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

// The client secret stays out of logs
impl std::fmt::Debug for ClioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClioConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("base_url", &self.base_url)
            .field("default_scope", &self.default_scope)
            .field("request_timeout", &self.request_timeout)
            .field("state_ttl", &self.state_ttl)
            .finish()
    }
}
