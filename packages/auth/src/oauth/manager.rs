// ABOUTME: Token lifecycle manager orchestrating the CLIO OAuth flow
// ABOUTME: Handles authorize URLs, code exchange, storage, lazy refresh, revocation and connection checks

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        cache::TokenCache,
        client::ClioClient,
        provider::ClioConfig,
        state::generate_state,
        storage::{StateStore, Stores, TokenStore},
        types::{
            validate_access_token, validate_expires_in, AuthorizationOptions, ClioIdentity,
            ConnectionStatus, OAuthState, TokenInfo, TokenRecord, TokenResponse,
        },
    },
};

const NO_TOKEN_MESSAGE: &str = "No access token found. Please connect to CLIO.";
const REAUTH_MESSAGE: &str = "Access token expired or invalid. Please reconnect to CLIO.";

/// Token lifecycle manager for CLIO.
///
/// Holds no per-user state between calls: every operation reads the
/// persistent store (optionally through a best-effort cache).
///
/// ```text
/// ABSENT -> PENDING_EXCHANGE -> ACTIVE -> EXPIRED -> ACTIVE   (refresh)
///                                                 -> ABSENT   (refresh failed)
///                               ACTIVE -> ABSENT              (revoke)
/// ```
pub struct TokenManager {
    tokens: Arc<dyn TokenStore>,
    states: Arc<dyn StateStore>,
    cache: Option<Arc<dyn TokenCache>>,
    client: ClioClient,
}

impl TokenManager {
    pub fn new(stores: Stores, client: ClioClient) -> Self {
        Self {
            tokens: stores.tokens,
            states: stores.states,
            cache: None,
            client,
        }
    }

    /// Attach an optional read-through cache
    pub fn with_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &ClioConfig {
        self.client.config()
    }

    /// Build the CLIO authorization URL for `user_id`.
    ///
    /// A fresh random `state` is stored server-side and bound to the user;
    /// the callback must present it exactly once.
    pub async fn build_authorization_url(
        &self,
        user_id: &str,
        options: AuthorizationOptions,
    ) -> AuthResult<Url> {
        require_user_id(user_id)?;

        let config = self.config();
        let client_id = config.require_client_id()?;
        let redirect_uri = config.require_redirect_uri()?;
        let scope = options
            .scope
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| config.default_scope.clone());

        let mut url = Url::parse(&config.auth_url())
            .map_err(|e| AuthError::Configuration(format!("Invalid auth URL: {}", e)))?;

        let state = OAuthState::new(generate_state(), user_id, config.state_ttl, Utc::now());
        self.states.save(&state).await?;
        debug!("Stored OAuth state for user {}", user_id);

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &scope)
            .append_pair("state", &state.state);

        info!("Built CLIO authorization URL for user {}", user_id);
        Ok(url)
    }

    /// Finish the redirect flow: consume `state`, exchange `code`, store the token
    pub async fn complete_authorization(&self, state: &str, code: &str) -> AuthResult<TokenRecord> {
        let redirect_uri = self.config().require_redirect_uri()?.to_string();

        let pending = self.states.take(state).await?.ok_or_else(|| {
            warn!("OAuth callback presented an unknown or already used state");
            AuthError::InvalidState
        })?;

        if pending.is_expired_at(Utc::now()) {
            warn!("OAuth callback presented an expired state");
            return Err(AuthError::InvalidState);
        }

        info!("State validated, exchanging authorization code");
        let response = self.exchange_code_for_token(code, &redirect_uri).await?;
        self.store_token(&pending.user_id, response).await
    }

    /// Exchange an authorization code for tokens. Never retried: codes are single use.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> AuthResult<TokenResponse> {
        if code.trim().is_empty() {
            return Err(AuthError::Validation(
                "Authorization code is required".to_string(),
            ));
        }

        let response = self.client.exchange_code(code, redirect_uri).await?;
        info!(
            "Token received from CLIO (refresh token: {}, expires_in: {:?})",
            response.refresh_token.is_some(),
            response.expires_in
        );
        Ok(response)
    }

    /// Validate and upsert the token for `user_id`, superseding any previous one
    pub async fn store_token(
        &self,
        user_id: &str,
        response: TokenResponse,
    ) -> AuthResult<TokenRecord> {
        require_user_id(user_id)?;
        validate_access_token(&response.access_token)?;
        validate_expires_in(response.expires_in)?;

        let record = TokenRecord::from_response(user_id, response, Utc::now());
        let stored = self.tokens.upsert(&record).await?;

        if let Some(cache) = &self.cache {
            cache.put(&stored).await;
        }

        info!("✅ CLIO token stored for user {}", user_id);
        Ok(stored)
    }

    /// Current access token for `user_id`, refreshing lazily when expired.
    ///
    /// Returns `None` when no token exists or an expired token could not be
    /// renewed; in the latter case the stale row is deleted.
    pub async fn get_valid_token(&self, user_id: &str) -> AuthResult<Option<String>> {
        let Some(record) = self.load(user_id).await? else {
            debug!("No CLIO token stored for user {}", user_id);
            return Ok(None);
        };

        if !record.is_expired() {
            return Ok(Some(record.access_token));
        }

        info!("CLIO token expired for user {}", user_id);

        if record.has_refresh_token() {
            if let Some(refreshed) = self.refresh_token(user_id).await? {
                return Ok(Some(refreshed.access_token));
            }
        }

        self.remove_local(user_id).await?;
        info!("Deleted stale CLIO token for user {}", user_id);
        Ok(None)
    }

    /// Renew the stored token with its refresh token.
    ///
    /// Provider-side failures are expected and yield `Ok(None)`; only storage
    /// failures are returned as errors.
    pub async fn refresh_token(&self, user_id: &str) -> AuthResult<Option<TokenRecord>> {
        let Some(existing) = self.tokens.get(user_id).await? else {
            debug!("No CLIO token to refresh for user {}", user_id);
            return Ok(None);
        };

        let Some(refresh_token) = existing.refresh_token.clone() else {
            debug!("No refresh token available for user {}", user_id);
            return Ok(None);
        };

        let response = match self.client.refresh(&refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                warn!("CLIO token refresh failed for user {}: {}", user_id, e);
                return Ok(None);
            }
        };

        if let Err(e) = validate_access_token(&response.access_token)
            .and_then(|_| validate_expires_in(response.expires_in))
        {
            warn!("CLIO returned an unusable refreshed token: {}", e);
            return Ok(None);
        }

        let mut record = TokenRecord::from_response(user_id, response, Utc::now());
        record.id = existing.id;
        if record.refresh_token.is_none() {
            record.refresh_token = Some(refresh_token);
        }

        let stored = self.tokens.upsert(&record).await?;
        if let Some(cache) = &self.cache {
            cache.put(&stored).await;
        }

        info!("✅ Refreshed CLIO token for user {}", user_id);
        Ok(Some(stored))
    }

    /// Disconnect `user_id`.
    ///
    /// Remote revocation is attempted for an unexpired token and its failure
    /// only logged. The local row is always deleted; the return value reports
    /// whether that delete succeeded.
    pub async fn revoke(&self, user_id: &str) -> bool {
        match self.tokens.get(user_id).await {
            Ok(Some(record)) if !record.is_expired() => {
                match self.client.revoke(&record.access_token).await {
                    Ok(()) => info!("Access token revoked with CLIO"),
                    Err(e) => warn!("⚠️ Failed to revoke token with CLIO: {}", e),
                }
            }
            Ok(_) => debug!("No active CLIO token to revoke for user {}", user_id),
            Err(e) => warn!("Could not read CLIO token before revocation: {}", e),
        }

        match self.remove_local(user_id).await {
            Ok(removed) => {
                info!(
                    "🔌 User {} disconnected from CLIO (token removed: {})",
                    user_id, removed
                );
                true
            }
            Err(e) => {
                error!("Failed to delete CLIO token for user {}: {}", user_id, e);
                false
            }
        }
    }

    /// Check the stored token against CLIO's who_am_i endpoint.
    ///
    /// A 401/403 gets exactly one refresh and retry before the token is
    /// dropped. Other failures leave stored state untouched.
    pub async fn check_connection(&self, user_id: &str) -> ConnectionStatus {
        let access_token = match self.get_valid_token(user_id).await {
            Ok(Some(token)) => token,
            Ok(None) => return ConnectionStatus::needs_reauth(NO_TOKEN_MESSAGE),
            Err(e) => {
                error!("Failed to load CLIO token for user {}: {}", user_id, e);
                return ConnectionStatus::unavailable(e.to_string());
            }
        };

        match self.client.who_am_i(&access_token).await {
            Ok(identity) => ConnectionStatus::connected(&identity),
            Err(e) if e.is_auth_rejection() => self.retry_after_rejection(user_id).await,
            Err(e) => {
                warn!("CLIO connection check failed: {}", e);
                ConnectionStatus::unavailable(e.to_string())
            }
        }
    }

    async fn retry_after_rejection(&self, user_id: &str) -> ConnectionStatus {
        warn!("CLIO rejected the stored token for user {}, refreshing", user_id);

        if let Some(cache) = &self.cache {
            cache.invalidate(user_id).await;
        }

        let refreshed = match self.refresh_token(user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return self.drop_rejected(user_id).await,
            Err(e) => {
                error!("Failed to persist refreshed CLIO token: {}", e);
                return ConnectionStatus::unavailable(e.to_string());
            }
        };

        match self.client.who_am_i(&refreshed.access_token).await {
            Ok(identity) => ConnectionStatus::connected(&identity),
            Err(e) if e.is_auth_rejection() => self.drop_rejected(user_id).await,
            Err(e) => {
                warn!("CLIO connection check failed after refresh: {}", e);
                ConnectionStatus::unavailable(e.to_string())
            }
        }
    }

    async fn drop_rejected(&self, user_id: &str) -> ConnectionStatus {
        match self.remove_local(user_id).await {
            Ok(_) => info!("🗑️ Cleared rejected CLIO token for user {}", user_id),
            Err(e) => error!("Failed to clear rejected CLIO token: {}", e),
        }
        ConnectionStatus::needs_reauth(REAUTH_MESSAGE)
    }

    /// CLIO profile for the user's valid token, `None` when not connected
    pub async fn fetch_identity(&self, user_id: &str) -> AuthResult<Option<ClioIdentity>> {
        let Some(access_token) = self.get_valid_token(user_id).await? else {
            return Ok(None);
        };
        self.client.who_am_i(&access_token).await.map(Some)
    }

    /// Non-secret metadata about the stored token
    pub async fn token_info(&self, user_id: &str) -> AuthResult<Option<TokenInfo>> {
        Ok(self.tokens.get(user_id).await?.map(|record| record.info()))
    }

    /// Drop OAuth states whose flows were never completed
    pub async fn purge_expired_states(&self) -> AuthResult<u64> {
        let removed = self.states.purge_expired(Utc::now()).await?;
        if removed > 0 {
            debug!("Purged {} expired OAuth states", removed);
        }
        Ok(removed)
    }

    async fn load(&self, user_id: &str) -> AuthResult<Option<TokenRecord>> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(user_id).await {
                if !hit.is_expired() {
                    return Ok(Some(hit));
                }
            }
        }

        let record = self.tokens.get(user_id).await?;
        if let (Some(cache), Some(record)) = (&self.cache, &record) {
            cache.put(record).await;
        }
        Ok(record)
    }

    async fn remove_local(&self, user_id: &str) -> AuthResult<bool> {
        if let Some(cache) = &self.cache {
            cache.invalidate(user_id).await;
        }
        self.tokens.delete(user_id).await
    }
}

fn require_user_id(user_id: &str) -> AuthResult<()> {
    if user_id.trim().is_empty() {
        return Err(AuthError::Validation("User id is required".to_string()));
    }
    Ok(())
}
