// ABOUTME: HTTP client for the CLIO OAuth and identity endpoints
// ABOUTME: Form-encoded token grants, revocation and the who_am_i diagnostic call

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        provider::ClioConfig,
        types::{ClioIdentity, DataEnvelope, TokenResponse},
    },
};

const CLIO_API_VERSION_HEADER: &str = "X-CLIO-API-VERSION";
const CLIO_API_VERSION: &str = "4";

/// Server-to-server client for CLIO. Every request carries the configured timeout.
#[derive(Clone)]
pub struct ClioClient {
    http: Client,
    config: ClioConfig,
}

impl ClioClient {
    pub fn new(config: ClioConfig) -> AuthResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("clio-connect/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClioConfig {
        &self.config
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Authorization codes are single use, so a failure here is final.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AuthResult<TokenResponse> {
        let client_id = self.config.require_client_id()?;
        let client_secret = self.config.require_client_secret()?;

        debug!("Exchanging authorization code for CLIO token");
        self.post_token_form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .await
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        let client_id = self.config.require_client_id()?;
        let client_secret = self.config.require_client_secret()?;

        debug!("Refreshing CLIO token");
        self.post_token_form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .await
    }

    /// Ask CLIO to invalidate an access token
    pub async fn revoke(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .http
            .post(self.config.revoke_url())
            .bearer_auth(access_token)
            .header(CLIO_API_VERSION_HEADER, CLIO_API_VERSION)
            .form(&[("token", access_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Fetch the profile of the user that owns `access_token`
    pub async fn who_am_i(&self, access_token: &str) -> AuthResult<ClioIdentity> {
        let response = self
            .http
            .get(self.config.identity_url())
            .bearer_auth(access_token)
            .header(CLIO_API_VERSION_HEADER, CLIO_API_VERSION)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        debug!("CLIO who_am_i responded with status {}", response.status());

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: DataEnvelope<ClioIdentity> = decode(response).await?;
        Ok(envelope.data)
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> AuthResult<TokenResponse> {
        // CLIO rejects JSON bodies on the token endpoint
        let response = self
            .http
            .post(self.config.token_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Don't log the body - it can echo credentials back
            error!("CLIO token endpoint returned status {}", status);
            return Err(AuthError::TokenExchange {
                status_code: status.as_u16(),
                body,
            });
        }

        decode(response).await
    }
}

async fn api_error(response: Response) -> AuthError {
    let status_code = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("CLIO API returned status {}", status_code);
    AuthError::Api { status_code, body }
}

async fn decode<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
