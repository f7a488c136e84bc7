// ABOUTME: Server configuration loaded from environment variables
// ABOUTME: Port, CORS origin, frontend URL, database URL and the single default user

use std::num::ParseIntError;

use axum::http::HeaderValue;
use thiserror::Error;

use clio_connect_config::{constants, env_non_empty};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    /// Where the OAuth callback sends the browser afterwards
    pub app_url: String,
    pub database_url: String,
    pub default_user_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env_non_empty(constants::PORT) {
            Some(raw) => raw.parse::<u16>()?,
            None => constants::DEFAULT_PORT,
        };

        // Validate port is in valid range
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin = env_non_empty(constants::CORS_ORIGIN)
            .unwrap_or_else(|| constants::DEFAULT_CORS_ORIGIN.to_string());
        if HeaderValue::from_str(&cors_origin).is_err() {
            return Err(ConfigError::InvalidCorsOrigin(cors_origin));
        }

        let app_url = env_non_empty(constants::APP_URL)
            .or_else(|| env_non_empty(constants::NEXT_PUBLIC_APP_URL))
            .unwrap_or_else(|| constants::DEFAULT_APP_URL.to_string());

        let database_url = env_non_empty(constants::DATABASE_URL)
            .unwrap_or_else(|| constants::DEFAULT_DATABASE_URL.to_string());

        let default_user_id = env_non_empty(constants::CLIO_DEFAULT_USER_ID)
            .unwrap_or_else(|| constants::DEFAULT_USER_ID.to_string());

        Ok(Config {
            port,
            cors_origin,
            app_url,
            database_url,
            default_user_id,
        })
    }
}
