// ABOUTME: Persistence traits for CLIO tokens and OAuth state, plus backend selection
// ABOUTME: SQLite and Postgres (Supabase) backends both implement TokenStore and StateStore

mod postgres;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    error::{AuthError, AuthResult},
    oauth::types::{OAuthState, TokenRecord},
};

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Token rows keyed by user. At most one row exists per user.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, user_id: &str) -> AuthResult<Option<TokenRecord>>;

    /// Insert or wholly replace the user's token in a single statement.
    /// Returns the row as persisted.
    async fn upsert(&self, record: &TokenRecord) -> AuthResult<TokenRecord>;

    /// Returns whether a row was removed
    async fn delete(&self, user_id: &str) -> AuthResult<bool>;
}

/// Short-lived OAuth `state` values bound to the user who started the flow
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn save(&self, state: &OAuthState) -> AuthResult<()>;

    /// Remove and return the state in one statement so it can only be used once
    async fn take(&self, state: &str) -> AuthResult<Option<OAuthState>>;

    /// Delete states that expired before `now`, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Token and state stores sharing one backend
#[derive(Clone)]
pub struct Stores {
    pub tokens: Arc<dyn TokenStore>,
    pub states: Arc<dyn StateStore>,
}

impl Stores {
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: TokenStore + StateStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            tokens: backend.clone(),
            states: backend,
        }
    }

    /// Connect to the database named by `database_url` and make sure the schema exists.
    ///
    /// `postgres://` and `postgresql://` URLs select Postgres, `sqlite:` URLs select SQLite.
    pub async fn connect(database_url: &str) -> AuthResult<Self> {
        match backend_kind(database_url)? {
            BackendKind::Postgres => {
                info!("Using Postgres token store");
                let store = PostgresStore::connect(database_url).await?;
                store.ensure_schema().await?;
                Ok(Self::from_backend(store))
            }
            BackendKind::Sqlite => {
                info!("Using SQLite token store");
                let store = SqliteStore::connect(database_url).await?;
                store.ensure_schema().await?;
                Ok(Self::from_backend(store))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Postgres,
    Sqlite,
}

fn backend_kind(database_url: &str) -> AuthResult<BackendKind> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok(BackendKind::Postgres)
    } else if database_url.starts_with("sqlite:") {
        Ok(BackendKind::Sqlite)
    } else {
        Err(AuthError::Configuration(
            "DATABASE_URL must start with postgres://, postgresql:// or sqlite:".to_string(),
        ))
    }
}
