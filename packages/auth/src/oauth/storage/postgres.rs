// ABOUTME: Postgres storage backend for CLIO tokens and OAuth state using SQLx
// ABOUTME: Targets the Supabase database; upserts rely on the unique index on user_id

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Row,
};
use tracing::{debug, error};

use super::{StateStore, TokenStore};
use crate::{
    error::{AuthError, AuthResult},
    oauth::types::{OAuthState, TokenRecord},
};

// Older deployments created clio_tokens without a unique user_id; the index
// below is what ON CONFLICT (user_id) needs.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS clio_tokens (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    access_token TEXT NOT NULL,
    refresh_token TEXT,
    token_type TEXT NOT NULL DEFAULT 'Bearer',
    expires_in BIGINT NOT NULL DEFAULT 604800,
    scope TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE UNIQUE INDEX IF NOT EXISTS clio_tokens_user_id_key ON clio_tokens(user_id);

CREATE TABLE IF NOT EXISTS clio_oauth_states (
    state TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    expires_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS clio_oauth_states_expires_at_idx ON clio_oauth_states(expires_at);
"#;

/// Postgres-backed token and state store
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> AuthResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to connect to database: {}", e)))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> AuthResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to create schema: {}", e)))?;
        Ok(())
    }
}

fn token_from_row(row: &PgRow) -> AuthResult<TokenRecord> {
    Ok(TokenRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        token_type: row.try_get("token_type")?,
        expires_in: row.try_get("expires_in")?,
        scope: row.try_get("scope")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn state_from_row(row: &PgRow) -> AuthResult<OAuthState> {
    Ok(OAuthState {
        state: row.try_get("state")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

#[async_trait]
impl TokenStore for PostgresStore {
    async fn get(&self, user_id: &str) -> AuthResult<Option<TokenRecord>> {
        debug!("Fetching CLIO token for user {}", user_id);

        let row = sqlx::query(
            r#"
            SELECT id, user_id, access_token, refresh_token, token_type,
                   expires_in, scope, created_at, updated_at
            FROM clio_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(token_from_row).transpose()
    }

    async fn upsert(&self, record: &TokenRecord) -> AuthResult<TokenRecord> {
        debug!("Storing CLIO token for user {}", record.user_id);

        let row = sqlx::query(
            r#"
            INSERT INTO clio_tokens (
                id, user_id, access_token, refresh_token, token_type,
                expires_in, scope, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                token_type = EXCLUDED.token_type,
                expires_in = EXCLUDED.expires_in,
                scope = EXCLUDED.scope,
                created_at = EXCLUDED.created_at,
                updated_at = NOW()
            RETURNING id, user_id, access_token, refresh_token, token_type,
                      expires_in, scope, created_at, updated_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.access_token)
        .bind(&record.refresh_token)
        .bind(&record.token_type)
        .bind(record.expires_in)
        .bind(&record.scope)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to store CLIO token: {}", e);
            AuthError::Storage(format!("Failed to store token: {}", e))
        })?;

        token_from_row(&row)
    }

    async fn delete(&self, user_id: &str) -> AuthResult<bool> {
        debug!("Deleting CLIO token for user {}", user_id);

        let result = sqlx::query("DELETE FROM clio_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to delete CLIO token: {}", e);
                AuthError::Storage(format!("Failed to delete token: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StateStore for PostgresStore {
    async fn save(&self, state: &OAuthState) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clio_oauth_states (state, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&state.state)
        .bind(&state.user_id)
        .bind(state.created_at)
        .bind(state.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("Failed to store OAuth state: {}", e)))?;

        Ok(())
    }

    async fn take(&self, state: &str) -> AuthResult<Option<OAuthState>> {
        let row = sqlx::query(
            r#"
            DELETE FROM clio_oauth_states
            WHERE state = $1
            RETURNING state, user_id, created_at, expires_at
            "#,
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(state_from_row).transpose()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM clio_oauth_states WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
