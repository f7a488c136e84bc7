// ABOUTME: OAuth module implementing the CLIO token lifecycle
// ABOUTME: Includes the manager, HTTP client, storage backends, optional cache and state generation

pub mod cache;
pub mod client;
pub mod manager;
pub mod provider;
pub mod state;
pub mod storage;
pub mod types;

pub use cache::{MemoryTokenCache, TokenCache};
pub use client::ClioClient;
pub use manager::TokenManager;
pub use provider::ClioConfig;
pub use storage::{PostgresStore, SqliteStore, StateStore, Stores, TokenStore};
pub use types::{
    AuthorizationOptions, ClioIdentity, ConnectionStatus, OAuthState, TokenInfo, TokenRecord,
    TokenResponse,
};
