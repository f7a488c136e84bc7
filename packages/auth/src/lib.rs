// ABOUTME: Clio Connect authentication library managing the CLIO OAuth token lifecycle
// ABOUTME: Builds authorize URLs, exchanges codes, stores, refreshes and revokes CLIO tokens

pub mod error;
pub mod oauth;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use oauth::{
    AuthorizationOptions, ClioClient, ClioConfig, ClioIdentity, ConnectionStatus,
    MemoryTokenCache, OAuthState, PostgresStore, SqliteStore, StateStore, Stores, TokenCache,
    TokenInfo, TokenManager, TokenRecord, TokenResponse, TokenStore,
};
