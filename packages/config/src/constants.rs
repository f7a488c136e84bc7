// ABOUTME: Environment variable name constants and their defaults
// ABOUTME: Centralized definitions of all environment variable names used across Clio Connect

// CLIO OAuth Client
pub const CLIO_CLIENT_ID: &str = "CLIO_CLIENT_ID";
pub const CLIO_CLIENT_SECRET: &str = "CLIO_CLIENT_SECRET";
pub const CLIO_REDIRECT_URI: &str = "CLIO_REDIRECT_URI";
pub const CLIO_BASE_URL: &str = "CLIO_BASE_URL";
pub const CLIO_DEFAULT_SCOPE: &str = "CLIO_DEFAULT_SCOPE";

// Outbound HTTP
pub const CLIO_HTTP_TIMEOUT_SECS: &str = "CLIO_HTTP_TIMEOUT_SECS";

// OAuth state (CSRF) lifetime
pub const CLIO_OAUTH_STATE_TTL_SECS: &str = "CLIO_OAUTH_STATE_TTL_SECS";

// Server Configuration
pub const PORT: &str = "PORT";
pub const CORS_ORIGIN: &str = "CORS_ORIGIN";
pub const APP_URL: &str = "APP_URL";
pub const NEXT_PUBLIC_APP_URL: &str = "NEXT_PUBLIC_APP_URL"; // Legacy

// Persistence
pub const DATABASE_URL: &str = "DATABASE_URL";

// Single-user mode
pub const CLIO_DEFAULT_USER_ID: &str = "CLIO_DEFAULT_USER_ID";

// Defaults
pub const DEFAULT_CLIO_BASE_URL: &str = "https://app.clio.com";
pub const DEFAULT_CLIO_SCOPE: &str = "read:user_profile";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OAUTH_STATE_TTL_SECS: i64 = 600;
pub const DEFAULT_PORT: u16 = 4010;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://clio-connect.db?mode=rwc";
pub const DEFAULT_USER_ID: &str = "default-user";
