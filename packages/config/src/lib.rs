// ABOUTME: Configuration helpers shared by every Clio Connect package
// ABOUTME: Exposes environment variable names and tolerant env parsing helpers

pub mod constants;

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Read a trimmed environment variable; whitespace-only values count as unset.
pub fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or unparseable.
pub fn env_parse_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env_non_empty(name) {
        Some(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            default
        }),
        None => default,
    }
}
