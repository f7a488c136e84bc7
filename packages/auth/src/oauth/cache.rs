// ABOUTME: Optional best-effort in-process cache of CLIO token records
// ABOUTME: Never authoritative; the persistent store is read on every miss

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::oauth::types::TokenRecord;

/// Read-through cache in front of a [`TokenStore`](crate::oauth::storage::TokenStore).
///
/// Entries may be stale or missing at any time; callers treat a miss as
/// "ask the store".
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn get(&self, user_id: &str) -> Option<TokenRecord>;
    async fn put(&self, record: &TokenRecord);
    async fn invalidate(&self, user_id: &str);
}

/// Per-process cache. Each instance owns its map; nothing is global.
#[derive(Default)]
pub struct MemoryTokenCache {
    entries: RwLock<HashMap<String, TokenRecord>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, user_id: &str) -> Option<TokenRecord> {
        self.entries.read().await.get(user_id).cloned()
    }

    async fn put(&self, record: &TokenRecord) {
        self.entries
            .write()
            .await
            .insert(record.user_id.clone(), record.clone());
    }

    async fn invalidate(&self, user_id: &str) {
        self.entries.write().await.remove(user_id);
    }
}
