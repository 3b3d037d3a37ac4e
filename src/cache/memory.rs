//! Volatile in-process cache backend

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::backend::{CacheBackend, CacheError, CacheHealth};

/// In-memory backend holding values with an absolute expiry per key.
///
/// Expired entries are evicted lazily on read and swept during health
/// checks. Entries are replaced wholesale on write, so readers never
/// observe a partially written value.
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
    default_ttl: Duration,
}

impl InMemoryBackend {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value, expires_at));
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }

    async fn clear(&self) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().await;
        entries.clear();
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn health_check(&self) -> CacheHealth {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);

        CacheHealth {
            healthy: true,
            backend: "in_memory",
            entries: Some(entries.len() as u64),
            detail: None,
        }
    }
}
