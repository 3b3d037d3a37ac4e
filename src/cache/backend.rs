//! Cache backend trait
//!
//! The backend is a plain key-value capability with per-key TTL. Keys are
//! built by the manager; values are JSON so either backend can hold the
//! result of any fetch operation.

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Health report from a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheHealth {
    pub healthy: bool,
    pub backend: &'static str,
    /// Number of live entries, where the backend can count them.
    pub entries: Option<u64>,
    /// Failure detail when unhealthy.
    pub detail: Option<String>,
}

/// Pluggable storage behind the cache manager.
///
/// Implementations talking to a remote store must catch connection and
/// protocol errors at this boundary and degrade (`get` to absent, the rest
/// to `false`) instead of failing: the cache must never become a hard
/// dependency for the operations it accelerates. The `Err` variants exist
/// for local faults such as serialization, and the manager guards against
/// them as well.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the value if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores a value; `ttl` of `None` uses the backend default. Returns
    /// whether the value was stored.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>)
    -> Result<bool, CacheError>;

    /// Removes a key; returns whether an entry was deleted.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Drops all entries owned by this backend instance.
    async fn clear(&self) -> Result<bool, CacheError>;

    /// Whether the key exists and is unexpired.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    async fn health_check(&self) -> CacheHealth;
}
