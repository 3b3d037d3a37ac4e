//! Cache manager: key construction plus get-or-compute-or-store
//!
//! Caching here is strictly best-effort. A backend malfunction must never
//! fail a request that would otherwise have succeeded, so every backend
//! call is guarded and the wrapped computation always runs on any cache
//! failure.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::cache::backend::{CacheBackend, CacheHealth};
use crate::cache::memory::InMemoryBackend;
use crate::cache::redis::RedisBackend;
use crate::config::{CacheBackendKind, CacheSettings, DISABLED_CACHE_TTL};

/// Optional parameters contributing to a cache key.
///
/// The named fields are appended in a fixed order; `extra` entries follow,
/// sorted by name, so identical logical requests always produce identical
/// keys regardless of call-site argument order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheParams {
    pub language: Option<String>,
    pub version: Option<String>,
    pub category: Option<String>,
    pub repo: Option<String>,
    /// Free-text search terms; hashed into the key to bound its length.
    pub keywords: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl CacheParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// Wraps a backend with deterministic keys and the get-or-set pattern.
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
}

impl CacheManager {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Builds the deterministic key for an operation and its parameters.
    pub fn build_key(operation: &str, params: &CacheParams) -> String {
        let mut parts = vec![operation.to_string()];

        if let Some(language) = &params.language {
            parts.push(format!("lang:{language}"));
        }
        if let Some(version) = &params.version {
            parts.push(format!("ver:{version}"));
        }
        if let Some(category) = &params.category {
            parts.push(format!("cat:{category}"));
        }
        if let Some(repo) = &params.repo {
            parts.push(format!("repo:{repo}"));
        }
        if let Some(keywords) = &params.keywords {
            parts.push(format!("kw:{}", keywords_hash(keywords)));
        }
        for (name, value) in &params.extra {
            parts.push(format!("{name}:{value}"));
        }

        parts.join(":")
    }

    /// Returns the cached value for the operation, or computes, stores,
    /// and returns a fresh one.
    ///
    /// The computation's own error propagates unchanged; cache failures
    /// never do.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        operation: &str,
        params: &CacheParams,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = Self::build_key(operation, params);

        match self.backend.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(value) => {
                    debug!(operation, key = %key, "cache hit");
                    return Ok(value);
                }
                Err(err) => {
                    warn!(operation, key = %key, %err, "cached value failed to decode, refetching");
                }
            },
            Ok(None) => debug!(operation, key = %key, "cache miss"),
            Err(err) => warn!(operation, key = %key, %err, "cache get failed, fetching directly"),
        }

        let result = fetch().await?;

        match serde_json::to_value(&result) {
            Ok(value) => match self.backend.set(&key, value, ttl).await {
                Ok(true) => debug!(operation, key = %key, "result cached"),
                Ok(false) => warn!(operation, key = %key, "failed to cache result"),
                Err(err) => warn!(operation, key = %key, %err, "cache set failed"),
            },
            Err(err) => warn!(operation, key = %key, %err, "result not serializable, skipping cache"),
        }

        Ok(result)
    }

    /// Deletes the entry for an operation; returns whether a deletion
    /// occurred. Backend failures are reported as `false`.
    pub async fn invalidate(&self, operation: &str, params: &CacheParams) -> bool {
        let key = Self::build_key(operation, params);
        match self.backend.delete(&key).await {
            Ok(deleted) => {
                debug!(operation, key = %key, deleted, "cache invalidated");
                deleted
            }
            Err(err) => {
                warn!(operation, key = %key, %err, "cache invalidation failed");
                false
            }
        }
    }

    pub async fn health_check(&self) -> CacheHealth {
        self.backend.health_check().await
    }
}

/// Truncated hex digest keeping keys short for free-text search terms.
fn keywords_hash(keywords: &str) -> String {
    let digest = Sha256::digest(keywords.as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Builds a cache manager from settings.
///
/// Disabled caching degrades to a short-TTL volatile backend. When Redis
/// is selected but unreachable, the volatile backend is used instead so
/// startup never fails on a cache dependency.
pub async fn create_cache_manager(settings: &CacheSettings) -> CacheManager {
    if !settings.enabled {
        info!("Caching disabled, using short-lived in-memory store");
        return CacheManager::new(Arc::new(InMemoryBackend::new(DISABLED_CACHE_TTL)));
    }

    match settings.backend {
        CacheBackendKind::Redis => {
            let fallback = || {
                CacheManager::new(Arc::new(InMemoryBackend::new(settings.default_ttl)))
            };
            let backend = match RedisBackend::from_settings(settings) {
                Ok(backend) => backend,
                Err(err) => {
                    warn!(%err, "Failed to initialize Redis backend, falling back to in-memory");
                    return fallback();
                }
            };
            match backend.ping().await {
                Ok(()) => {
                    info!(
                        host = %settings.redis.host,
                        port = settings.redis.port,
                        db = settings.redis.db,
                        "Redis cache enabled"
                    );
                    CacheManager::new(Arc::new(backend))
                }
                Err(err) => {
                    warn!(%err, "Redis unreachable, falling back to in-memory cache");
                    fallback()
                }
            }
        }
        CacheBackendKind::Memory => {
            info!(default_ttl_secs = settings.default_ttl.as_secs(), "In-memory cache enabled");
            CacheManager::new(Arc::new(InMemoryBackend::new(settings.default_ttl)))
        }
    }
}
