//! Time-boxed memo table for resolved versions
//!
//! Upstream release and tag state can change at any time, so entries are
//! kept on a short TTL and evicted lazily on read.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::version::types::VersionInfo;

/// Default TTL for resolved versions (5 minutes).
pub const DEFAULT_VERSION_TTL: Duration = Duration::from_secs(300);

/// In-memory cache for version resolution results.
///
/// Entries are stored with their insertion time and treated as absent once
/// older than the configured TTL. Construct one per process and share it by
/// reference; there is no global instance.
pub struct VersionCache {
    entries: Mutex<HashMap<String, (VersionInfo, Instant)>>,
    ttl: Duration,
}

impl VersionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Builds the cache key for a repository and requested version.
    ///
    /// An absent request maps to `latest`, so `None` and `Some("latest")`
    /// share an entry.
    pub fn cache_key(owner: &str, name: &str, requested: Option<&str>) -> String {
        format!("{}/{}:{}", owner, name, requested.unwrap_or("latest"))
    }

    /// Returns the cached value if present and unexpired.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<VersionInfo> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some((_, inserted_at)) if inserted_at.elapsed() >= self.ttl => {
                debug!(key, "evicting expired version cache entry");
                entries.remove(key);
                None
            }
            Some((info, _)) => Some(info.clone()),
            None => None,
        }
    }

    /// Stores a value with the current timestamp, overwriting any prior
    /// entry for the key.
    pub fn set(&self, key: &str, value: VersionInfo) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), (value, Instant::now()));
    }

    /// Drops all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }
}

impl Default for VersionCache {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_TTL)
    }
}
