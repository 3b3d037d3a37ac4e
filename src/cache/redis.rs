//! Redis-backed cache backend
//!
//! The connection is established lazily on first use. Every operation that
//! talks to the store catches connection and protocol errors and degrades
//! instead of raising, so a dead Redis slows nothing down beyond the
//! failed round trip.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::cache::backend::{CacheBackend, CacheError, CacheHealth};
use crate::config::{CacheSettings, RedisSettings};

pub struct RedisBackend {
    client: redis::Client,
    conn: OnceCell<MultiplexedConnection>,
    default_ttl: Duration,
    key_prefix: String,
}

impl RedisBackend {
    /// Creates a backend from settings without connecting yet.
    pub fn new(settings: &RedisSettings, default_ttl: Duration, key_prefix: String) -> Result<Self, CacheError> {
        let client = redis::Client::open(settings.url())?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            default_ttl,
            key_prefix,
        })
    }

    pub fn from_settings(settings: &CacheSettings) -> Result<Self, CacheError> {
        Self::new(
            &settings.redis,
            settings.default_ttl,
            settings.key_prefix.clone(),
        )
    }

    /// Returns the shared connection, establishing it on first use.
    async fn connection(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = self.client.get_multiplexed_async_connection().await?;
                info!("Redis connection established");
                Ok::<_, redis::RedisError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }

    /// Verifies the store is reachable. Used at startup to decide whether
    /// to fall back to the volatile backend.
    pub async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait::async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(key, %err, "Redis get failed, treating as miss");
                return Ok(None);
            }
        };

        let raw: Option<String> = match conn.get(self.prefixed(key)).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, %err, "Redis get failed, treating as miss");
                return Ok(None);
            }
        };

        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    warn!(key, %err, "Cached payload is not valid JSON, treating as miss");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let payload = match serde_json::to_string(&value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key, %err, "Failed to serialize value for Redis");
                return Ok(false);
            }
        };

        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(key, %err, "Redis set failed");
                return Ok(false);
            }
        };

        let ttl_secs = ttl.unwrap_or(self.default_ttl).as_secs();
        match conn
            .set_ex::<_, _, ()>(self.prefixed(key), payload, ttl_secs)
            .await
        {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(key, %err, "Redis set failed");
                Ok(false)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(key, %err, "Redis delete failed");
                return Ok(false);
            }
        };

        match conn.del::<_, i64>(self.prefixed(key)).await {
            Ok(deleted) => Ok(deleted > 0),
            Err(err) => {
                warn!(key, %err, "Redis delete failed");
                Ok(false)
            }
        }
    }

    async fn clear(&self) -> Result<bool, CacheError> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(%err, "Redis clear failed");
                return Ok(false);
            }
        };

        // Only keys under this instance's namespace, never a global flush
        let pattern = format!("{}*", self.key_prefix);
        let keys: Vec<String> = match conn.keys(&pattern).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(%err, "Redis clear failed");
                return Ok(false);
            }
        };

        if keys.is_empty() {
            return Ok(true);
        }

        match conn.del::<_, i64>(keys).await {
            Ok(deleted) => Ok(deleted > 0),
            Err(err) => {
                warn!(%err, "Redis clear failed");
                Ok(false)
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(key, %err, "Redis exists failed");
                return Ok(false);
            }
        };

        match conn.exists::<_, bool>(self.prefixed(key)).await {
            Ok(exists) => Ok(exists),
            Err(err) => {
                warn!(key, %err, "Redis exists failed");
                Ok(false)
            }
        }
    }

    async fn health_check(&self) -> CacheHealth {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(err) => {
                return CacheHealth {
                    healthy: false,
                    backend: "redis",
                    entries: None,
                    detail: Some(err.to_string()),
                };
            }
        };

        let pong: Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;
        if let Err(err) = pong {
            return CacheHealth {
                healthy: false,
                backend: "redis",
                entries: None,
                detail: Some(err.to_string()),
            };
        }

        let pattern = format!("{}*", self.key_prefix);
        let entries = conn
            .keys::<_, Vec<String>>(&pattern)
            .await
            .ok()
            .map(|keys| keys.len() as u64);

        CacheHealth {
            healthy: true,
            backend: "redis",
            entries,
            detail: None,
        }
    }
}
