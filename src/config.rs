//! Environment-style configuration for the caching layer

use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default TTL for generic cached results (1 hour)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// TTL used when caching is disabled (1 minute)
pub const DISABLED_CACHE_TTL: Duration = Duration::from_secs(60);

/// Default key namespace prefix for the external store
pub const DEFAULT_KEY_PREFIX: &str = "otel_mcp:";

/// Which backend the cache manager should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheBackendKind::Memory),
            "redis" => Ok(CacheBackendKind::Redis),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

/// Connection parameters for the external key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            password: None,
        }
    }
}

impl RedisSettings {
    /// Connection URL for the redis client.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Cache configuration, normally read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Master switch; when false a short-lived volatile backend is used.
    pub enabled: bool,
    pub backend: CacheBackendKind,
    pub default_ttl: Duration,
    pub key_prefix: String,
    pub redis: RedisSettings,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: CacheBackendKind::Memory,
            default_ttl: DEFAULT_CACHE_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            redis: RedisSettings::default(),
        }
    }
}

impl CacheSettings {
    /// Reads settings from the environment.
    ///
    /// Recognized variables, all optional: `CACHE_ENABLED`,
    /// `CACHE_BACKEND` (`memory`/`redis`), `CACHE_DEFAULT_TTL` (seconds),
    /// `CACHE_KEY_PREFIX`, `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB`,
    /// `REDIS_PASSWORD`. Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("CACHE_ENABLED", defaults.enabled),
            backend: env_parse("CACHE_BACKEND", defaults.backend),
            default_ttl: Duration::from_secs(env_parse(
                "CACHE_DEFAULT_TTL",
                defaults.default_ttl.as_secs(),
            )),
            key_prefix: std::env::var("CACHE_KEY_PREFIX")
                .unwrap_or_else(|_| defaults.key_prefix.clone()),
            redis: RedisSettings {
                host: std::env::var("REDIS_HOST").unwrap_or(defaults.redis.host),
                port: env_parse("REDIS_PORT", defaults.redis.port),
                db: env_parse("REDIS_DB", defaults.redis.db),
                password: std::env::var("REDIS_PASSWORD").ok(),
            },
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
