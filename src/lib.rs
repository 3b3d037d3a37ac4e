//! Version resolution and caching core for OpenTelemetry knowledge tooling
//!
//! This crate resolves ambiguous version requests (`latest`, a tag, a
//! commit SHA) against GitHub repositories using a per-repository
//! strategy, and provides a generic best-effort cache for the expensive
//! fetch operations built on top of it.
//!
//! Resolution degrades rather than fails: when version metadata is
//! unreachable the caller gets the `main` branch fallback, and when the
//! cache backend is down the wrapped computation still runs.

pub mod cache;
pub mod config;
pub mod repos;
pub mod version;

pub use cache::backend::{CacheBackend, CacheError, CacheHealth};
pub use cache::manager::{CacheManager, CacheParams, create_cache_manager};
pub use cache::memory::InMemoryBackend;
pub use cache::redis::RedisBackend;
pub use config::{CacheBackendKind, CacheSettings, RedisSettings};
pub use repos::{RepoConfigError, RepositoryConfig, RepositoryRegistry};
pub use version::cache::VersionCache;
pub use version::error::{ProviderError, ResolutionError};
pub use version::github::GitHubProvider;
pub use version::provider::MetadataProvider;
pub use version::resolver::VersionResolver;
pub use version::types::{RefType, ResolutionSource, VersionInfo, VersionStrategy};
