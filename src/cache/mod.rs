//! Generic result caching layer
//!
//! Independent of the version cache: higher-level fetch operations wrap
//! their whole expensive operation (network fetch plus parsing) in
//! [`manager::CacheManager::get_or_set`], with a TTL chosen per call site
//! and a pluggable backend selected by configuration.
//!
//! # Modules
//!
//! - [`backend`]: the six-operation backend trait and health report
//! - [`memory`]: volatile in-process backend
//! - [`redis`]: external-store backend with graceful degradation
//! - [`manager`]: deterministic keys and the get-or-set pattern

pub mod backend;
pub mod manager;
pub mod memory;
pub mod redis;
