//! Version resolution layer
//!
//! This module turns ambiguous version requests into concrete,
//! provenance-tagged references against a remote source-control host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Resolver   │────▶│   Cache     │     │  Provider   │
//! │ (strategy)  │     │ (TTL memo)  │     │ (GitHub API)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       ▲
//!        └───────────────────────────────────────┘
//!                     on cache miss
//! ```
//!
//! # Modules
//!
//! - [`resolver`]: strategy-driven resolution state machine
//! - [`cache`]: time-boxed memo table for resolved versions
//! - [`provider`]: metadata provider trait and response types
//! - [`github`]: GitHub REST implementation of the provider
//! - [`semver`]: semantic-version and commit-SHA classification
//! - [`types`]: `VersionInfo` and its enums
//! - [`error`]: provider and resolution error types

pub mod cache;
pub mod error;
pub mod github;
pub mod provider;
pub mod resolver;
pub mod semver;
pub mod types;
