//! Repository configurations for version-aware content retrieval
//!
//! A static table of the repositories this crate knows how to resolve
//! versions for, plus the URL builders derived from a configuration.

use std::collections::HashMap;

use thiserror::Error;

use crate::version::types::VersionStrategy;

#[derive(Debug, Error)]
pub enum RepoConfigError {
    #[error("repository configuration not found: {0}")]
    UnknownRepository(String),
}

/// Identity and resolution policy for one repository.
///
/// Populated once at registry construction and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
    /// Hosting provider, currently always `github`.
    pub provider: String,
    /// Canonical browsable URL of the repository.
    pub url: String,
    /// Named default paths inside the repository (e.g. `docs`, `spec`).
    pub default_paths: HashMap<String, String>,
    pub version_strategy: VersionStrategy,
    pub description: String,
}

impl RepositoryConfig {
    /// `owner/name` as used in API paths and cache keys.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Raw-content URL for a file at a specific version.
    pub fn raw_url(&self, version: &str, path: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}",
            self.full_name(),
            version,
            path
        )
    }

    /// Human-browsable URL for a file at a specific version.
    pub fn blob_url(&self, version: &str, path: &str) -> String {
        format!(
            "https://github.com/{}/blob/{}/{}",
            self.full_name(),
            version,
            path
        )
    }

    /// API URL for the repository, optionally extended with an endpoint.
    pub fn api_url(&self, endpoint: &str) -> String {
        let base = format!("https://api.github.com/repos/{}", self.full_name());
        if endpoint.is_empty() {
            base
        } else {
            format!("{}/{}", base, endpoint)
        }
    }
}

/// Static lookup from a repository key to its configuration.
pub struct RepositoryRegistry {
    configs: HashMap<String, RepositoryConfig>,
}

impl RepositoryRegistry {
    /// Registry of the repositories shipped with this crate.
    pub fn builtin() -> Self {
        let mut configs = HashMap::new();

        configs.insert(
            "opentelemetry-docs".to_string(),
            RepositoryConfig {
                owner: "open-telemetry".to_string(),
                name: "opentelemetry.io".to_string(),
                provider: "github".to_string(),
                url: "https://github.com/open-telemetry/opentelemetry.io".to_string(),
                default_paths: HashMap::from([
                    ("docs".to_string(), "content/en/docs/languages".to_string()),
                    (
                        "demo".to_string(),
                        "content/en/docs/demo/services/_index.md".to_string(),
                    ),
                ]),
                version_strategy: VersionStrategy::ReleasesWithFallback,
                description: "OpenTelemetry documentation website".to_string(),
            },
        );

        configs.insert(
            "semantic-conventions".to_string(),
            RepositoryConfig {
                owner: "open-telemetry".to_string(),
                name: "semantic-conventions".to_string(),
                provider: "github".to_string(),
                url: "https://github.com/open-telemetry/semantic-conventions".to_string(),
                default_paths: HashMap::from([("docs".to_string(), "docs".to_string())]),
                version_strategy: VersionStrategy::ReleasesOnly,
                description: "OpenTelemetry semantic conventions".to_string(),
            },
        );

        configs.insert(
            "instrumentation-score".to_string(),
            RepositoryConfig {
                owner: "instrumentation-score".to_string(),
                name: "spec".to_string(),
                provider: "github".to_string(),
                url: "https://github.com/instrumentation-score/spec".to_string(),
                default_paths: HashMap::from([
                    ("spec".to_string(), "spec.md".to_string()),
                    ("rules".to_string(), "rules".to_string()),
                ]),
                version_strategy: VersionStrategy::TagsWithFallback,
                description: "Instrumentation Score specification".to_string(),
            },
        );

        configs.insert(
            "opentelemetry-demo".to_string(),
            RepositoryConfig {
                owner: "open-telemetry".to_string(),
                name: "opentelemetry-demo".to_string(),
                provider: "github".to_string(),
                url: "https://github.com/open-telemetry/opentelemetry-demo".to_string(),
                default_paths: HashMap::from([("src".to_string(), "src".to_string())]),
                version_strategy: VersionStrategy::ReleasesWithFallback,
                description: "OpenTelemetry demo application".to_string(),
            },
        );

        Self { configs }
    }

    /// Looks up a configuration by key.
    ///
    /// Returns a copy so callers cannot mutate the shared table.
    pub fn get(&self, key: &str) -> Result<RepositoryConfig, RepoConfigError> {
        self.configs
            .get(key)
            .cloned()
            .ok_or_else(|| RepoConfigError::UnknownRepository(key.to_string()))
    }

    /// Keys of all registered repositories.
    pub fn keys(&self) -> Vec<&str> {
        self.configs.keys().map(String::as_str).collect()
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
