//! Strategy-driven version resolution
//!
//! Turns an ambiguous version request (`None`, `"latest"`, a tag, a commit
//! SHA) into a concrete, provenance-tagged [`VersionInfo`] by consulting
//! the repository's metadata provider according to its
//! [`VersionStrategy`]. Results are memoized in a short-lived
//! [`VersionCache`].
//!
//! Resolution never fails outward: any internal error degrades to the
//! `main` branch fallback so content fetching stays available when version
//! metadata is unreachable. Availability is preferred over precision here.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::repos::RepositoryConfig;
use crate::version::cache::VersionCache;
use crate::version::error::ResolutionError;
use crate::version::provider::MetadataProvider;
use crate::version::semver::{KNOWN_BRANCHES, is_commit_sha, is_semantic_version};
use crate::version::types::{RefType, ResolutionSource, VersionInfo, VersionStrategy};

/// Resolves version requests for configured repositories.
///
/// Holds a shared metadata provider and version cache; construct one per
/// process and pass it to consumers.
pub struct VersionResolver {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<VersionCache>,
}

impl VersionResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>, cache: Arc<VersionCache>) -> Self {
        Self { provider, cache }
    }

    /// Resolves a version request to concrete version information.
    ///
    /// This is the single place where internal resolution errors are
    /// converted into the default-branch fallback; callers always receive
    /// a usable [`VersionInfo`].
    pub async fn resolve_version(
        &self,
        config: &RepositoryConfig,
        requested: Option<&str>,
    ) -> VersionInfo {
        let cache_key = VersionCache::cache_key(&config.owner, &config.name, requested);

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!(
                repository = %config.full_name(),
                cache_key = %cache_key,
                "version cache hit"
            );
            return cached;
        }

        match self.try_resolve(config, requested).await {
            Ok(info) => {
                self.cache.set(&cache_key, info.clone());
                info!(
                    repository = %config.full_name(),
                    requested = requested.unwrap_or("latest"),
                    resolved = %info.resolved_version,
                    source = info.resolution_source.as_str(),
                    "version resolved"
                );
                info
            }
            Err(ResolutionError::UnresolvableVersion(version)) => {
                warn!(
                    repository = %config.full_name(),
                    version = %version,
                    "could not resolve version, falling back to main"
                );
                VersionInfo::fallback()
            }
            Err(err) => {
                error!(
                    repository = %config.full_name(),
                    requested = requested.unwrap_or("latest"),
                    strategy = config.version_strategy.as_str(),
                    %err,
                    "failed to resolve version, falling back to main"
                );
                VersionInfo::fallback()
            }
        }
    }

    async fn try_resolve(
        &self,
        config: &RepositoryConfig,
        requested: Option<&str>,
    ) -> Result<VersionInfo, ResolutionError> {
        match requested {
            Some(version) if !wants_latest(version) => {
                self.resolve_specific(config, version).await
            }
            _ => self.resolve_latest(config).await,
        }
    }

    /// Resolves "give me the latest" according to the repository strategy.
    async fn resolve_latest(
        &self,
        config: &RepositoryConfig,
    ) -> Result<VersionInfo, ResolutionError> {
        match config.version_strategy {
            VersionStrategy::ReleasesOnly => self.from_latest_release(config).await,
            VersionStrategy::TagsOnly => self.from_latest_tag(config).await,
            VersionStrategy::ReleasesWithFallback => {
                match self.from_latest_release(config).await {
                    Ok(info) => Ok(info),
                    Err(err) => {
                        warn!(
                            repository = %config.full_name(),
                            %err,
                            "latest release unavailable, trying tags"
                        );
                        match self.from_latest_tag(config).await {
                            Ok(info) => Ok(info),
                            Err(err) => {
                                warn!(
                                    repository = %config.full_name(),
                                    %err,
                                    "latest tag unavailable, falling back to main"
                                );
                                Ok(VersionInfo::fallback())
                            }
                        }
                    }
                }
            }
            VersionStrategy::TagsWithFallback => match self.from_latest_tag(config).await {
                Ok(info) => Ok(info),
                Err(err) => {
                    warn!(
                        repository = %config.full_name(),
                        %err,
                        "latest tag unavailable, falling back to main"
                    );
                    Ok(VersionInfo::fallback())
                }
            },
        }
    }

    /// Resolves an explicit version string.
    ///
    /// Tries an exact release match, then an exact tag match. Provider
    /// errors on these by-name lookups count as misses so the next source
    /// is still consulted. The raw string is accepted directly only when it
    /// looks like a commit SHA or a known branch name.
    async fn resolve_specific(
        &self,
        config: &RepositoryConfig,
        version: &str,
    ) -> Result<VersionInfo, ResolutionError> {
        match self
            .provider
            .release_by_tag(&config.owner, &config.name, version)
            .await
        {
            Ok(Some(release)) => {
                return Ok(VersionInfo {
                    is_semantic: is_semantic_version(&release.tag_name),
                    resolved_version: release.tag_name,
                    ref_type: RefType::Tag,
                    resolution_source: ResolutionSource::ReleasesApi,
                    commit_sha: release.target_commitish,
                });
            }
            Ok(None) => {}
            Err(err) => {
                debug!(
                    repository = %config.full_name(),
                    version,
                    %err,
                    "release lookup failed, trying tags"
                );
            }
        }

        match self
            .provider
            .tag_ref(&config.owner, &config.name, version)
            .await
        {
            Ok(Some(tag_ref)) => {
                return Ok(VersionInfo {
                    resolved_version: version.to_string(),
                    ref_type: RefType::Tag,
                    resolution_source: ResolutionSource::TagsApi,
                    is_semantic: is_semantic_version(version),
                    commit_sha: Some(tag_ref.object.sha),
                });
            }
            Ok(None) => {}
            Err(err) => {
                debug!(
                    repository = %config.full_name(),
                    version,
                    %err,
                    "tag lookup failed"
                );
            }
        }

        if is_commit_sha(version) {
            return Ok(VersionInfo {
                resolved_version: version.to_string(),
                ref_type: RefType::Commit,
                resolution_source: ResolutionSource::Direct,
                is_semantic: is_semantic_version(version),
                commit_sha: None,
            });
        }

        if KNOWN_BRANCHES.contains(&version) {
            return Ok(VersionInfo {
                resolved_version: version.to_string(),
                ref_type: RefType::Branch,
                resolution_source: ResolutionSource::Direct,
                is_semantic: is_semantic_version(version),
                commit_sha: None,
            });
        }

        Err(ResolutionError::UnresolvableVersion(version.to_string()))
    }

    /// Releases-lookup step: a missing latest release is a recoverable
    /// miss, reported as [`ResolutionError::NoReleases`] so the strategy
    /// decides whether to fall through.
    async fn from_latest_release(
        &self,
        config: &RepositoryConfig,
    ) -> Result<VersionInfo, ResolutionError> {
        let release = self
            .provider
            .latest_release(&config.owner, &config.name)
            .await?
            .ok_or(ResolutionError::NoReleases)?;

        Ok(VersionInfo {
            is_semantic: is_semantic_version(&release.tag_name),
            resolved_version: release.tag_name,
            ref_type: RefType::Tag,
            resolution_source: ResolutionSource::ReleasesApi,
            commit_sha: release.target_commitish,
        })
    }

    /// Tags-lookup step: an empty tag list is a recoverable miss.
    async fn from_latest_tag(
        &self,
        config: &RepositoryConfig,
    ) -> Result<VersionInfo, ResolutionError> {
        let tag = self
            .provider
            .latest_tag(&config.owner, &config.name)
            .await?
            .ok_or(ResolutionError::NoTags)?;

        Ok(VersionInfo {
            is_semantic: is_semantic_version(&tag.name),
            resolved_version: tag.name,
            ref_type: RefType::Tag,
            resolution_source: ResolutionSource::TagsApi,
            commit_sha: Some(tag.commit.sha),
        })
    }
}

/// `None` is handled by the caller; these literals all mean "latest".
fn wants_latest(requested: &str) -> bool {
    requested.eq_ignore_ascii_case("latest")
        || requested.eq_ignore_ascii_case("main")
        || requested.eq_ignore_ascii_case("master")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::RepositoryRegistry;
    use crate::version::error::ProviderError;
    use crate::version::provider::{
        MockMetadataProvider, Release, RefObject, TagCommit, TagEntry, TagRef,
    };
    use std::time::Duration;

    fn config_with_strategy(strategy: VersionStrategy) -> RepositoryConfig {
        let mut config = RepositoryRegistry::builtin().get("opentelemetry-docs").unwrap();
        config.version_strategy = strategy;
        config
    }

    fn resolver_with(provider: MockMetadataProvider) -> VersionResolver {
        VersionResolver::new(Arc::new(provider), Arc::new(VersionCache::default()))
    }

    fn release(tag: &str, commitish: &str) -> Release {
        Release {
            tag_name: tag.to_string(),
            target_commitish: Some(commitish.to_string()),
        }
    }

    fn tag(name: &str, sha: &str) -> TagEntry {
        TagEntry {
            name: name.to_string(),
            commit: TagCommit {
                sha: sha.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn latest_resolves_through_releases_api() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_latest_release()
            .times(1)
            .returning(|_, _| Ok(Some(release("v1.5.0", "abc123"))));

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, None).await;

        assert_eq!(
            info,
            VersionInfo {
                resolved_version: "v1.5.0".to_string(),
                ref_type: RefType::Tag,
                resolution_source: ResolutionSource::ReleasesApi,
                is_semantic: true,
                commit_sha: Some("abc123".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn second_resolution_within_ttl_hits_cache() {
        let mut provider = MockMetadataProvider::new();
        // Exactly one provider call for two resolutions
        provider
            .expect_latest_release()
            .times(1)
            .returning(|_, _| Ok(Some(release("v1.5.0", "abc123"))));

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);

        let first = resolver.resolve_version(&config, None).await;
        let second = resolver.resolve_version(&config, None).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn expired_cache_entry_triggers_a_fresh_lookup() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_latest_release()
            .times(2)
            .returning(|_, _| Ok(Some(release("v1.5.0", "abc123"))));

        let resolver = VersionResolver::new(
            Arc::new(provider),
            Arc::new(VersionCache::new(Duration::from_millis(30))),
        );
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);

        resolver.resolve_version(&config, None).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        resolver.resolve_version(&config, None).await;
    }

    #[tokio::test]
    async fn latest_and_main_and_none_share_resolution_path() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_latest_release()
            .times(3)
            .returning(|_, _| Ok(Some(release("v1.5.0", "abc123"))));

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);

        // Distinct cache keys, same resolution path
        for requested in [None, Some("LATEST"), Some("Master")] {
            let info = resolver.resolve_version(&config, requested).await;
            assert_eq!(info.resolution_source, ResolutionSource::ReleasesApi);
        }
    }

    #[tokio::test]
    async fn releases_with_fallback_falls_through_to_tags() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_latest_release()
            .times(1)
            .returning(|_, _| Ok(None)); // no releases published
        provider
            .expect_latest_tag()
            .times(1)
            .returning(|_, _| Ok(Some(tag("v0.9.0", "def456"))));

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, None).await;

        assert_eq!(info.resolution_source, ResolutionSource::TagsApi);
        assert_eq!(info.resolved_version, "v0.9.0");
        assert_eq!(info.commit_sha, Some("def456".to_string()));
    }

    #[tokio::test]
    async fn releases_only_does_not_consult_tags() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_latest_release()
            .times(1)
            .returning(|_, _| Ok(None));
        // No expectation for latest_tag: calling it would panic

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesOnly);
        let info = resolver.resolve_version(&config, None).await;

        assert_eq!(info, VersionInfo::fallback());
    }

    #[tokio::test]
    async fn tags_only_propagates_failure_to_outer_fallback() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_latest_tag()
            .times(1)
            .returning(|_, _| {
                Err(ProviderError::Status {
                    status: 500,
                    url: "https://api.github.com/repos/x/y/tags".to_string(),
                })
            });

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::TagsOnly);
        let info = resolver.resolve_version(&config, None).await;

        assert_eq!(info, VersionInfo::fallback());
    }

    #[tokio::test]
    async fn tags_with_fallback_exhaustion_returns_and_caches_the_fallback() {
        let mut provider = MockMetadataProvider::new();
        // One call total: the exhausted-chain fallback is a normal result
        // and lands in the cache, unlike a hard resolution failure
        provider
            .expect_latest_tag()
            .times(1)
            .returning(|_, _| {
                Err(ProviderError::Status {
                    status: 500,
                    url: "https://api.github.com/repos/x/y/tags".to_string(),
                })
            });

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::TagsWithFallback);

        assert_eq!(
            resolver.resolve_version(&config, None).await,
            VersionInfo::fallback()
        );
        assert_eq!(
            resolver.resolve_version(&config, None).await,
            VersionInfo::fallback()
        );
    }

    #[tokio::test]
    async fn every_endpoint_failing_degrades_to_main() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_latest_release().returning(|_, _| {
            Err(ProviderError::Status {
                status: 503,
                url: "releases/latest".to_string(),
            })
        });
        provider.expect_latest_tag().returning(|_, _| {
            Err(ProviderError::Status {
                status: 503,
                url: "tags".to_string(),
            })
        });

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, None).await;

        assert_eq!(info.resolved_version, "main");
        assert_eq!(info.ref_type, RefType::Branch);
        assert_eq!(info.resolution_source, ResolutionSource::Fallback);
    }

    #[tokio::test]
    async fn specific_version_matches_release_first() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_release_by_tag()
            .times(1)
            .returning(|_, _, tag_name| {
                assert_eq!(tag_name, "v1.2.3");
                Ok(Some(release("v1.2.3", "aaa111")))
            });

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, Some("v1.2.3")).await;

        assert_eq!(info.resolution_source, ResolutionSource::ReleasesApi);
        assert_eq!(info.resolved_version, "v1.2.3");
        assert!(info.is_semantic);
    }

    #[tokio::test]
    async fn specific_version_falls_back_to_tag_lookup() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_release_by_tag()
            .times(1)
            .returning(|_, _, _| Ok(None));
        provider
            .expect_tag_ref()
            .times(1)
            .returning(|_, _, _| {
                Ok(Some(TagRef {
                    object: RefObject {
                        sha: "bbb222".to_string(),
                    },
                }))
            });

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, Some("v0.4.0")).await;

        assert_eq!(info.resolution_source, ResolutionSource::TagsApi);
        assert_eq!(info.resolved_version, "v0.4.0");
        assert_eq!(info.commit_sha, Some("bbb222".to_string()));
    }

    #[tokio::test]
    async fn commit_sha_is_accepted_directly() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_release_by_tag()
            .returning(|_, _, _| Ok(None));
        provider.expect_tag_ref().returning(|_, _, _| Ok(None));

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver
            .resolve_version(&config, Some("0123456789abcdef0123456789abcdef01234567"))
            .await;

        assert_eq!(info.ref_type, RefType::Commit);
        assert_eq!(info.resolution_source, ResolutionSource::Direct);
        assert!(!info.is_semantic);
    }

    #[tokio::test]
    async fn known_branch_is_accepted_directly() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_release_by_tag()
            .returning(|_, _, _| Ok(None));
        provider.expect_tag_ref().returning(|_, _, _| Ok(None));

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, Some("develop")).await;

        assert_eq!(info.ref_type, RefType::Branch);
        assert_eq!(info.resolution_source, ResolutionSource::Direct);
        assert_eq!(info.resolved_version, "develop");
    }

    #[tokio::test]
    async fn unresolvable_version_degrades_to_main() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_release_by_tag()
            .returning(|_, _, _| Ok(None));
        provider.expect_tag_ref().returning(|_, _, _| Ok(None));

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, Some("not-a-real-ref")).await;

        assert_eq!(info, VersionInfo::fallback());
    }

    #[tokio::test]
    async fn provider_error_on_specific_lookup_still_tries_next_source() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_release_by_tag().returning(|_, _, _| {
            Err(ProviderError::Status {
                status: 500,
                url: "releases/tags".to_string(),
            })
        });
        provider
            .expect_tag_ref()
            .times(1)
            .returning(|_, _, _| {
                Ok(Some(TagRef {
                    object: RefObject {
                        sha: "ccc333".to_string(),
                    },
                }))
            });

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesWithFallback);
        let info = resolver.resolve_version(&config, Some("v2.0.0")).await;

        assert_eq!(info.resolution_source, ResolutionSource::TagsApi);
    }

    #[tokio::test]
    async fn fallback_results_are_not_cached() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_latest_release()
            .times(2)
            .returning(|_, _| {
                Err(ProviderError::Status {
                    status: 503,
                    url: "releases/latest".to_string(),
                })
            });

        let resolver = resolver_with(provider);
        let config = config_with_strategy(VersionStrategy::ReleasesOnly);

        // Both calls reach the provider: a hard failure leaves no entry behind
        assert_eq!(
            resolver.resolve_version(&config, None).await,
            VersionInfo::fallback()
        );
        assert_eq!(
            resolver.resolve_version(&config, None).await,
            VersionInfo::fallback()
        );
    }
}
