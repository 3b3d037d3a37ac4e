//! Repository-metadata provider trait
//!
//! Abstracts the remote source-control host so the resolver can be tested
//! against a mock and pointed at alternative API endpoints.

#[cfg(test)]
use mockall::automock;

use serde::Deserialize;

use crate::version::error::ProviderError;

/// A published release as returned by the releases endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub target_commitish: Option<String>,
}

/// A tag entry from the tags list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagEntry {
    pub name: String,
    pub commit: TagCommit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagCommit {
    pub sha: String,
}

/// A git ref object from the refs endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagRef {
    pub object: RefObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefObject {
    pub sha: String,
}

/// Trait for looking up release and tag metadata for a repository.
///
/// All lookups distinguish a recoverable miss (`Ok(None)`: no releases, no
/// tags, or an unknown name) from a hard failure (`Err`: network error,
/// unexpected status, malformed body). The resolver relies on that split to
/// drive its strategy fallthrough.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetches the latest published release, or `Ok(None)` when the
    /// repository has no releases.
    async fn latest_release(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<Release>, ProviderError>;

    /// Fetches the most recent tag, or `Ok(None)` when the repository has
    /// no tags.
    async fn latest_tag(&self, owner: &str, name: &str)
    -> Result<Option<TagEntry>, ProviderError>;

    /// Fetches the release matching an exact tag name, or `Ok(None)` on a
    /// miss.
    async fn release_by_tag(
        &self,
        owner: &str,
        name: &str,
        tag: &str,
    ) -> Result<Option<Release>, ProviderError>;

    /// Fetches the git ref for an exact tag name, or `Ok(None)` on a miss.
    async fn tag_ref(
        &self,
        owner: &str,
        name: &str,
        tag: &str,
    ) -> Result<Option<TagRef>, ProviderError>;
}
