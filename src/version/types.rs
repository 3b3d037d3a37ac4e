//! Common types for version resolution

use serde::{Deserialize, Serialize};

/// Strategy governing which remote endpoints a repository's version
/// resolution may consult, and in what fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStrategy {
    /// Only the releases API; no releases is a hard miss.
    ReleasesOnly,
    /// Only the tags API; no tags is a hard miss.
    TagsOnly,
    /// Releases first, then tags, then the default branch.
    ReleasesWithFallback,
    /// Tags first, then the default branch.
    TagsWithFallback,
}

impl VersionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStrategy::ReleasesOnly => "releases_only",
            VersionStrategy::TagsOnly => "tags_only",
            VersionStrategy::ReleasesWithFallback => "releases_with_fallback",
            VersionStrategy::TagsWithFallback => "tags_with_fallback",
        }
    }
}

/// Classification of a resolved version as a branch, tag, or commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    Branch,
    Tag,
    Commit,
}

impl RefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefType::Branch => "branch",
            RefType::Tag => "tag",
            RefType::Commit => "commit",
        }
    }
}

/// Provenance tag indicating which endpoint or path produced a resolved
/// version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    ReleasesApi,
    TagsApi,
    /// The requested string was accepted as-is (commit SHA or known branch).
    Direct,
    /// Resolution degraded to the default branch.
    Fallback,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::ReleasesApi => "releases_api",
            ResolutionSource::TagsApi => "tags_api",
            ResolutionSource::Direct => "direct",
            ResolutionSource::Fallback => "fallback",
        }
    }
}

/// Result of resolving a version request against a repository.
///
/// Immutable once constructed. When `resolution_source` is
/// [`ResolutionSource::Fallback`], `ref_type` is always
/// [`RefType::Branch`] and `resolved_version` is `"main"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Tag name, branch name, or commit SHA.
    pub resolved_version: String,
    pub ref_type: RefType,
    pub resolution_source: ResolutionSource,
    /// Whether `resolved_version` parses as semantic versioning.
    pub is_semantic: bool,
    pub commit_sha: Option<String>,
}

impl VersionInfo {
    /// The default-branch fallback returned when no endpoint could resolve
    /// the request.
    pub fn fallback() -> Self {
        Self {
            resolved_version: "main".to_string(),
            ref_type: RefType::Branch,
            resolution_source: ResolutionSource::Fallback,
            is_semantic: false,
            commit_sha: None,
        }
    }
}
