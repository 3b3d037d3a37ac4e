//! Classification helpers for version strings and git refs

use std::sync::LazyLock;

use regex::Regex;

/// Branch names that may be requested directly without a lookup.
pub const KNOWN_BRANCHES: &[&str] = &["main", "master", "develop", "dev"];

/// `v1.2.3`, `1.2.3-rc.1`, `1.2.3+build5` and friends.
static SEMANTIC_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)(-[\w.-]+)?(\+[\w.-]+)?$").unwrap()
});

/// 7 to 40 characters of lowercase hex.
static COMMIT_SHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{7,40}$").unwrap());

/// Returns true if the string follows semantic versioning, with or without
/// a leading `v`.
pub fn is_semantic_version(version: &str) -> bool {
    SEMANTIC_VERSION_RE.is_match(version)
}

/// Returns true if the string looks like an abbreviated or full commit SHA.
pub fn is_commit_sha(reference: &str) -> bool {
    COMMIT_SHA_RE.is_match(&reference.to_lowercase())
}

/// Basic validity check for a git reference name.
pub fn is_valid_ref(reference: &str) -> bool {
    if reference.is_empty() || reference.len() > 250 {
        return false;
    }
    const INVALID_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];
    !reference.contains(INVALID_CHARS)
}
