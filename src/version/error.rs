use thiserror::Error;

/// Errors from the repository-metadata provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Internal errors produced while running the resolution state machine.
///
/// These never escape `resolve_version`; the top-level adapter converts any
/// of them into the default-branch fallback.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no releases found")]
    NoReleases,

    #[error("no tags found")]
    NoTags,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("could not resolve version: {0}")]
    UnresolvableVersion(String),
}
