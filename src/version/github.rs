//! GitHub REST implementation of the metadata provider

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::version::error::ProviderError;
use crate::version::provider::{MetadataProvider, Release, TagEntry, TagRef};

/// Default base URL for the GitHub API
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Timeout applied to every metadata request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Metadata provider backed by the GitHub REST API.
///
/// Requests carry the `application/vnd.github+json` accept header and, when
/// a token is configured, a bearer authorization header. Unauthenticated
/// access works but is subject to much lower rate limits.
pub struct GitHubProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubProvider {
    /// Creates a provider against a custom base URL, mainly for tests.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("otel-repo-versions")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Creates a provider for api.github.com, reading `GITHUB_TOKEN` from
    /// the environment if set.
    pub fn from_env() -> Self {
        Self::new(DEFAULT_BASE_URL, std::env::var("GITHUB_TOKEN").ok())
    }

    /// Performs a GET and decodes the JSON body.
    ///
    /// A 404 is reported as `Ok(None)` so callers can treat it as a
    /// recoverable miss rather than an error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ProviderError> {
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub response from {}: {}", url, e);
            ProviderError::InvalidResponse(e.to_string())
        })?;

        Ok(Some(body))
    }
}

#[async_trait::async_trait]
impl MetadataProvider for GitHubProvider {
    async fn latest_release(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<Release>, ProviderError> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.base_url, owner, name);
        self.get_json(&url, &[]).await
    }

    async fn latest_tag(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<TagEntry>, ProviderError> {
        let url = format!("{}/repos/{}/{}/tags", self.base_url, owner, name);
        // The API returns tags most recent first; one page entry is enough.
        let tags: Option<Vec<TagEntry>> = self.get_json(&url, &[("per_page", "1")]).await?;
        Ok(tags.and_then(|mut tags| {
            if tags.is_empty() {
                None
            } else {
                Some(tags.remove(0))
            }
        }))
    }

    async fn release_by_tag(
        &self,
        owner: &str,
        name: &str,
        tag: &str,
    ) -> Result<Option<Release>, ProviderError> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.base_url, owner, name, tag
        );
        self.get_json(&url, &[]).await
    }

    async fn tag_ref(
        &self,
        owner: &str,
        name: &str,
        tag: &str,
    ) -> Result<Option<TagRef>, ProviderError> {
        let url = format!(
            "{}/repos/{}/{}/git/refs/tags/{}",
            self.base_url, owner, name, tag
        );
        self.get_json(&url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn latest_release_returns_release_with_commitish() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/open-telemetry/opentelemetry.io/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name": "v1.5.0", "target_commitish": "abc123"}"#)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let release = provider
            .latest_release("open-telemetry", "opentelemetry.io")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            release,
            Some(Release {
                tag_name: "v1.5.0".to_string(),
                target_commitish: Some("abc123".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn latest_release_treats_404_as_no_releases() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/releases/latest")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let release = provider.latest_release("some", "repo").await.unwrap();

        mock.assert_async().await;
        assert_eq!(release, None);
    }

    #[tokio::test]
    async fn latest_release_returns_error_for_server_failure() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/releases/latest")
            .with_status(500)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let result = provider.latest_release("some", "repo").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(ProviderError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn latest_release_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/releases/latest")
            .with_status(429)
            .with_header("retry-after", "60")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let result = provider.latest_release("some", "repo").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(ProviderError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn latest_tag_requests_single_page_entry() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/instrumentation-score/spec/tags")
            .match_query(Matcher::UrlEncoded("per_page".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name": "v1.0.0", "commit": {"sha": "def456"}}]"#)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let tag = provider
            .latest_tag("instrumentation-score", "spec")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tag.name, "v1.0.0");
        assert_eq!(tag.commit.sha, "def456");
    }

    #[tokio::test]
    async fn latest_tag_returns_none_for_empty_list() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/tags")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let tag = provider.latest_tag("some", "repo").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tag, None);
    }

    #[tokio::test]
    async fn release_by_tag_returns_none_on_miss() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/releases/tags/v9.9.9")
            .with_status(404)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let release = provider
            .release_by_tag("some", "repo", "v9.9.9")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(release, None);
    }

    #[tokio::test]
    async fn tag_ref_returns_object_sha() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/git/refs/tags/v1.2.3")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"object": {"sha": "0011223344556677"}}"#)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), None);
        let tag_ref = provider
            .tag_ref("some", "repo", "v1.2.3")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tag_ref.object.sha, "0011223344556677");
    }

    #[tokio::test]
    async fn authorization_header_is_sent_when_token_configured() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/releases/latest")
            .match_header("authorization", "Bearer secret-token")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name": "v1.0.0", "target_commitish": null}"#)
            .create_async()
            .await;

        let provider = GitHubProvider::new(&server.url(), Some("secret-token".to_string()));
        let release = provider.latest_release("some", "repo").await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.unwrap().tag_name, "v1.0.0");
    }
}
