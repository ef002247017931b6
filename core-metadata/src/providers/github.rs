//! GitHub Releases API Client
//!
//! - **Latest release**: `GET https://api.github.com/repos/{owner}/{repo}/releases/latest`
//!
//! The endpoint ignores drafts and pre-releases. GitHub rejects requests
//! without a `User-Agent`.

use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_library::strings::truncate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const GITHUB_API_BASE: &str = "https://api.github.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const DEFAULT_USER_AGENT: &str = "player-core";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<String>,
}

pub struct GitHubReleases {
    http_client: Arc<dyn HttpClient>,
    user_agent: String,
    base_url: String,
}

impl GitHubReleases {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: GITHUB_API_BASE.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Latest published release, `None` when the repository has none
    pub async fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<GitHubRelease>> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );

        debug!(owner = %owner, repo = %repo, "Querying latest GitHub release");

        let request = HttpRequest::get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", self.user_agent.clone())
            .timeout(REQUEST_TIMEOUT);
        let response = self.http_client.execute(request).await?;

        if response.status == 404 {
            return Ok(None);
        }

        if !response.is_success() {
            return Err(MetadataError::HttpError {
                status: response.status,
                body: truncate(&response.text_lossy(), 200),
            });
        }

        let release = response
            .json()
            .map_err(|e| MetadataError::Parse(format!("GitHub release: {}", e)))?;
        Ok(Some(release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::HttpResponse;
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    #[tokio::test]
    async fn test_latest_release() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url == "https://api.github.com/repos/owner/player/releases/latest"
                    && req.headers.contains_key("User-Agent")
            })
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"tag_name":"v2.4.0","name":"2.4.0","html_url":"https://github.com/owner/player/releases/tag/v2.4.0","prerelease":false,"draft":false}"#,
                ))
            });

        let releases = GitHubReleases::new(Arc::new(http));
        let release = releases.latest_release("owner", "player").await.unwrap().unwrap();
        assert_eq!(release.tag_name, "v2.4.0");
        assert!(!release.prerelease);
    }

    #[tokio::test]
    async fn test_no_release() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(HttpResponse::new(404, r#"{"message":"Not Found"}"#)));

        let releases = GitHubReleases::new(Arc::new(http));
        assert!(releases.latest_release("owner", "player").await.unwrap().is_none());
    }
}
