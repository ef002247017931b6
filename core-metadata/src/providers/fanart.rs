//! Fanart.tv API Client
//!
//! - **Artist images**: `GET https://webservice.fanart.tv/v3/music/{mbid}?api_key={key}`
//!
//! Artists are addressed by MusicBrainz id only.

use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_library::strings::truncate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const FANART_API_BASE: &str = "https://webservice.fanart.tv/v3/music";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct ArtistImages {
    #[serde(default, rename = "artistthumb")]
    artist_thumbs: Vec<FanartImage>,
}

#[derive(Debug, Deserialize)]
struct FanartImage {
    #[serde(default)]
    url: String,
}

pub struct FanartApi {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
}

impl FanartApi {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: FANART_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL of the first artist thumbnail
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` - Thumbnail found
    /// - `Ok(None)` - Unknown artist or no thumbnails
    /// - `Err` - Network failure or unexpected response
    pub async fn artist_thumbnail(&self, mbid: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/{}?api_key={}",
            self.base_url,
            urlencoding::encode(mbid),
            urlencoding::encode(&self.api_key)
        );

        debug!(mbid = %mbid, "Querying Fanart.tv");

        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);
        let response = self.http_client.execute(request).await?;

        if response.status == 404 {
            debug!(mbid = %mbid, "Artist not found on Fanart.tv");
            return Ok(None);
        }

        if !response.is_success() {
            return Err(MetadataError::HttpError {
                status: response.status,
                body: truncate(&response.text_lossy(), 200),
            });
        }

        let images: ArtistImages = serde_json::from_slice(&response.body)
            .map_err(|e| MetadataError::Parse(format!("Fanart.tv response: {}", e)))?;

        Ok(images
            .artist_thumbs
            .into_iter()
            .map(|image| image.url)
            .find(|url| !url.trim().is_empty()))
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
    async fn test_first_thumbnail() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.url.ends_with("/v3/music/mbid-1?api_key=key"))
            .returning(|_| {
                Ok(HttpResponse::new(
                    200,
                    r#"{"name":"Portishead","artistthumb":[{"id":"1","url":"https://assets.fanart.tv/a.jpg","likes":"3"},{"id":"2","url":"https://assets.fanart.tv/b.jpg"}]}"#,
                ))
            });

        let api = FanartApi::new(Arc::new(http), "key");
        assert_eq!(
            api.artist_thumbnail("mbid-1").await.unwrap().as_deref(),
            Some("https://assets.fanart.tv/a.jpg")
        );
    }

    #[tokio::test]
    async fn test_missing_thumbnails_and_unknown_artist() {
        let mut http = MockHttpClient::new();
        let mut calls = 0;
        http.expect_execute().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(HttpResponse::new(200, r#"{"name":"x","hdmusiclogo":[]}"#))
            } else {
                Ok(HttpResponse::new(404, r#"{"status":"error"}"#))
            }
        });

        let api = FanartApi::new(Arc::new(http), "key");
        assert!(api.artist_thumbnail("a").await.unwrap().is_none());
        assert!(api.artist_thumbnail("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(HttpResponse::new(500, "oops")));

        let api = FanartApi::new(Arc::new(http), "key");
        assert!(matches!(
            api.artist_thumbnail("a").await,
            Err(MetadataError::HttpError { status: 500, .. })
        ));
    }
}
