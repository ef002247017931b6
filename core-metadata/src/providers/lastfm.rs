//! Last.fm API Client
//!
//! ## API Endpoints
//!
//! - **Artist Info**: `GET ?method=artist.getInfo&artist={name}&lang={lang}&autocorrect={0|1}&api_key={key}&format=json`
//! - **Signed methods** (`POST`, form encoded): `auth.getMobileSession`,
//!   `track.updateNowPlaying`, `track.scrobble`, `track.love`, `track.unlove`
//!
//! ## Request Signing
//!
//! Write methods carry an `api_sig`: the MD5 of every parameter as
//! `key + value`, sorted by key, followed by the shared secret. `format` and
//! `callback` are not signed.
//!
//! ## API Key Requirement
//!
//! Obtain a key and shared secret at: https://www.last.fm/api/account/create

use super::one_or_many;
use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_library::strings::truncate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Last.fm API base URL
const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Error code for an unknown artist or track
const ERROR_INVALID_PARAMETERS: i64 = 6;

/// Image sizes from smallest to largest
const IMAGE_SIZES: [&str; 6] = ["small", "medium", "large", "extralarge", "mega", ""];

// =============================================================================
// Public models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastfmImage {
    #[serde(rename = "#text", default)]
    pub url: String,
    #[serde(default)]
    pub size: String,
}

/// Largest non-empty image of a Last.fm image list
pub fn largest_image(images: &[LastfmImage]) -> Option<&str> {
    images
        .iter()
        .filter(|image| !image.url.trim().is_empty())
        .max_by_key(|image| {
            IMAGE_SIZES
                .iter()
                .position(|size| *size == image.size)
                .unwrap_or(0)
        })
        .map(|image| image.url.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LastfmBiography {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastfmSimilarArtist {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub image: Vec<LastfmImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
struct SimilarArtists {
    #[serde(default, deserialize_with = "one_or_many")]
    artist: Vec<LastfmSimilarArtist>,
}

/// Artist as returned by `artist.getInfo`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastfmArtist {
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// MusicBrainz id, often missing for small artists
    #[serde(default)]
    pub mbid: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub image: Vec<LastfmImage>,
    #[serde(default)]
    pub bio: Option<LastfmBiography>,
    #[serde(default)]
    similar: Option<SimilarArtists>,
}

impl LastfmArtist {
    pub fn mbid(&self) -> Option<&str> {
        self.mbid.as_deref().filter(|mbid| !mbid.trim().is_empty())
    }

    /// Full biography, falling back to the summary
    pub fn biography(&self) -> &str {
        match &self.bio {
            Some(bio) if !bio.content.trim().is_empty() => &bio.content,
            Some(bio) => &bio.summary,
            None => "",
        }
    }

    pub fn similar_artists(&self) -> &[LastfmSimilarArtist] {
        self.similar
            .as_ref()
            .map(|similar| similar.artist.as_slice())
            .unwrap_or_default()
    }

    pub fn largest_image(&self) -> Option<&str> {
        largest_image(&self.image)
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiError {
    error: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ArtistInfoResponse {
    artist: Option<LastfmArtist>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: Session,
}

#[derive(Debug, Deserialize)]
struct Session {
    key: String,
}

// =============================================================================
// Client
// =============================================================================

/// Last.fm API client
pub struct LastfmApi {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    shared_secret: Option<String>,
    user_agent: Option<String>,
    base_url: String,
}

impl LastfmApi {
    /// Creates a client for read-only methods
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            shared_secret: None,
            user_agent: None,
            base_url: LASTFM_API_BASE.to_string(),
        }
    }

    /// Enables signed methods
    pub fn with_shared_secret(mut self, shared_secret: impl Into<String>) -> Self {
        self.shared_secret = Some(shared_secret.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Points the client at another endpoint, e.g. a local test server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn can_sign(&self) -> bool {
        self.shared_secret.is_some()
    }

    /// Fetches artist information
    ///
    /// # Returns
    ///
    /// - `Ok(Some(artist))` - Artist found
    /// - `Ok(None)` - Last.fm does not know the artist
    /// - `Err` - Network failure or API error
    pub async fn artist_info(
        &self,
        artist_name: &str,
        autocorrect: bool,
        language_code: &str,
    ) -> Result<Option<LastfmArtist>> {
        let url = format!(
            "{}?method=artist.getInfo&artist={}&lang={}&autocorrect={}&api_key={}&format=json",
            self.base_url,
            urlencoding::encode(artist_name),
            urlencoding::encode(&language_code.to_ascii_lowercase()),
            u8::from(autocorrect),
            urlencoding::encode(&self.api_key)
        );

        debug!(artist = %artist_name, lang = %language_code, "Querying Last.fm: artist.getInfo");

        let request = self.request(HttpRequest::get(url));
        let response = self.http_client.execute(request).await?;

        match check_response(&response) {
            Err(MetadataError::RemoteApi { code, .. }) if code == ERROR_INVALID_PARAMETERS => {
                debug!(artist = %artist_name, "Artist not found on Last.fm");
                return Ok(None);
            }
            other => other?,
        }

        let parsed: ArtistInfoResponse = serde_json::from_slice(&response.body)
            .map_err(|e| MetadataError::Parse(format!("Last.fm artist.getInfo: {}", e)))?;

        Ok(parsed.artist)
    }

    /// Exchanges user credentials for a session key
    pub async fn get_mobile_session(&self, username: &str, password: &str) -> Result<String> {
        let body = self
            .signed_call(
                "auth.getMobileSession",
                vec![("username", username.to_string()), ("password", password.to_string())],
            )
            .await?;

        let parsed: SessionResponse = serde_json::from_slice(&body)
            .map_err(|e| MetadataError::Parse(format!("Last.fm auth.getMobileSession: {}", e)))?;

        Ok(parsed.session.key)
    }

    pub async fn update_now_playing(
        &self,
        session_key: &str,
        artist: &str,
        track: &str,
        album: Option<&str>,
        duration_secs: Option<u64>,
    ) -> Result<()> {
        let mut params = track_params(session_key, artist, track, album);
        if let Some(duration) = duration_secs.filter(|d| *d > 0) {
            params.push(("duration", duration.to_string()));
        }

        self.signed_call("track.updateNowPlaying", params).await?;
        Ok(())
    }

    /// Submits a play that started at `timestamp` (Unix seconds)
    pub async fn scrobble(
        &self,
        session_key: &str,
        artist: &str,
        track: &str,
        album: Option<&str>,
        timestamp: i64,
    ) -> Result<()> {
        let mut params = track_params(session_key, artist, track, album);
        params.push(("timestamp", timestamp.to_string()));

        self.signed_call("track.scrobble", params).await?;
        Ok(())
    }

    pub async fn love(&self, session_key: &str, artist: &str, track: &str) -> Result<()> {
        let params = track_params(session_key, artist, track, None);
        self.signed_call("track.love", params).await?;
        Ok(())
    }

    pub async fn unlove(&self, session_key: &str, artist: &str, track: &str) -> Result<()> {
        let params = track_params(session_key, artist, track, None);
        self.signed_call("track.unlove", params).await?;
        Ok(())
    }

    /// Signs and POSTs a write method, returning the raw JSON body
    async fn signed_call(
        &self,
        method: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<Vec<u8>> {
        let secret = self
            .shared_secret
            .as_deref()
            .ok_or_else(|| MetadataError::MissingConfig("Last.fm shared secret".to_string()))?;

        params.push(("method", method.to_string()));
        params.push(("api_key", self.api_key.clone()));
        let signature = sign(&params, secret);
        params.push(("api_sig", signature));
        params.push(("format", "json".to_string()));

        debug!(method = %method, "Calling signed Last.fm method");

        let request = self.request(HttpRequest::post(self.base_url.clone()).form(&params));
        let response = self.http_client.execute(request).await?;
        check_response(&response)?;

        Ok(response.body.to_vec())
    }

    fn request(&self, request: HttpRequest) -> HttpRequest {
        let request = request
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        match &self.user_agent {
            Some(user_agent) => request.header("User-Agent", user_agent.clone()),
            None => request,
        }
    }
}

fn track_params(
    session_key: &str,
    artist: &str,
    track: &str,
    album: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("sk", session_key.to_string()),
        ("artist", artist.to_string()),
        ("track", track.to_string()),
    ];
    if let Some(album) = album.filter(|a| !a.trim().is_empty()) {
        params.push(("album", album.to_string()));
    }
    params
}

/// Computes `api_sig` for a parameter list
pub fn sign<K: AsRef<str>, V: AsRef<str>>(params: &[(K, V)], shared_secret: &str) -> String {
    let mut signed: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .filter(|(k, _)| *k != "format" && *k != "callback")
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let mut input = String::new();
    for (key, value) in signed {
        input.push_str(key);
        input.push_str(value);
    }
    input.push_str(shared_secret);

    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Maps Last.fm error payloads and HTTP failures to errors
///
/// Last.fm reports errors in the body, sometimes with a 200 status.
fn check_response(response: &HttpResponse) -> Result<()> {
    if let Ok(error) = serde_json::from_slice::<ApiError>(&response.body) {
        return Err(MetadataError::RemoteApi {
            provider: "Last.fm".to_string(),
            code: error.error,
            message: error.message,
        });
    }

    if !response.is_success() {
        return Err(MetadataError::HttpError {
            status: response.status,
            body: truncate(&response.text_lossy(), 200),
        });
    }

    Ok(())
}
