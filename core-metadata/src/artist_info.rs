//! # Artist Information
//!
//! Aggregates what the artist view shows: Last.fm biography and similar
//! artists, with pictures from Fanart.tv or Last.fm.
//!
//! ## Fallbacks
//!
//! - A blank localized biography is replaced by the English one
//! - A failed image lookup leaves `image_url` empty and keeps everything else
//! - A similar artist whose lookup fails is left out
//! - A failed primary lookup yields [`ArtistInformation::empty`]
//!
//! The last successful result is cached by artist name; asking for another
//! artist replaces it. A result emptied by a failed primary lookup is not
//! cached, so the next request tries again.

use crate::error::Result;
use crate::html::html_to_text;
use crate::providers::fanart::FanartApi;
use crate::providers::lastfm::{largest_image, LastfmApi, LastfmArtist, LastfmImage};
use async_trait::async_trait;
use bridge_traits::storage::SettingsStore;
use core_library::PreferencePersister;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Language of the fallback biography
pub const FALLBACK_LANGUAGE_CODE: &str = "EN";

static READ_MORE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<a\s[^>]*>\s*Read more on Last\.fm\s*</a>\.?").expect("valid link pattern")
});

static LICENSE_NOTICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)User-contributed text is available under the Creative Commons By-SA License;?\s*additional terms may apply\.?",
    )
    .expect("valid license pattern")
});

// =============================================================================
// Model
// =============================================================================

/// Artist details shown in the artist view
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArtistInformation {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub biography: String,
    /// One level deep; similar artists carry no biography
    pub similar_artists: Vec<ArtistInformation>,
}

impl ArtistInformation {
    /// The "nothing found" result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Removes markup and Last.fm boilerplate from a biography
pub fn clean_biography(raw: &str) -> String {
    let without_link = READ_MORE_LINK.replace_all(raw, "");
    let without_notice = LICENSE_NOTICE.replace_all(&without_link, "");
    html_to_text(&without_notice)
}

// =============================================================================
// Seams
// =============================================================================

/// Source of artist records, implemented by [`LastfmApi`]
#[async_trait]
pub trait ArtistInfoSource: Send + Sync {
    async fn artist_info(
        &self,
        artist_name: &str,
        autocorrect: bool,
        language_code: &str,
    ) -> Result<Option<LastfmArtist>>;
}

#[async_trait]
impl ArtistInfoSource for LastfmApi {
    async fn artist_info(
        &self,
        artist_name: &str,
        autocorrect: bool,
        language_code: &str,
    ) -> Result<Option<LastfmArtist>> {
        LastfmApi::artist_info(self, artist_name, autocorrect, language_code).await
    }
}

/// What an image lookup knows about the artist
#[derive(Debug, Clone, Copy)]
pub struct ArtistImageQuery<'a> {
    pub name: &'a str,
    pub mbid: Option<&'a str>,
    pub lastfm_images: &'a [LastfmImage],
}

impl<'a> ArtistImageQuery<'a> {
    pub fn from_lastfm(artist: &'a LastfmArtist) -> Self {
        Self {
            name: &artist.name,
            mbid: artist.mbid(),
            lastfm_images: &artist.image,
        }
    }
}

/// Finds a picture of an artist
#[async_trait]
pub trait ArtistImageGetter: Send + Sync {
    /// Image URL, empty when none was found
    async fn get_artist_image(&self, query: ArtistImageQuery<'_>) -> Result<String>;
}

/// Fanart.tv thumbnail when the MusicBrainz id is known, otherwise the
/// largest Last.fm image
pub struct OnlineArtistImageGetter {
    fanart: Option<FanartApi>,
}

impl OnlineArtistImageGetter {
    pub fn new(fanart: Option<FanartApi>) -> Self {
        Self { fanart }
    }
}

#[async_trait]
impl ArtistImageGetter for OnlineArtistImageGetter {
    async fn get_artist_image(&self, query: ArtistImageQuery<'_>) -> Result<String> {
        if let (Some(fanart), Some(mbid)) = (&self.fanart, query.mbid) {
            if let Some(url) = fanart.artist_thumbnail(mbid).await? {
                return Ok(url);
            }
            debug!(artist = %query.name, "No Fanart.tv thumbnail, using Last.fm image");
        }

        Ok(largest_image(query.lastfm_images)
            .unwrap_or_default()
            .to_string())
    }
}

// =============================================================================
// Service
// =============================================================================

pub struct ArtistInformationService {
    info_source: Arc<dyn ArtistInfoSource>,
    image_getter: Arc<dyn ArtistImageGetter>,
    preferences: PreferencePersister,
    language_code: String,
    cache: Mutex<Option<(String, ArtistInformation)>>,
}

impl ArtistInformationService {
    pub fn new(
        info_source: Arc<dyn ArtistInfoSource>,
        image_getter: Arc<dyn ArtistImageGetter>,
        settings: Arc<dyn SettingsStore>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            info_source,
            image_getter,
            preferences: PreferencePersister::new(settings),
            language_code: language_code.into(),
            cache: Mutex::new(None),
        }
    }

    /// Information about `artist_name`, never failing
    pub async fn get_artist_information(&self, artist_name: &str) -> ArtistInformation {
        if let Some((cached_name, cached)) = self.cache.lock().await.as_ref() {
            if cached_name == artist_name {
                debug!(artist = %artist_name, "Artist information cache hit");
                return cached.clone();
            }
        }

        let information = if artist_name.trim().is_empty() {
            ArtistInformation::empty()
        } else {
            match self.fetch(artist_name).await {
                Ok(information) => information,
                Err(e) => {
                    warn!(artist = %artist_name, error = %e, "Artist information lookup failed");
                    return ArtistInformation::empty();
                }
            }
        };

        *self.cache.lock().await = Some((artist_name.to_string(), information.clone()));
        information
    }

    /// Drops the cached result
    pub async fn clear_cache(&self) {
        *self.cache.lock().await = None;
    }

    async fn fetch(&self, artist_name: &str) -> Result<ArtistInformation> {
        let language_code = self.biography_language().await;

        let Some(artist) = self
            .info_source
            .artist_info(artist_name, true, &language_code)
            .await?
        else {
            info!(artist = %artist_name, "No artist information found");
            return Ok(ArtistInformation::empty());
        };

        let mut biography = clean_biography(artist.biography());
        if biography.is_empty() && !language_code.eq_ignore_ascii_case(FALLBACK_LANGUAGE_CODE) {
            biography = self.english_biography(artist_name).await;
        }

        let image_url = self.image_for(ArtistImageQuery::from_lastfm(&artist)).await;

        let mut similar_artists = Vec::new();
        for similar in artist.similar_artists() {
            if let Some(information) = self.similar_artist(&similar.name, &language_code).await {
                similar_artists.push(information);
            }
        }

        Ok(ArtistInformation {
            name: artist.name.clone(),
            url: artist.url.clone(),
            image_url,
            biography,
            similar_artists,
        })
    }

    async fn biography_language(&self) -> String {
        let localized = self
            .preferences
            .use_localized_biography()
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read biography preference, assuming localized");
                true
            });

        if localized {
            self.language_code.clone()
        } else {
            FALLBACK_LANGUAGE_CODE.to_string()
        }
    }

    async fn english_biography(&self, artist_name: &str) -> String {
        debug!(artist = %artist_name, "No localized biography, requesting English");

        match self
            .info_source
            .artist_info(artist_name, true, FALLBACK_LANGUAGE_CODE)
            .await
        {
            Ok(Some(artist)) => clean_biography(artist.biography()),
            Ok(None) => String::new(),
            Err(e) => {
                warn!(artist = %artist_name, error = %e, "English biography lookup failed");
                String::new()
            }
        }
    }

    async fn image_for(&self, query: ArtistImageQuery<'_>) -> String {
        match self.image_getter.get_artist_image(query).await {
            Ok(url) => url,
            Err(e) => {
                warn!(artist = %query.name, error = %e, "Artist image lookup failed");
                String::new()
            }
        }
    }

    async fn similar_artist(&self, name: &str, language_code: &str) -> Option<ArtistInformation> {
        let artist = match self.info_source.artist_info(name, false, language_code).await {
            Ok(Some(artist)) => artist,
            Ok(None) => {
                debug!(artist = %name, "Similar artist not found");
                return None;
            }
            Err(e) => {
                warn!(artist = %name, error = %e, "Similar artist lookup failed");
                return None;
            }
        };

        let image_url = match self
            .image_getter
            .get_artist_image(ArtistImageQuery::from_lastfm(&artist))
            .await
        {
            Ok(url) => url,
            Err(e) => {
                warn!(artist = %name, error = %e, "Similar artist image lookup failed");
                return None;
            }
        };

        Some(ArtistInformation {
            name: artist.name,
            url: artist.url,
            image_url,
            biography: String::new(),
            similar_artists: Vec::new(),
        })
    }
}
