//! Lyrics resolution across all sources

use super::sources::{EmbeddedLyricsGetter, LrcLyricsGetter, OnlineLyricsGetter, SrtLyricsGetter};
use super::{LyricsGetter, LyricsModel};
use bridge_traits::http::HttpClient;
use bridge_traits::storage::{FileSystemAccess, SettingsStore};
use core_library::{PreferencePersister, TrackModel};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Finds the lyrics of a track
///
/// Sources are tried in a fixed order: embedded tag, `.lrc` sidecar, `.srt`
/// sidecar, then the web when the `download_lyrics_online` preference
/// allows it. The first source with non-empty text wins. A failing source is
/// logged and skipped, so [`LyricsService::get_lyrics`] never fails.
pub struct LyricsService {
    local_getters: Vec<Box<dyn LyricsGetter>>,
    online_getter: Option<Box<dyn LyricsGetter>>,
    preferences: PreferencePersister,
}

impl LyricsService {
    /// Creates the service with every built-in source
    ///
    /// Without an HTTP client only local sources are used.
    pub fn new(
        file_system: Arc<dyn FileSystemAccess>,
        http_client: Option<Arc<dyn HttpClient>>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let local_getters: Vec<Box<dyn LyricsGetter>> = vec![
            Box::new(EmbeddedLyricsGetter::new(file_system.clone())),
            Box::new(LrcLyricsGetter::new(file_system.clone())),
            Box::new(SrtLyricsGetter::new(file_system)),
        ];
        let online_getter = http_client
            .map(|http| Box::new(OnlineLyricsGetter::new(http)) as Box<dyn LyricsGetter>);

        Self::with_getters(local_getters, online_getter, settings)
    }

    pub fn with_getters(
        local_getters: Vec<Box<dyn LyricsGetter>>,
        online_getter: Option<Box<dyn LyricsGetter>>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            local_getters,
            online_getter,
            preferences: PreferencePersister::new(settings),
        }
    }

    pub fn has_online_source(&self) -> bool {
        self.online_getter.is_some()
    }

    pub async fn get_lyrics(&self, track: &TrackModel) -> LyricsModel {
        for getter in &self.local_getters {
            if let Some(lyrics) = Self::try_getter(getter.as_ref(), track).await {
                return lyrics;
            }
        }

        if let Some(online) = &self.online_getter {
            if self.download_online_allowed().await {
                if let Some(lyrics) = Self::try_getter(online.as_ref(), track).await {
                    return lyrics;
                }
            } else {
                debug!(track_id = track.track_id(), "Online lyrics disabled by preference");
            }
        }

        info!(track_id = track.track_id(), "No lyrics found");
        LyricsModel::empty()
    }

    async fn try_getter(getter: &dyn LyricsGetter, track: &TrackModel) -> Option<LyricsModel> {
        match getter.get_lyrics(track).await {
            Ok(lyrics) if !lyrics.is_empty() => {
                debug!(
                    track_id = track.track_id(),
                    source = %getter.source_type(),
                    source_name = %lyrics.source_name,
                    "Found lyrics"
                );
                Some(lyrics)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(
                    track_id = track.track_id(),
                    source = %getter.source_type(),
                    error = %e,
                    "Lyrics source failed"
                );
                None
            }
        }
    }

    async fn download_online_allowed(&self) -> bool {
        self.preferences
            .download_lyrics_online()
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read online lyrics preference, assuming enabled");
                true
            })
    }
}
