//! # Last.fm Scrobbling
//!
//! Reports playback to Last.fm: "now playing" when a track starts, a
//! scrobble once enough of it was heard, and love/unlove.
//!
//! ## Scrobble rule
//!
//! A track is scrobbled once per playback when it is longer than 30 seconds
//! and at least half of it, or 4 minutes, has been played.
//!
//! Playback notifications are best-effort: failures are logged and never
//! reach the player.

use crate::error::{MetadataError, Result};
use crate::providers::lastfm::LastfmApi;
use async_trait::async_trait;
use bridge_traits::storage::SecureStore;
use bridge_traits::time::Clock;
use core_library::TrackModel;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Secure store key of the Last.fm session key
pub const SESSION_KEY_SECRET: &str = "lastfm_session_key";

/// Secure store key of the signed-in user name
pub const USERNAME_SECRET: &str = "lastfm_username";

/// Tracks this short are never scrobbled
pub const MIN_SCROBBLE_DURATION_MS: i64 = 30_000;

/// Playing this long always scrobbles, whatever the track length
pub const MAX_REQUIRED_PLAY_MS: i64 = 240_000;

const PROVIDER: &str = "Last.fm";

/// Whether a playback of `played_ms` out of `duration_ms` counts as a play
pub fn should_scrobble(duration_ms: i64, played_ms: i64) -> bool {
    duration_ms > MIN_SCROBBLE_DURATION_MS
        && (played_ms >= duration_ms / 2 || played_ms >= MAX_REQUIRED_PLAY_MS)
}

// =============================================================================
// Seam
// =============================================================================

/// Signed Last.fm methods used by the service, implemented by [`LastfmApi`]
#[async_trait]
pub trait ScrobblingApi: Send + Sync {
    async fn get_mobile_session(&self, username: &str, password: &str) -> Result<String>;

    async fn update_now_playing(
        &self,
        session_key: &str,
        artist: &str,
        track: &str,
        album: Option<&str>,
        duration_secs: Option<u64>,
    ) -> Result<()>;

    async fn scrobble(
        &self,
        session_key: &str,
        artist: &str,
        track: &str,
        album: Option<&str>,
        timestamp: i64,
    ) -> Result<()>;

    async fn love(&self, session_key: &str, artist: &str, track: &str) -> Result<()>;

    async fn unlove(&self, session_key: &str, artist: &str, track: &str) -> Result<()>;
}

#[async_trait]
impl ScrobblingApi for LastfmApi {
    async fn get_mobile_session(&self, username: &str, password: &str) -> Result<String> {
        LastfmApi::get_mobile_session(self, username, password).await
    }

    async fn update_now_playing(
        &self,
        session_key: &str,
        artist: &str,
        track: &str,
        album: Option<&str>,
        duration_secs: Option<u64>,
    ) -> Result<()> {
        LastfmApi::update_now_playing(self, session_key, artist, track, album, duration_secs).await
    }

    async fn scrobble(
        &self,
        session_key: &str,
        artist: &str,
        track: &str,
        album: Option<&str>,
        timestamp: i64,
    ) -> Result<()> {
        LastfmApi::scrobble(self, session_key, artist, track, album, timestamp).await
    }

    async fn love(&self, session_key: &str, artist: &str, track: &str) -> Result<()> {
        LastfmApi::love(self, session_key, artist, track).await
    }

    async fn unlove(&self, session_key: &str, artist: &str, track: &str) -> Result<()> {
        LastfmApi::unlove(self, session_key, artist, track).await
    }
}

// =============================================================================
// Service
// =============================================================================

/// The playback currently being tracked
#[derive(Debug, Clone)]
struct Playback {
    track_id: i64,
    path: String,
    started_at: i64,
    scrobbled: bool,
}

impl Playback {
    fn is_of(&self, track: &TrackModel) -> bool {
        self.track_id == track.track_id() && self.path == track.path()
    }
}

/// Artist, title and album of a track, if it can be reported at all
fn track_identity(track: &TrackModel) -> Option<(&str, &str, Option<&str>)> {
    let artist = track.first_artist()?;
    let title = track.raw_title()?;
    let album = track.track().album_title.as_deref();
    Some((artist, title, album))
}

pub struct ScrobblingService {
    api: Arc<dyn ScrobblingApi>,
    secure_store: Arc<dyn SecureStore>,
    clock: Arc<dyn Clock>,
    session_key: Mutex<Option<String>>,
    playback: Mutex<Option<Playback>>,
}

impl ScrobblingService {
    pub fn new(
        api: Arc<dyn ScrobblingApi>,
        secure_store: Arc<dyn SecureStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            secure_store,
            clock,
            session_key: Mutex::new(None),
            playback: Mutex::new(None),
        }
    }

    /// Signs in and remembers the session key
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<()> {
        let key = self.api.get_mobile_session(username, password).await?;

        self.secure_store
            .set_secret(SESSION_KEY_SECRET, key.as_bytes())
            .await?;
        self.secure_store
            .set_secret(USERNAME_SECRET, username.as_bytes())
            .await?;
        *self.session_key.lock().await = Some(key);

        info!(username = %username, "Signed in to Last.fm");
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<()> {
        *self.session_key.lock().await = None;
        self.secure_store.delete_secret(SESSION_KEY_SECRET).await?;
        self.secure_store.delete_secret(USERNAME_SECRET).await?;

        info!("Signed out of Last.fm");
        Ok(())
    }

    pub async fn is_signed_in(&self) -> bool {
        match self.session_key().await {
            Ok(key) => key.is_some(),
            Err(e) => {
                warn!(error = %e, "Could not read Last.fm session");
                false
            }
        }
    }

    /// Name of the signed-in user
    pub async fn username(&self) -> Result<Option<String>> {
        Ok(self.secure_store.get_secret_string(USERNAME_SECRET).await?)
    }

    /// Starts tracking a playback and sends "now playing"
    pub async fn on_playback_started(&self, track: &TrackModel) {
        *self.playback.lock().await = Some(Playback {
            track_id: track.track_id(),
            path: track.path().to_string(),
            started_at: self.clock.unix_timestamp(),
            scrobbled: false,
        });

        let Some((artist, title, album)) = track_identity(track) else {
            debug!(track_id = track.track_id(), "Track has no artist or title, not reporting");
            return;
        };
        let Some(session_key) = self.session_key_or_log().await else {
            return;
        };

        let duration_secs = u64::try_from(track.duration_ms() / 1_000).ok();
        if let Err(e) = self
            .api
            .update_now_playing(&session_key, artist, title, album, duration_secs)
            .await
        {
            warn!(track_id = track.track_id(), error = %e, "Could not update now playing");
        }
    }

    /// Scrobbles the current playback once it qualifies
    ///
    /// Returns true when this call submitted the scrobble.
    pub async fn on_playback_progress(&self, track: &TrackModel, played_ms: i64) -> bool {
        let mut playback = self.playback.lock().await;

        let started_at = match playback.as_mut() {
            Some(current) if current.is_of(track) => {
                if current.scrobbled || !should_scrobble(track.duration_ms(), played_ms) {
                    return false;
                }
                // One attempt per playback, successful or not
                current.scrobbled = true;
                current.started_at
            }
            _ => {
                debug!(track_id = track.track_id(), "Progress for a track that is not playing");
                return false;
            }
        };
        drop(playback);

        let Some((artist, title, album)) = track_identity(track) else {
            return false;
        };
        let Some(session_key) = self.session_key_or_log().await else {
            return false;
        };

        match self
            .api
            .scrobble(&session_key, artist, title, album, started_at)
            .await
        {
            Ok(()) => {
                info!(track_id = track.track_id(), "Scrobbled track");
                true
            }
            Err(e) => {
                warn!(track_id = track.track_id(), error = %e, "Scrobble failed");
                false
            }
        }
    }

    /// Loves or unloves a track on Last.fm
    pub async fn set_love(&self, track: &TrackModel, love: bool) -> Result<()> {
        let session_key = self
            .session_key()
            .await?
            .ok_or_else(|| MetadataError::NotSignedIn(PROVIDER.to_string()))?;

        let Some((artist, title, _)) = track_identity(track) else {
            debug!(track_id = track.track_id(), "Track has no artist or title, not sending love");
            return Ok(());
        };

        if love {
            self.api.love(&session_key, artist, title).await
        } else {
            self.api.unlove(&session_key, artist, title).await
        }
    }

    async fn session_key(&self) -> Result<Option<String>> {
        let mut cached = self.session_key.lock().await;
        if cached.is_none() {
            *cached = self
                .secure_store
                .get_secret_string(SESSION_KEY_SECRET)
                .await?
                .filter(|key| !key.is_empty());
        }
        Ok(cached.clone())
    }

    async fn session_key_or_log(&self) -> Option<String> {
        match self.session_key().await {
            Ok(Some(key)) => Some(key),
            Ok(None) => {
                debug!("Not signed in to Last.fm");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not read Last.fm session");
                None
            }
        }
    }
}
