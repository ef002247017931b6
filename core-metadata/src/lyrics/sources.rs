//! Lyrics getters, one per source kind

use super::online::{AzLyricsApi, ChartLyricsApi, OnlineLyricsApi, WebSearchLyricsApi};
use super::{lrc, srt, LyricsGetter, LyricsModel, LyricsSourceType};
use crate::error::{MetadataError, Result};
use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use bridge_traits::storage::FileSystemAccess;
use core_library::TrackModel;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds lyrics from text that may or may not carry LRC timestamps
fn lyrics_from_text(source_name: &str, source_type: LyricsSourceType, raw: &str) -> LyricsModel {
    if lrc::has_timestamps(raw) {
        LyricsModel::new(source_name, source_type, lrc::strip_timestamps(raw))
            .with_timed_lines(lrc::parse(raw))
    } else {
        LyricsModel::new(source_name, source_type, raw.trim())
    }
}

// =============================================================================
// Embedded
// =============================================================================

/// Reads the lyrics tag of the audio file
pub struct EmbeddedLyricsGetter {
    file_system: Arc<dyn FileSystemAccess>,
}

impl EmbeddedLyricsGetter {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl LyricsGetter for EmbeddedLyricsGetter {
    async fn get_lyrics(&self, track: &TrackModel) -> Result<LyricsModel> {
        let path = Path::new(track.path());
        let data = self.file_system.read_file(path).await?;

        let tagged_file = Probe::new(Cursor::new(data.as_ref()))
            .guess_file_type()
            .map_err(|e| MetadataError::TagRead(format!("Failed to read tags: {}", e)))?
            .read()
            .map_err(|e| MetadataError::TagRead(format!("Failed to parse file: {}", e)))?;

        let lyrics = tagged_file
            .primary_tag()
            .and_then(|tag| tag.get_string(&ItemKey::Lyrics))
            .or_else(|| {
                tagged_file
                    .tags()
                    .iter()
                    .find_map(|tag| tag.get_string(&ItemKey::Lyrics))
            });

        match lyrics {
            Some(text) => Ok(lyrics_from_text(
                track.file_name(),
                LyricsSourceType::Embedded,
                text,
            )),
            None => Ok(LyricsModel::empty()),
        }
    }

    fn source_type(&self) -> LyricsSourceType {
        LyricsSourceType::Embedded
    }
}

// =============================================================================
// Sidecar files
// =============================================================================

fn sidecar_path(track: &TrackModel, extension: &str) -> PathBuf {
    Path::new(track.path()).with_extension(extension)
}

fn sidecar_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads a sidecar next to the audio file, `None` when there is none
async fn read_sidecar(fs: &dyn FileSystemAccess, path: &Path) -> Result<Option<String>> {
    if !fs.exists(path).await? {
        debug!(path = %path.display(), "No sidecar file");
        return Ok(None);
    }

    Ok(Some(fs.read_to_string(path).await?))
}

/// Reads `<stem>.lrc` next to the audio file
pub struct LrcLyricsGetter {
    file_system: Arc<dyn FileSystemAccess>,
}

impl LrcLyricsGetter {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl LyricsGetter for LrcLyricsGetter {
    async fn get_lyrics(&self, track: &TrackModel) -> Result<LyricsModel> {
        let path = sidecar_path(track, "lrc");
        let Some(content) = read_sidecar(self.file_system.as_ref(), &path).await? else {
            return Ok(LyricsModel::empty());
        };

        Ok(
            LyricsModel::new(
                sidecar_name(&path),
                LyricsSourceType::Lrc,
                lrc::strip_timestamps(&content),
            )
            .with_timed_lines(lrc::parse(&content)),
        )
    }

    fn source_type(&self) -> LyricsSourceType {
        LyricsSourceType::Lrc
    }
}

/// Reads `<stem>.srt` next to the audio file
pub struct SrtLyricsGetter {
    file_system: Arc<dyn FileSystemAccess>,
}

impl SrtLyricsGetter {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl LyricsGetter for SrtLyricsGetter {
    async fn get_lyrics(&self, track: &TrackModel) -> Result<LyricsModel> {
        let path = sidecar_path(track, "srt");
        let Some(content) = read_sidecar(self.file_system.as_ref(), &path).await? else {
            return Ok(LyricsModel::empty());
        };

        Ok(
            LyricsModel::new(sidecar_name(&path), LyricsSourceType::Srt, srt::to_text(&content))
                .with_timed_lines(srt::parse(&content)),
        )
    }

    fn source_type(&self) -> LyricsSourceType {
        LyricsSourceType::Srt
    }
}

// =============================================================================
// Online
// =============================================================================

/// Asks lyrics sites in order until one has the song
pub struct OnlineLyricsGetter {
    apis: Vec<Box<dyn OnlineLyricsApi>>,
}

impl OnlineLyricsGetter {
    /// AZLyrics, then ChartLyrics, then a web search
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_apis(vec![
            Box::new(AzLyricsApi::new(http_client.clone())),
            Box::new(ChartLyricsApi::new(http_client.clone())),
            Box::new(WebSearchLyricsApi::new(http_client)),
        ])
    }

    pub fn with_apis(apis: Vec<Box<dyn OnlineLyricsApi>>) -> Self {
        Self { apis }
    }
}

#[async_trait]
impl LyricsGetter for OnlineLyricsGetter {
    async fn get_lyrics(&self, track: &TrackModel) -> Result<LyricsModel> {
        let (Some(artist), Some(title)) = (track.first_artist(), track.raw_title()) else {
            debug!(track_id = track.track_id(), "Track has no artist or title, skipping online lyrics");
            return Ok(LyricsModel::empty());
        };

        for api in &self.apis {
            match api.get_lyrics(artist, title).await {
                Ok(lyrics) if !lyrics.is_empty() => {
                    debug!(source = api.source_name(), "Found online lyrics");
                    return Ok(lyrics);
                }
                Ok(_) => {
                    debug!(source = api.source_name(), "Lyrics not found at source");
                }
                Err(e) => {
                    warn!(source = api.source_name(), error = %e, "Online lyrics source failed");
                }
            }
        }

        Ok(LyricsModel::empty())
    }

    fn source_type(&self) -> LyricsSourceType {
        LyricsSourceType::Online
    }
}
