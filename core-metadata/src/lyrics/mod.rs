//! # Lyrics
//!
//! Resolves lyrics for a track from, in order: the audio file's tags, an
//! `.lrc` sidecar, an `.srt` sidecar and finally the web.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_metadata::lyrics::LyricsService;
//!
//! let service = LyricsService::new(file_system, http_client, settings);
//! let lyrics = service.get_lyrics(&track).await;
//!
//! if !lyrics.is_empty() {
//!     println!("{} ({})", lyrics.text, lyrics.source_name);
//! }
//! ```

pub mod lrc;
pub mod online;
pub mod scrapers;
pub mod service;
pub mod sources;
pub mod srt;

use crate::error::Result;
use async_trait::async_trait;
use core_library::TrackModel;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use online::{AzLyricsApi, ChartLyricsApi, OnlineLyricsApi, WebSearchLyricsApi};
pub use scrapers::LyricsScraper;
pub use service::LyricsService;
pub use sources::{EmbeddedLyricsGetter, LrcLyricsGetter, OnlineLyricsGetter, SrtLyricsGetter};

// =============================================================================
// Core Types
// =============================================================================

/// Where a piece of lyrics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LyricsSourceType {
    /// Nothing found
    #[default]
    None,
    /// Lyrics tag of the audio file
    Embedded,
    /// `.lrc` file next to the audio file
    Lrc,
    /// `.srt` file next to the audio file
    Srt,
    /// Downloaded from a lyrics site
    Online,
}

impl LyricsSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Embedded => "embedded",
            Self::Lrc => "lrc",
            Self::Srt => "srt",
            Self::Online => "online",
        }
    }
}

impl fmt::Display for LyricsSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of synchronized lyrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedLine {
    /// Offset from the start of the track
    pub time_ms: u64,
    pub text: String,
}

impl TimedLine {
    pub fn new(time_ms: u64, text: impl Into<String>) -> Self {
        Self {
            time_ms,
            text: text.into(),
        }
    }
}

/// Lyrics of one track
///
/// Values are never modified after construction. [`LyricsModel::empty`] is
/// the "not found" result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LyricsModel {
    /// Human readable origin, e.g. a file name or "AZLyrics"
    pub source_name: String,
    pub source_type: LyricsSourceType,
    /// Plain text without timestamps
    pub text: String,
    /// Per-line timestamps when the source had them
    pub timed_lines: Option<Vec<TimedLine>>,
}

impl LyricsModel {
    pub fn new(
        source_name: impl Into<String>,
        source_type: LyricsSourceType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_type,
            text: text.into(),
            timed_lines: None,
        }
    }

    pub fn with_timed_lines(mut self, timed_lines: Vec<TimedLine>) -> Self {
        self.timed_lines = (!timed_lines.is_empty()).then_some(timed_lines);
        self
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there is no text to show
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_synced(&self) -> bool {
        self.timed_lines.is_some()
    }
}

// =============================================================================
// Getter Trait
// =============================================================================

/// A single source of lyrics
///
/// Getters return `Ok(LyricsModel::empty())` when their source has nothing
/// for the track and `Err` only when the source itself failed.
#[async_trait]
pub trait LyricsGetter: Send + Sync {
    async fn get_lyrics(&self, track: &TrackModel) -> Result<LyricsModel>;

    fn source_type(&self) -> LyricsSourceType;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinel() {
        let empty = LyricsModel::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.source_type, LyricsSourceType::None);
        assert!(!empty.is_synced());

        let blank = LyricsModel::new("x.lrc", LyricsSourceType::Lrc, "  \n ");
        assert!(blank.is_empty());
    }

    #[test]
    fn test_with_timed_lines() {
        let plain = LyricsModel::new("AZLyrics", LyricsSourceType::Online, "la").with_timed_lines(vec![]);
        assert!(!plain.is_synced());

        let synced = LyricsModel::new("song.lrc", LyricsSourceType::Lrc, "la")
            .with_timed_lines(vec![TimedLine::new(1_000, "la")]);
        assert!(synced.is_synced());
    }

    #[test]
    fn test_source_type_serialization() {
        let json = serde_json::to_string(&LyricsSourceType::Srt).unwrap();
        assert_eq!(json, "\"srt\"");
        assert_eq!(LyricsSourceType::Embedded.to_string(), "embedded");
    }
}
