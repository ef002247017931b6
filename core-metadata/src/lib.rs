//! # Metadata & Lyrics Module
//!
//! Fetches everything about a track that does not live in the library:
//! lyrics, artist information, scrobbles and application updates.
//!
//! ## Overview
//!
//! This module handles:
//! - Lyrics from embedded tags, `.lrc`/`.srt` sidecars and lyrics sites
//! - Artist biography, picture and similar artists (Last.fm, Fanart.tv)
//! - Last.fm scrobbling with signed requests
//! - Release checks against GitHub
//!
//! Lookups that feed the UI never fail: a source that errors is logged and
//! the next one is tried, and the final fallback is an empty result.

pub mod artist_info;
pub mod error;
pub mod html;
pub mod lyrics;
pub mod providers;
pub mod scrobbling;
pub mod updates;

pub use artist_info::{
    ArtistImageGetter, ArtistInfoSource, ArtistInformation, ArtistInformationService,
    OnlineArtistImageGetter,
};
pub use error::{MetadataError, Result};
pub use lyrics::{LyricsGetter, LyricsModel, LyricsService, LyricsSourceType, TimedLine};
pub use scrobbling::{ScrobblingApi, ScrobblingService};
pub use updates::{UpdateService, Version};
