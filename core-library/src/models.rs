//! Domain models for the music library
//!
//! `Track` is the persisted entity as the library indexer stores it.
//! `TrackModel` wraps it with display and sortable fields for the UI, and
//! `TrackModels` is the ordered list shown in a tracks view together with its
//! running totals.

use crate::delimiter::from_delimited_string;
use crate::strings::{get_sortable_string, is_null_or_white_space};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Track
// =============================================================================

/// Music track as stored by the library indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Track {
    /// Unique identifier
    pub track_id: i64,
    /// Absolute path of the audio file
    pub path: String,
    /// File name including extension
    pub file_name: String,

    // Tags
    /// Track title
    pub title: Option<String>,
    /// Track artists, delimited (`;a;;b;`)
    pub artists: Option<String>,
    /// Genres, delimited
    pub genres: Option<String>,
    /// Album title
    pub album_title: Option<String>,
    /// Album artists, delimited
    pub album_artists: Option<String>,
    /// Track position on album
    pub track_number: Option<u32>,
    /// Disc number for multi-disc albums
    pub disc_number: Option<u32>,
    /// Release year
    pub year: Option<i32>,

    // File properties
    /// Duration in milliseconds
    pub duration_ms: i64,
    /// File size in bytes
    pub file_size_bytes: i64,

    // Usage
    /// Rating from 0 (unrated) to 5
    pub rating: u8,
    /// Loved on this device (and on Last.fm when scrobbling)
    pub love: bool,
    pub play_count: u32,
    pub skip_count: u32,

    // Timestamps (Unix milliseconds)
    /// When the indexer first saw the file
    pub date_added: i64,
    /// File creation time on disk
    pub date_file_created: i64,
    pub date_last_played: Option<i64>,
}

impl Track {
    /// Creates a track for an audio file, deriving the file name from the path
    pub fn new(track_id: i64, path: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = file_name_of(&path);
        Self {
            track_id,
            path,
            file_name,
            ..Self::default()
        }
    }

    /// Validate track data
    pub fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("Track path cannot be empty".to_string());
        }

        if self.duration_ms < 0 {
            return Err("Track duration cannot be negative".to_string());
        }

        if self.file_size_bytes < 0 {
            return Err("Track file size cannot be negative".to_string());
        }

        if self.rating > 5 {
            return Err("Track rating must be between 0 and 5".to_string());
        }

        Ok(())
    }
}

fn file_name_of(path: &str) -> String {
    // Library paths may come from another OS
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

// =============================================================================
// TrackModel
// =============================================================================

/// A track prepared for display and ordering
///
/// Sortable fields are computed once at construction: lowercased, without
/// accents, and for artist names without a leading "the "/"a ".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackModel {
    track: Track,
    title: String,
    artists: Vec<String>,
    genres: Vec<String>,
    album_artists: Vec<String>,
    sortable_title: String,
    sortable_album_title: String,
    sortable_album_artist: String,
    sortable_file_name: String,
    /// Set while this track is the one being played
    pub is_playing: bool,
    /// Set while the track is selected in a list
    pub is_selected: bool,
}

impl TrackModel {
    pub fn new(track: Track) -> Self {
        let title = match track.title.as_deref() {
            Some(title) if !is_null_or_white_space(Some(title)) => title.trim().to_string(),
            _ => file_stem(&track.file_name),
        };

        let artists = decode(track.artists.as_deref());
        let genres = decode(track.genres.as_deref());
        let album_artists = decode(track.album_artists.as_deref());

        let album_artist = album_artists
            .first()
            .or_else(|| artists.first())
            .map(String::as_str)
            .unwrap_or_default();

        Self {
            sortable_title: get_sortable_string(&title, false),
            sortable_album_title: get_sortable_string(
                track.album_title.as_deref().unwrap_or_default(),
                false,
            ),
            sortable_album_artist: get_sortable_string(album_artist, true),
            sortable_file_name: get_sortable_string(&track.file_name, false),
            title,
            artists,
            genres,
            album_artists,
            track,
            is_playing: false,
            is_selected: false,
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn into_track(self) -> Track {
        self.track
    }

    pub fn track_id(&self) -> i64 {
        self.track.track_id
    }

    pub fn path(&self) -> &str {
        &self.track.path
    }

    pub fn file_name(&self) -> &str {
        &self.track.file_name
    }

    /// Title tag, or the file name without extension when the tag is blank
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw title tag, `None` when blank
    pub fn raw_title(&self) -> Option<&str> {
        self.track
            .title
            .as_deref()
            .filter(|title| !is_null_or_white_space(Some(title)))
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    /// Artists joined for display, e.g. "Massive Attack, Tricky"
    pub fn artists_text(&self) -> String {
        self.artists.join(", ")
    }

    /// First track artist, used for lyrics and artist lookups
    pub fn first_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn album_artists(&self) -> &[String] {
        &self.album_artists
    }

    pub fn album_title(&self) -> &str {
        self.track.album_title.as_deref().unwrap_or_default().trim()
    }

    pub fn track_number(&self) -> u32 {
        self.track.track_number.unwrap_or(0)
    }

    pub fn disc_number(&self) -> u32 {
        self.track.disc_number.unwrap_or(0)
    }

    pub fn year(&self) -> Option<i32> {
        self.track.year.filter(|year| *year > 0)
    }

    pub fn duration_ms(&self) -> i64 {
        self.track.duration_ms
    }

    pub fn file_size_bytes(&self) -> i64 {
        self.track.file_size_bytes
    }

    pub fn rating(&self) -> u8 {
        self.track.rating
    }

    pub fn love(&self) -> bool {
        self.track.love
    }

    pub fn date_added(&self) -> i64 {
        self.track.date_added
    }

    pub fn date_file_created(&self) -> i64 {
        self.track.date_file_created
    }

    pub fn sortable_title(&self) -> &str {
        &self.sortable_title
    }

    pub fn sortable_album_title(&self) -> &str {
        &self.sortable_album_title
    }

    pub fn sortable_album_artist(&self) -> &str {
        &self.sortable_album_artist
    }

    pub fn sortable_file_name(&self) -> &str {
        &self.sortable_file_name
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.track.rating = rating.min(5);
    }

    pub fn set_love(&mut self, love: bool) {
        self.track.love = love;
    }
}

impl From<Track> for TrackModel {
    fn from(track: Track) -> Self {
        Self::new(track)
    }
}

fn decode(value: Option<&str>) -> Vec<String> {
    value.map(from_delimited_string).unwrap_or_default()
}

fn file_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

// =============================================================================
// TrackModels
// =============================================================================

/// Ordered track list with running totals
///
/// Totals are adjusted on every add and remove instead of being recomputed
/// from the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackModels {
    tracks: Vec<TrackModel>,
    total_duration_ms: i64,
    total_file_size_bytes: i64,
}

impl TrackModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_track(&mut self, track: TrackModel) {
        self.total_duration_ms += track.duration_ms();
        self.total_file_size_bytes += track.file_size_bytes();
        self.tracks.push(track);
    }

    /// Removes the first track with the given id
    pub fn remove_track(&mut self, track_id: i64) -> Option<TrackModel> {
        let index = self.tracks.iter().position(|t| t.track_id() == track_id)?;
        let removed = self.tracks.remove(index);
        self.total_duration_ms -= removed.duration_ms();
        self.total_file_size_bytes -= removed.file_size_bytes();
        Some(removed)
    }

    pub fn tracks(&self) -> &[TrackModel] {
        &self.tracks
    }

    pub fn total_duration_ms(&self) -> i64 {
        self.total_duration_ms
    }

    pub fn total_file_size_bytes(&self) -> i64 {
        self.total_file_size_bytes
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl FromIterator<TrackModel> for TrackModels {
    fn from_iter<I: IntoIterator<Item = TrackModel>>(iter: I) -> Self {
        let mut models = Self::new();
        for track in iter {
            models.add_track(track);
        }
        models
    }
}

// =============================================================================
// Playlists
// =============================================================================

/// Playlist file shown in the playlists view
///
/// The default playlist is a sentinel with an empty name; it stands for
/// "no playlist selected".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlaylistModel {
    pub name: String,
    pub path: String,
    pub image_path: Option<String>,
    pub is_selected: bool,
}

impl PlaylistModel {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            image_path: None,
            is_selected: false,
        }
    }

    pub fn with_image_path(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    pub fn default_playlist() -> Self {
        Self::default()
    }

    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }
}

/// Folder grouping playlists
///
/// The unsorted folder is a sentinel with an empty name; it holds playlists
/// that live directly in the playlists root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlaylistFolderModel {
    pub name: String,
    pub path: String,
    pub is_selected: bool,
}

impl PlaylistFolderModel {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_selected: false,
        }
    }

    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn is_unsorted(&self) -> bool {
        self.name.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: i64, title: Option<&str>, duration_ms: i64, size: i64) -> Track {
        Track {
            title: title.map(str::to_string),
            duration_ms,
            file_size_bytes: size,
            ..Track::new(id, format!("/music/{}.mp3", id))
        }
    }

    #[test]
    fn test_track_new_derives_file_name() {
        let track = Track::new(1, "/home/sam/Music/Glory Box.flac");
        assert_eq!(track.file_name, "Glory Box.flac");

        let windows = Track::new(2, "C:\\Music\\Teardrop.mp3");
        assert_eq!(windows.file_name, "Teardrop.mp3");
    }

    #[test]
    fn test_track_validation() {
        let mut track = Track::new(1, "/music/a.mp3");
        assert!(track.validate().is_ok());

        track.rating = 6;
        assert!(track.validate().is_err());

        track.rating = 3;
        track.duration_ms = -1;
        assert!(track.validate().is_err());

        let empty = Track::default();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_title_falls_back_to_file_name() {
        let model = TrackModel::new(track(1, Some("  "), 0, 0));
        assert_eq!(model.title(), "1");
        assert_eq!(model.raw_title(), None);

        let tagged = TrackModel::new(track(2, Some(" Teardrop "), 0, 0));
        assert_eq!(tagged.title(), "Teardrop");
    }

    #[test]
    fn test_delimited_fields_are_decoded() {
        let model = TrackModel::new(Track {
            artists: Some(";Massive Attack;;Elizabeth Fraser;".to_string()),
            album_artists: Some(";The Massive Attack;".to_string()),
            genres: Some(";Trip Hop;".to_string()),
            album_title: Some("Mezzanine".to_string()),
            ..Track::new(1, "/music/teardrop.mp3")
        });

        assert_eq!(model.artists(), ["Massive Attack", "Elizabeth Fraser"]);
        assert_eq!(model.artists_text(), "Massive Attack, Elizabeth Fraser");
        assert_eq!(model.first_artist(), Some("Massive Attack"));
        assert_eq!(model.genres(), ["Trip Hop"]);
        assert_eq!(model.sortable_album_artist(), "massive attack");
        assert_eq!(model.sortable_album_title(), "mezzanine");
    }

    #[test]
    fn test_album_artist_falls_back_to_artist() {
        let model = TrackModel::new(Track {
            artists: Some(";Björk;".to_string()),
            ..Track::new(1, "/music/joga.mp3")
        });
        assert_eq!(model.sortable_album_artist(), "bjork");
    }

    #[test]
    fn test_track_models_running_totals() {
        let mut models = TrackModels::new();
        models.add_track(track(1, None, 1_000, 100).into());
        models.add_track(track(2, None, 2_000, 200).into());
        models.add_track(track(3, None, 3_000, 300).into());

        assert_eq!(models.len(), 3);
        assert_eq!(models.total_duration_ms(), 6_000);
        assert_eq!(models.total_file_size_bytes(), 600);

        let removed = models.remove_track(2).unwrap();
        assert_eq!(removed.track_id(), 2);
        assert_eq!(models.total_duration_ms(), 4_000);
        assert_eq!(models.total_file_size_bytes(), 400);

        assert!(models.remove_track(42).is_none());
        assert_eq!(models.total_duration_ms(), 4_000);
    }

    #[test]
    fn test_track_models_from_iterator() {
        let models: TrackModels = (1..=4).map(|i| track(i, None, 10, 1).into()).collect();
        assert_eq!(models.total_duration_ms(), 40);
        assert!(!models.is_empty());
    }

    #[test]
    fn test_playlist_sentinels() {
        assert!(PlaylistModel::default_playlist().is_default());
        assert!(!PlaylistModel::new("Chill", "/playlists/Chill.m3u").is_default());

        assert!(PlaylistFolderModel::unsorted().is_unsorted());
        assert!(!PlaylistFolderModel::new("Work", "/playlists/Work").is_unsorted());
    }

    #[test]
    fn test_set_rating_clamps() {
        let mut model = TrackModel::new(track(1, None, 0, 0));
        model.set_rating(9);
        assert_eq!(model.rating(), 5);
    }
}
