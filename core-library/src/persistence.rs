//! Settings-backed persisters for UI state
//!
//! Each persister owns a handful of keys in the injected [`SettingsStore`]
//! and converts between stored strings/booleans and typed values. Values
//! that are missing or cannot be understood fall back to defaults instead of
//! failing the view that asked for them.

use crate::delimiter::{from_delimited_string, to_delimited_string};
use crate::error::Result;
use crate::sorting::TrackOrder;
use bridge_traits::storage::SettingsStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DOWNLOAD_LYRICS_ONLINE_KEY: &str = "download_lyrics_online";
pub const ENABLE_DISCORD_RICH_PRESENCE_KEY: &str = "enable_discord_rich_presence";
pub const USE_LOCALIZED_BIOGRAPHY_KEY: &str = "use_localized_biography";
pub const TRACKS_COLUMNS_KEY: &str = "tracks_columns";

// =============================================================================
// Track order
// =============================================================================

/// Remembers the selected track order of one screen (collection, artists, ...)
pub struct TrackOrderPersister {
    settings: Arc<dyn SettingsStore>,
    key: String,
    default_order: TrackOrder,
}

impl TrackOrderPersister {
    /// `screen` names the view, e.g. `"artists"`; the setting key becomes
    /// `"<screen>_track_order"`
    pub fn new(settings: Arc<dyn SettingsStore>, screen: &str, default_order: TrackOrder) -> Self {
        Self {
            settings,
            key: format!("{}_track_order", screen),
            default_order,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn get_selected_track_order(&self) -> TrackOrder {
        match self.settings.get_string(&self.key).await {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                warn!(key = %self.key, error = %e, "Ignoring stored track order");
                self.default_order
            }),
            Ok(None) => self.default_order,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Could not read track order");
                self.default_order
            }
        }
    }

    pub async fn set_selected_track_order(&self, order: TrackOrder) -> Result<()> {
        self.settings.set_string(&self.key, order.as_str()).await?;
        debug!(key = %self.key, order = %order, "Saved track order");
        Ok(())
    }
}

// =============================================================================
// Selections
// =============================================================================

/// Remembers the selected names of one list (genres, playlists, artists)
pub struct SelectionPersister {
    settings: Arc<dyn SettingsStore>,
    key: String,
}

impl SelectionPersister {
    pub fn new(settings: Arc<dyn SettingsStore>, key: impl Into<String>) -> Self {
        Self {
            settings,
            key: key.into(),
        }
    }

    pub async fn get_selected(&self) -> Result<Vec<String>> {
        let stored = self.settings.get_string(&self.key).await?;
        Ok(stored
            .as_deref()
            .map(from_delimited_string)
            .unwrap_or_default())
    }

    pub async fn set_selected<S: AsRef<str> + Sync>(&self, names: &[S]) -> Result<()> {
        self.settings
            .set_string(&self.key, &to_delimited_string(names))
            .await?;
        debug!(key = %self.key, count = names.len(), "Saved selection");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.settings.delete(&self.key).await?;
        Ok(())
    }
}

// =============================================================================
// Tracks table columns
// =============================================================================

/// Column of the tracks table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackColumn {
    Rating,
    Love,
    Lyrics,
    TrackNumber,
    Title,
    Artists,
    Album,
    Genres,
    Duration,
    PlayCount,
    SkipCount,
    DateLastPlayed,
    DateAdded,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnState {
    pub column: TrackColumn,
    pub visible: bool,
}

/// Column visibility and order, stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracksColumns {
    pub columns: Vec<ColumnState>,
}

impl Default for TracksColumns {
    fn default() -> Self {
        use TrackColumn::*;

        let visible = [TrackNumber, Title, Artists, Album, Duration, Rating, Love];
        let columns = [
            Rating,
            Love,
            Lyrics,
            TrackNumber,
            Title,
            Artists,
            Album,
            Genres,
            Duration,
            PlayCount,
            SkipCount,
            DateLastPlayed,
            DateAdded,
            Year,
        ]
        .into_iter()
        .map(|column| ColumnState {
            column,
            visible: visible.contains(&column),
        })
        .collect();

        Self { columns }
    }
}

impl TracksColumns {
    pub fn is_visible(&self, column: TrackColumn) -> bool {
        self.columns
            .iter()
            .any(|state| state.column == column && state.visible)
    }

    pub fn set_visible(&mut self, column: TrackColumn, visible: bool) {
        match self.columns.iter_mut().find(|state| state.column == column) {
            Some(state) => state.visible = visible,
            None => self.columns.push(ColumnState { column, visible }),
        }
    }

    /// Columns to render, left to right
    pub fn visible_columns(&self) -> Vec<TrackColumn> {
        self.columns
            .iter()
            .filter(|state| state.visible)
            .map(|state| state.column)
            .collect()
    }
}

pub struct ColumnsPersister {
    settings: Arc<dyn SettingsStore>,
}

impl ColumnsPersister {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub async fn get_columns(&self) -> Result<TracksColumns> {
        let Some(stored) = self.settings.get_string(TRACKS_COLUMNS_KEY).await? else {
            return Ok(TracksColumns::default());
        };

        match serde_json::from_str(&stored) {
            Ok(columns) => Ok(columns),
            Err(e) => {
                warn!(error = %e, "Stored tracks columns are invalid, using defaults");
                Ok(TracksColumns::default())
            }
        }
    }

    pub async fn set_columns(&self, columns: &TracksColumns) -> Result<()> {
        let json = serde_json::to_string(columns)?;
        self.settings.set_string(TRACKS_COLUMNS_KEY, &json).await?;
        Ok(())
    }
}

// =============================================================================
// Preferences
// =============================================================================

/// Boolean preferences consulted by the services
pub struct PreferencePersister {
    settings: Arc<dyn SettingsStore>,
}

impl PreferencePersister {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Whether lyrics may be fetched from the web. Default: true
    pub async fn download_lyrics_online(&self) -> Result<bool> {
        self.get_bool(DOWNLOAD_LYRICS_ONLINE_KEY, true).await
    }

    pub async fn set_download_lyrics_online(&self, enabled: bool) -> Result<()> {
        self.set_bool(DOWNLOAD_LYRICS_ONLINE_KEY, enabled).await
    }

    /// Stored for the desktop shell, which owns the Discord integration.
    /// Default: false
    pub async fn enable_discord_rich_presence(&self) -> Result<bool> {
        self.get_bool(ENABLE_DISCORD_RICH_PRESENCE_KEY, false).await
    }

    pub async fn set_enable_discord_rich_presence(&self, enabled: bool) -> Result<()> {
        self.set_bool(ENABLE_DISCORD_RICH_PRESENCE_KEY, enabled).await
    }

    /// Whether biographies are requested in the configured language.
    /// Default: true
    pub async fn use_localized_biography(&self) -> Result<bool> {
        self.get_bool(USE_LOCALIZED_BIOGRAPHY_KEY, true).await
    }

    pub async fn set_use_localized_biography(&self, enabled: bool) -> Result<()> {
        self.set_bool(USE_LOCALIZED_BIOGRAPHY_KEY, enabled).await
    }

    async fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.settings.get_bool(key).await?.unwrap_or(default))
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.settings.set_bool(key, value).await?;
        debug!(key = key, value, "Saved preference");
        Ok(())
    }
}
