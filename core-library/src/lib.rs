//! # Library Module
//!
//! Track models and the in-memory views built on top of them.
//!
//! ## Overview
//!
//! This module provides:
//! - Track, playlist and playlist folder models with precomputed sort keys
//! - Stable track orderings for the tracks views
//! - A playback queue with reversible shuffle
//! - Settings-backed persisters for selections, columns and preferences
//! - String helpers shared by the metadata services (accent folding,
//!   natural comparison, delimited multi-value fields)

pub mod delimiter;
pub mod error;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod sorting;
pub mod strings;

pub use error::{LibraryError, Result};
pub use models::{PlaylistFolderModel, PlaylistModel, Track, TrackModel, TrackModels};
pub use persistence::{
    ColumnsPersister, PreferencePersister, SelectionPersister, TrackColumn, TrackOrderPersister,
    TracksColumns,
};
pub use queue::PlaybackQueue;
pub use sorting::{TrackOrder, TrackSorter};
