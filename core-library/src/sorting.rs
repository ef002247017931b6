//! Track ordering for the tracks views.
//!
//! All orderings use stable sorts: tracks that compare equal keep the order
//! they came in, which is the order the library query returned.

use crate::models::TrackModel;
use crate::strings::natural_cmp;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering selectable in a tracks view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackOrder {
    #[default]
    TitleAscending,
    TitleDescending,
    /// Album artist, album title, disc number, track number
    Album,
    /// Newest first
    DateAdded,
    /// Newest first
    DateCreated,
    /// Highest first
    Rating,
    FileNameAscending,
    FileNameDescending,
    /// Keep the incoming order
    None,
}

impl TrackOrder {
    pub const ALL: [TrackOrder; 9] = [
        TrackOrder::TitleAscending,
        TrackOrder::TitleDescending,
        TrackOrder::Album,
        TrackOrder::DateAdded,
        TrackOrder::DateCreated,
        TrackOrder::Rating,
        TrackOrder::FileNameAscending,
        TrackOrder::FileNameDescending,
        TrackOrder::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitleAscending => "title_ascending",
            Self::TitleDescending => "title_descending",
            Self::Album => "album",
            Self::DateAdded => "date_added",
            Self::DateCreated => "date_created",
            Self::Rating => "rating",
            Self::FileNameAscending => "file_name_ascending",
            Self::FileNameDescending => "file_name_descending",
            Self::None => "none",
        }
    }
}

impl fmt::Display for TrackOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| format!("Unknown track order: {}", s))
    }
}

/// Produces ordered copies of track lists
pub struct TrackSorter;

impl TrackSorter {
    pub fn order(tracks: &[TrackModel], order: TrackOrder) -> Vec<TrackModel> {
        match order {
            TrackOrder::TitleAscending => Self::tracks_ordered_by_title_ascending(tracks),
            TrackOrder::TitleDescending => Self::tracks_ordered_by_title_descending(tracks),
            TrackOrder::Album => Self::tracks_ordered_by_album(tracks),
            TrackOrder::DateAdded => Self::tracks_ordered_by_date_added(tracks),
            TrackOrder::DateCreated => Self::tracks_ordered_by_date_created(tracks),
            TrackOrder::Rating => Self::tracks_ordered_by_rating(tracks),
            TrackOrder::FileNameAscending => Self::tracks_ordered_by_file_name_ascending(tracks),
            TrackOrder::FileNameDescending => {
                Self::tracks_ordered_by_file_name_descending(tracks)
            }
            TrackOrder::None => tracks.to_vec(),
        }
    }

    pub fn tracks_ordered_by_title_ascending(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, compare_titles)
    }

    pub fn tracks_ordered_by_title_descending(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, |a, b| compare_titles(b, a))
    }

    pub fn tracks_ordered_by_album(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, |a, b| {
            a.sortable_album_artist()
                .cmp(b.sortable_album_artist())
                .then_with(|| a.sortable_album_title().cmp(b.sortable_album_title()))
                .then_with(|| a.disc_number().cmp(&b.disc_number()))
                .then_with(|| a.track_number().cmp(&b.track_number()))
        })
    }

    pub fn tracks_ordered_by_date_added(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, |a, b| b.date_added().cmp(&a.date_added()))
    }

    pub fn tracks_ordered_by_date_created(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, |a, b| b.date_file_created().cmp(&a.date_file_created()))
    }

    pub fn tracks_ordered_by_rating(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, |a, b| b.rating().cmp(&a.rating()))
    }

    pub fn tracks_ordered_by_file_name_ascending(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, compare_file_names)
    }

    pub fn tracks_ordered_by_file_name_descending(tracks: &[TrackModel]) -> Vec<TrackModel> {
        sorted_by(tracks, |a, b| compare_file_names(b, a))
    }
}

fn compare_titles(a: &TrackModel, b: &TrackModel) -> Ordering {
    natural_cmp(a.sortable_title(), b.sortable_title())
}

fn compare_file_names(a: &TrackModel, b: &TrackModel) -> Ordering {
    natural_cmp(a.sortable_file_name(), b.sortable_file_name())
}

fn sorted_by<F>(tracks: &[TrackModel], compare: F) -> Vec<TrackModel>
where
    F: FnMut(&TrackModel, &TrackModel) -> Ordering,
{
    let mut sorted = tracks.to_vec();
    // slice::sort_by is stable
    sorted.sort_by(compare);
    sorted
}
