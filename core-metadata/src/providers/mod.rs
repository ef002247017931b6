//! External Metadata Providers
//!
//! This module contains clients for external services:
//! - Last.fm - Artist information, similar artists and scrobbling
//! - Fanart.tv - Artist thumbnails by MusicBrainz id
//! - GitHub - Latest release of the application
//!
//! Clients make single requests and report failures; deciding what to do
//! when a provider fails is left to the services using them.

pub mod fanart;
pub mod github;
pub mod lastfm;

pub use fanart::FanartApi;
pub use github::{GitHubRelease, GitHubReleases};
pub use lastfm::{LastfmApi, LastfmArtist, LastfmImage, LastfmSimilarArtist};

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Accepts either a single value or a list of values
///
/// Last.fm returns an object instead of a one-element array for some
/// collections, and `""` or `null` for empty ones. A value that is neither a
/// list nor a `T` reads as empty.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<V> {
        Many(Vec<V>),
        One(V),
        Empty(IgnoredAny),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
        OneOrMany::Empty(_) => Vec::new(),
    })
}
