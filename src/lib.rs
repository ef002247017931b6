//! Umbrella crate for the player core.
//!
//! Host applications can depend on `player-core-workspace` and pick the
//! layers they need through features instead of wiring each crate:
//!
//! - `desktop-shims` (default): the [`service`] façade with desktop bridges
//! - `metadata`: lyrics, artist information, scrobbling and update checks
//! - `library`: track models, sorting, the playback queue and persisters

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "metadata")]
pub use core_metadata as metadata;

#[cfg(feature = "library")]
pub use core_library as library;
