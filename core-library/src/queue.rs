//! Playback queue with optional shuffle.
//!
//! Tracks are kept in the order they were queued. A separate playback order
//! (indices into the track list) decides what plays next; shuffling only
//! permutes that order, so unshuffling restores the queued order exactly.

use crate::models::TrackModel;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    tracks: Vec<TrackModel>,
    playback_order: Vec<usize>,
    is_shuffled: bool,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the queue content, optionally shuffled
    pub fn set_tracks(&mut self, tracks: Vec<TrackModel>, shuffle: bool) {
        self.tracks = tracks;
        self.reset_order();

        if shuffle {
            self.shuffle();
        } else {
            self.is_shuffled = false;
        }

        debug!(count = self.tracks.len(), shuffle, "Queue tracks set");
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Shuffles the playback order with the given random source
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.playback_order.shuffle(rng);
        self.is_shuffled = true;
    }

    pub fn unshuffle(&mut self) {
        self.reset_order();
        self.is_shuffled = false;
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn first_track(&self) -> Option<&TrackModel> {
        self.playback_order
            .first()
            .and_then(|&index| self.tracks.get(index))
    }

    /// Track after `current` in playback order
    ///
    /// At the end of the queue this returns the first track when
    /// `allow_wrap_around` is set, otherwise `None`. A `current` track that
    /// is not queued also yields `None`.
    pub fn next_track(
        &self,
        current: &TrackModel,
        allow_wrap_around: bool,
    ) -> Option<&TrackModel> {
        let position = self.position_of(current)?;

        let next = if position + 1 < self.playback_order.len() {
            position + 1
        } else if allow_wrap_around {
            0
        } else {
            return None;
        };

        self.track_at(next)
    }

    /// Track before `current` in playback order
    ///
    /// At the start of the queue this returns the last track when
    /// `allow_wrap_around` is set, otherwise `None`.
    pub fn previous_track(
        &self,
        current: &TrackModel,
        allow_wrap_around: bool,
    ) -> Option<&TrackModel> {
        let position = self.position_of(current)?;

        let previous = if position > 0 {
            position - 1
        } else if allow_wrap_around {
            self.playback_order.len() - 1
        } else {
            return None;
        };

        self.track_at(previous)
    }

    /// Appends tracks; they play after everything already queued
    pub fn add_tracks(&mut self, tracks: Vec<TrackModel>) {
        let start = self.tracks.len();
        self.tracks.extend(tracks);
        self.playback_order.extend(start..self.tracks.len());
    }

    /// Removes every queued track whose id is in `track_ids`
    ///
    /// Returns the number of removed entries. The remaining tracks keep their
    /// relative playback order.
    pub fn remove_tracks(&mut self, track_ids: &[i64]) -> usize {
        let mut new_index = vec![None; self.tracks.len()];
        let mut kept = Vec::with_capacity(self.tracks.len());

        for (old, track) in self.tracks.drain(..).enumerate() {
            if !track_ids.contains(&track.track_id()) {
                new_index[old] = Some(kept.len());
                kept.push(track);
            }
        }

        let removed = new_index.len() - kept.len();
        self.tracks = kept;
        self.playback_order = self
            .playback_order
            .iter()
            .filter_map(|&old| new_index[old])
            .collect();

        debug!(removed, remaining = self.tracks.len(), "Removed tracks from queue");
        removed
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.playback_order.clear();
        self.is_shuffled = false;
    }

    /// Tracks in the order they were queued
    pub fn tracks(&self) -> &[TrackModel] {
        &self.tracks
    }

    /// Tracks in the order they will play
    pub fn tracks_in_playback_order(&self) -> Vec<&TrackModel> {
        self.playback_order
            .iter()
            .filter_map(|&index| self.tracks.get(index))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn reset_order(&mut self) {
        self.playback_order = (0..self.tracks.len()).collect();
    }

    fn position_of(&self, current: &TrackModel) -> Option<usize> {
        self.playback_order.iter().position(|&index| {
            let track = &self.tracks[index];
            track.track_id() == current.track_id() && track.path() == current.path()
        })
    }

    fn track_at(&self, position: usize) -> Option<&TrackModel> {
        self.playback_order
            .get(position)
            .and_then(|&index| self.tracks.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tracks(ids: std::ops::RangeInclusive<i64>) -> Vec<TrackModel> {
        ids.map(|id| TrackModel::new(Track::new(id, format!("/music/{}.mp3", id))))
            .collect()
    }

    fn playback_ids(queue: &PlaybackQueue) -> Vec<i64> {
        queue
            .tracks_in_playback_order()
            .into_iter()
            .map(TrackModel::track_id)
            .collect()
    }

    fn assert_permutation(queue: &PlaybackQueue) {
        let mut order = queue.playback_order.clone();
        order.sort_unstable();
        assert_eq!(order, (0..queue.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_set_tracks_in_order() {
        let mut queue = PlaybackQueue::new();
        queue.set_tracks(tracks(1..=4), false);

        assert!(!queue.is_shuffled());
        assert_eq!(playback_ids(&queue), vec![1, 2, 3, 4]);
        assert_eq!(queue.first_track().map(TrackModel::track_id), Some(1));
    }

    #[test]
    fn test_shuffle_is_permutation_and_unshuffle_restores() {
        let mut queue = PlaybackQueue::new();
        queue.set_tracks(tracks(1..=20), false);

        let mut rng = StdRng::seed_from_u64(7);
        queue.shuffle_with(&mut rng);
        assert!(queue.is_shuffled());
        assert_permutation(&queue);

        queue.add_tracks(tracks(21..=25));
        assert_permutation(&queue);

        queue.remove_tracks(&[3, 22, 99]);
        assert_permutation(&queue);
        assert_eq!(queue.len(), 23);

        queue.unshuffle();
        assert!(!queue.is_shuffled());
        let expected: Vec<i64> = (1..=25).filter(|id| *id != 3 && *id != 22).collect();
        assert_eq!(playback_ids(&queue), expected);
    }

    #[test]
    fn test_next_and_previous_with_wrap_around() {
        let mut queue = PlaybackQueue::new();
        let all = tracks(1..=3);
        queue.set_tracks(all.clone(), false);

        let next = queue.next_track(&all[0], false).map(TrackModel::track_id);
        assert_eq!(next, Some(2));

        assert!(queue.next_track(&all[2], false).is_none());
        let wrapped = queue.next_track(&all[2], true).map(TrackModel::track_id);
        assert_eq!(wrapped, Some(1));

        assert!(queue.previous_track(&all[0], false).is_none());
        let wrapped_back = queue.previous_track(&all[0], true).map(TrackModel::track_id);
        assert_eq!(wrapped_back, Some(3));
    }

    #[test]
    fn test_next_follows_shuffled_order() {
        let mut queue = PlaybackQueue::new();
        queue.set_tracks(tracks(1..=10), false);
        queue.shuffle_with(&mut StdRng::seed_from_u64(42));

        let order: Vec<TrackModel> = queue
            .tracks_in_playback_order()
            .into_iter()
            .cloned()
            .collect();
        for pair in order.windows(2) {
            let next = queue.next_track(&pair[0], false).map(TrackModel::track_id);
            assert_eq!(next, Some(pair[1].track_id()));
        }
    }

    #[test]
    fn test_unknown_current_track() {
        let mut queue = PlaybackQueue::new();
        queue.set_tracks(tracks(1..=3), false);
        let stranger = TrackModel::new(Track::new(99, "/music/99.mp3"));

        assert!(queue.next_track(&stranger, true).is_none());
        assert!(queue.previous_track(&stranger, true).is_none());
    }

    #[test]
    fn test_clear() {
        let mut queue = PlaybackQueue::new();
        queue.set_tracks(tracks(1..=3), true);
        assert!(queue.is_shuffled());
        queue.clear();

        assert!(queue.is_empty());
        assert!(!queue.is_shuffled());
        assert!(queue.first_track().is_none());
        assert!(queue.tracks_in_playback_order().is_empty());
    }
}
