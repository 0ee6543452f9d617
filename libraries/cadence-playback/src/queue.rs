//! Play queue snapshots
//!
//! A [`Queue`] is an ordered list of tracks plus a pointer to the current one
//! and the playback mode flags. Every operation is a pure function from the
//! old snapshot to a new one; callers swap the result in as a single step, so
//! nothing ever observes a length and pointer that disagree.
//!
//! ```text
//!   tracks:   [ A ][ B ][ C ][ B ]      duplicates by id allowed
//!                     ^
//!   current:  Some(1)                   None only when empty
//! ```
//!
//! Structural edits (reorder, move-to-edge) re-locate the entry that was
//! current instead of offsetting the index, so the current track never
//! changes identity as a side effect of a drag.

use std::collections::HashSet;

use cadence_core::{QueueEdge, RepeatMode, Track, TrackId};
use serde::Serialize;

use crate::error::{PlaybackError, Result};

/// Immutable play queue snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct Queue {
    tracks: Vec<Track>,

    /// Index into `tracks`; `None` exactly when `tracks` is empty
    current: Option<usize>,

    shuffle: bool,

    repeat: RepeatMode,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `tracks`
    ///
    /// The pointer lands on `start` if it is present, otherwise on the first
    /// track, otherwise it is unset. Mode flags are kept.
    #[must_use]
    pub fn replace(&self, tracks: Vec<Track>, start: Option<&TrackId>) -> Self {
        let current = if tracks.is_empty() {
            None
        } else {
            Some(
                start
                    .and_then(|id| tracks.iter().position(|t| &t.id == id))
                    .unwrap_or(0),
            )
        };

        Self {
            tracks,
            current,
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }

    /// Insert `track` right after the current one
    ///
    /// On an empty queue this is `replace([track], track.id)`. The pointer
    /// does not move.
    #[must_use]
    pub fn insert_next(&self, track: Track) -> Self {
        let Some(current) = self.current else {
            let id = track.id.clone();
            return self.replace(vec![track], Some(&id));
        };

        let mut next = self.clone();
        next.tracks.insert(current + 1, track);
        next
    }

    /// Append tracks whose id is not already queued
    ///
    /// De-duplication is against the existing queue only: two new tracks
    /// with the same id are both appended. If nothing was current, the
    /// pointer moves to the first appended track.
    #[must_use]
    pub fn append_many(&self, tracks: impl IntoIterator<Item = Track>) -> Self {
        let additions: Vec<Track> = {
            let existing: HashSet<&TrackId> = self.tracks.iter().map(|t| &t.id).collect();
            tracks
                .into_iter()
                .filter(|t| !existing.contains(&t.id))
                .collect()
        };

        let mut next = self.clone();
        let first_appended = next.tracks.len();
        if next.current.is_none() && !additions.is_empty() {
            next.current = Some(first_appended);
        }
        next.tracks.extend(additions);
        next
    }

    /// Move the entry at `from` to `to`
    ///
    /// # Errors
    /// `IndexOutOfBounds` if either position is outside the queue.
    pub fn reorder(&self, from: usize, to: usize) -> Result<Self> {
        let len = self.tracks.len();
        if from >= len {
            return Err(PlaybackError::IndexOutOfBounds(from));
        }
        if to >= len {
            return Err(PlaybackError::IndexOutOfBounds(to));
        }

        Ok(self.moved(from, to))
    }

    /// Remove every entry with `id`
    ///
    /// If the current track was removed, the pointer goes to the entry that
    /// followed it (skipping other removed copies), wrapping to the first
    /// entry when there is none, and is unset when the queue becomes empty.
    /// Removing an id that is not queued returns an unchanged snapshot.
    #[must_use]
    pub fn remove_by_id(&self, id: &TrackId) -> Self {
        let kept: Vec<(usize, &Track)> = self
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| &t.id != id)
            .collect();

        if kept.len() == self.tracks.len() {
            return self.clone();
        }

        let current = match self.current {
            _ if kept.is_empty() => None,
            None => None,
            Some(c) if &self.tracks[c].id == id => {
                Some(kept.iter().position(|(orig, _)| *orig > c).unwrap_or(0))
            }
            Some(c) => kept.iter().position(|(orig, _)| *orig == c),
        };

        Self {
            tracks: kept.into_iter().map(|(_, t)| t.clone()).collect(),
            current,
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }

    /// Move the first entry with `id` to the top or bottom
    ///
    /// Unknown ids return an unchanged snapshot.
    #[must_use]
    pub fn move_to_edge(&self, id: &TrackId, edge: QueueEdge) -> Self {
        let Some(from) = self.position_of(id) else {
            return self.clone();
        };

        let to = match edge {
            QueueEdge::Top => 0,
            QueueEdge::Bottom => self.tracks.len() - 1,
        };

        self.moved(from, to)
    }

    /// Remove every entry
    #[must_use]
    pub fn clear(&self) -> Self {
        self.replace(Vec::new(), None)
    }

    /// Point at `index`
    ///
    /// # Errors
    /// `IndexOutOfBounds` if `index` is outside the queue.
    pub fn select(&self, index: usize) -> Result<Self> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        let mut next = self.clone();
        next.current = Some(index);
        Ok(next)
    }

    /// Set the shuffle flag
    #[must_use]
    pub fn with_shuffle(&self, shuffle: bool) -> Self {
        let mut next = self.clone();
        next.shuffle = shuffle;
        next
    }

    /// Set the repeat mode
    #[must_use]
    pub fn with_repeat(&self, repeat: RepeatMode) -> Self {
        let mut next = self.clone();
        next.repeat = repeat;
        next
    }

    /// Advance the repeat mode along `off -> all -> one -> off`
    #[must_use]
    pub fn cycle_repeat_mode(&self) -> Self {
        self.with_repeat(self.repeat.cycle())
    }

    // ===== Queries =====

    /// All tracks in queue order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Current position, `None` when unset
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Current track, always read through the pointer
    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|c| self.tracks.get(c))
    }

    /// Position of the first entry with `id`
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Check if any entry has `id`
    pub fn contains(&self, id: &TrackId) -> bool {
        self.position_of(id).is_some()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether shuffle is on
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Current repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    /// Whether the pointer is on the last entry
    pub fn is_at_last(&self) -> bool {
        self.current
            .is_some_and(|c| c + 1 == self.tracks.len())
    }

    /// Apply a single move, following the current entry to its new slot
    fn moved(&self, from: usize, to: usize) -> Self {
        let mut order: Vec<usize> = (0..self.tracks.len()).collect();
        let entry = order.remove(from);
        order.insert(to, entry);

        let tracks = order.iter().map(|&i| self.tracks[i].clone()).collect();
        let current = self
            .current
            .and_then(|c| order.iter().position(|&i| i == c));

        Self {
            tracks,
            current,
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_track(id: &str) -> Track {
        Track::new(id, format!("Track {}", id))
            .with_artist("Test Artist")
            .with_duration(180.0)
    }

    fn queue_of(ids: &[&str], current: usize) -> Queue {
        let tracks = ids.iter().map(|id| create_test_track(id)).collect();
        Queue::new()
            .replace(tracks, None)
            .select(current)
            .unwrap()
    }

    fn ids(queue: &Queue) -> Vec<&str> {
        queue.tracks().iter().map(|t| t.id.as_str()).collect()
    }

    fn current_id(queue: &Queue) -> Option<&str> {
        queue.current_track().map(|t| t.id.as_str())
    }

    #[test]
    fn create_empty_queue() {
        let queue = Queue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
        assert!(queue.current_track().is_none());
    }

    #[test]
    fn replace_points_at_start_track() {
        let tracks = vec![
            create_test_track("a"),
            create_test_track("b"),
            create_test_track("c"),
        ];
        let queue = Queue::new().replace(tracks, Some(&TrackId::new("c")));

        assert_eq!(queue.current_index(), Some(2));
        assert_eq!(current_id(&queue), Some("c"));
    }

    #[test]
    fn replace_falls_back_to_first_track() {
        let tracks = vec![create_test_track("a"), create_test_track("b")];
        let queue = Queue::new().replace(tracks, Some(&TrackId::new("missing")));

        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn replace_with_nothing_unsets_pointer() {
        let queue = queue_of(&["a", "b"], 1).replace(Vec::new(), None);
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
    }

    #[test]
    fn replace_keeps_mode_flags() {
        let queue = Queue::new()
            .with_shuffle(true)
            .with_repeat(RepeatMode::One)
            .replace(vec![create_test_track("a")], None);

        assert!(queue.shuffle());
        assert_eq!(queue.repeat_mode(), RepeatMode::One);
    }

    #[test]
    fn insert_next_on_empty_queue_starts_it() {
        let queue = Queue::new().insert_next(create_test_track("a"));
        assert_eq!(ids(&queue), vec!["a"]);
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn insert_next_goes_after_current_without_moving_pointer() {
        let queue = queue_of(&["a", "b", "c"], 1).insert_next(create_test_track("x"));

        assert_eq!(ids(&queue), vec!["a", "b", "x", "c"]);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(current_id(&queue), Some("b"));
    }

    #[test]
    fn append_many_skips_ids_already_queued() {
        let queue = queue_of(&["a"], 0)
            .append_many(vec![create_test_track("a"), create_test_track("b")]);

        assert_eq!(ids(&queue), vec!["a", "b"]);
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn append_many_does_not_dedupe_new_tracks_against_each_other() {
        let queue = queue_of(&["a"], 0)
            .append_many(vec![create_test_track("b"), create_test_track("b")]);

        assert_eq!(ids(&queue), vec!["a", "b", "b"]);
    }

    #[test]
    fn append_many_on_empty_queue_points_at_first_appended() {
        let queue =
            Queue::new().append_many(vec![create_test_track("a"), create_test_track("b")]);

        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(current_id(&queue), Some("a"));
    }

    #[test]
    fn append_many_with_only_duplicates_is_unchanged() {
        let queue = queue_of(&["a", "b"], 1).append_many(vec![create_test_track("b")]);
        assert_eq!(ids(&queue), vec!["a", "b"]);
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn reorder_follows_current_track() {
        // Move the current track itself
        let queue = queue_of(&["a", "b", "c", "d"], 1).reorder(1, 3).unwrap();
        assert_eq!(ids(&queue), vec!["a", "c", "d", "b"]);
        assert_eq!(current_id(&queue), Some("b"));
        assert_eq!(queue.current_index(), Some(3));

        // Move something from before current to after it
        let queue = queue_of(&["a", "b", "c", "d"], 2).reorder(0, 3).unwrap();
        assert_eq!(ids(&queue), vec!["b", "c", "d", "a"]);
        assert_eq!(current_id(&queue), Some("c"));

        // Move something from after current to before it
        let queue = queue_of(&["a", "b", "c", "d"], 1).reorder(3, 0).unwrap();
        assert_eq!(ids(&queue), vec!["d", "a", "b", "c"]);
        assert_eq!(current_id(&queue), Some("b"));
    }

    #[test]
    fn reorder_with_duplicates_keeps_the_playing_entry() {
        let queue = queue_of(&["a", "b", "a"], 2).reorder(2, 0).unwrap();
        assert_eq!(ids(&queue), vec!["a", "a", "b"]);
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(current_id(&queue), Some("a"));
    }

    #[test]
    fn reorder_out_of_bounds_is_rejected() {
        let queue = queue_of(&["a", "b"], 0);
        assert!(matches!(
            queue.reorder(0, 2),
            Err(PlaybackError::IndexOutOfBounds(2))
        ));
        assert!(matches!(
            queue.reorder(5, 0),
            Err(PlaybackError::IndexOutOfBounds(5))
        ));
    }

    #[test]
    fn remove_current_moves_to_successor() {
        let queue = queue_of(&["a", "b", "c"], 0).remove_by_id(&TrackId::new("a"));
        assert_eq!(ids(&queue), vec!["b", "c"]);
        assert_eq!(current_id(&queue), Some("b"));
    }

    #[test]
    fn remove_current_last_wraps_to_first() {
        let queue = queue_of(&["a", "b", "c"], 2).remove_by_id(&TrackId::new("c"));
        assert_eq!(ids(&queue), vec!["a", "b"]);
        assert_eq!(current_id(&queue), Some("a"));
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn remove_current_skips_removed_duplicates() {
        let queue = queue_of(&["a", "b", "b", "c"], 1).remove_by_id(&TrackId::new("b"));
        assert_eq!(ids(&queue), vec!["a", "c"]);
        assert_eq!(current_id(&queue), Some("c"));
    }

    #[test]
    fn remove_only_track_unsets_pointer() {
        let queue = queue_of(&["a", "a"], 0).remove_by_id(&TrackId::new("a"));
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
    }

    #[test]
    fn remove_before_current_keeps_identity() {
        let queue = queue_of(&["a", "b", "c"], 2).remove_by_id(&TrackId::new("a"));
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(current_id(&queue), Some("c"));
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let queue = queue_of(&["a", "b"], 1).remove_by_id(&TrackId::new("zzz"));
        assert_eq!(ids(&queue), vec!["a", "b"]);
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn move_to_edge_top_and_bottom() {
        let queue = queue_of(&["a", "b", "c"], 0).move_to_edge(&TrackId::new("c"), QueueEdge::Top);
        assert_eq!(ids(&queue), vec!["c", "a", "b"]);
        assert_eq!(current_id(&queue), Some("a"));

        let queue = queue.move_to_edge(&TrackId::new("a"), QueueEdge::Bottom);
        assert_eq!(ids(&queue), vec!["c", "b", "a"]);
        assert_eq!(current_id(&queue), Some("a"));
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn move_to_edge_moves_first_matching_entry_only() {
        let queue =
            queue_of(&["x", "a", "y", "a"], 0).move_to_edge(&TrackId::new("a"), QueueEdge::Top);
        assert_eq!(ids(&queue), vec!["a", "x", "y", "a"]);
        assert_eq!(current_id(&queue), Some("x"));
    }

    #[test]
    fn move_to_edge_unknown_id_is_noop() {
        let queue = queue_of(&["a", "b"], 0).move_to_edge(&TrackId::new("q"), QueueEdge::Bottom);
        assert_eq!(ids(&queue), vec!["a", "b"]);
    }

    #[test]
    fn clear_queue() {
        let queue = queue_of(&["a", "b"], 1).with_shuffle(true).clear();
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
        assert!(queue.shuffle());
    }

    #[test]
    fn select_bounds_checked() {
        let queue = queue_of(&["a", "b"], 0);
        assert_eq!(queue.select(1).unwrap().current_index(), Some(1));
        assert!(queue.select(2).is_err());
    }

    #[test]
    fn snapshots_leave_original_untouched() {
        let original = queue_of(&["a", "b", "c"], 0);
        let _ = original.remove_by_id(&TrackId::new("a"));
        let _ = original.reorder(0, 2).unwrap();

        assert_eq!(ids(&original), vec!["a", "b", "c"]);
        assert_eq!(original.current_index(), Some(0));
    }

    #[test]
    fn cycle_repeat_mode_on_queue() {
        let queue = Queue::new();
        let queue = queue.cycle_repeat_mode();
        assert_eq!(queue.repeat_mode(), RepeatMode::All);
        let queue = queue.cycle_repeat_mode();
        assert_eq!(queue.repeat_mode(), RepeatMode::One);
        let queue = queue.cycle_repeat_mode();
        assert_eq!(queue.repeat_mode(), RepeatMode::Off);
    }

    #[test]
    fn is_at_last_tracks_pointer() {
        assert!(queue_of(&["a", "b"], 1).is_at_last());
        assert!(!queue_of(&["a", "b"], 0).is_at_last());
        assert!(!Queue::new().is_at_last());
    }
}
