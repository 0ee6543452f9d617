//! Shuffle and repeat navigation
//!
//! Computes the next or previous queue position from a [`Queue`] snapshot.
//! Repeat mode does not affect manual navigation: with shuffle off both
//! directions always wrap. Only the transport's end-of-track handling looks at
//! the repeat mode.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::queue::Queue;

/// Next/previous index computation
///
/// Shuffle picks uniformly among every position except the current one. There
/// is no shuffle bag: a track can come up again before the others have played.
#[derive(Debug)]
pub struct PlaybackPolicy<R: Rng = StdRng> {
    rng: R,
}

impl PlaybackPolicy<StdRng> {
    /// Create a policy seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic policy
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for PlaybackPolicy<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PlaybackPolicy<R> {
    /// Create a policy around an existing RNG
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Position to move to on "next"
    ///
    /// Returns `None` only when the queue is empty or nothing is current.
    pub fn next(&mut self, queue: &Queue) -> Option<usize> {
        let current = queue.current_index()?;
        let len = queue.len();

        if queue.shuffle() {
            return Some(self.random_excluding(current, len));
        }

        Some((current + 1) % len)
    }

    /// Position to move to on "previous"
    ///
    /// Returns `None` only when the queue is empty or nothing is current.
    pub fn prev(&mut self, queue: &Queue) -> Option<usize> {
        let current = queue.current_index()?;
        let len = queue.len();

        if queue.shuffle() {
            return Some(self.random_excluding(current, len));
        }

        Some((current + len - 1) % len)
    }

    fn random_excluding(&mut self, current: usize, len: usize) -> usize {
        if len <= 1 {
            return current;
        }

        // Sample from len-1 slots and skip over `current`
        let pick = self.rng.gen_range(0..len - 1);
        if pick >= current {
            pick + 1
        } else {
            pick
        }
    }
}
