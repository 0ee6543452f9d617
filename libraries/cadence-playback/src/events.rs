//! Playback Events
//!
//! Event-based communication for UI synchronization. The manager queues
//! events as it changes state; the UI drains them with
//! [`PlaybackManager::drain_events`](crate::PlaybackManager::drain_events)
//! after each call. Events are emitted at:
//! - State transitions (idle/loading/paused/playing)
//! - Current track changes and source resolution
//! - Recoverable failures (unplayable track, rejected play, failed load)
//! - Queue, volume and mode changes
//! - Engine progress and preview start/stop

use cadence_core::{RepeatMode, TrackId};
use serde::{Deserialize, Serialize};

use crate::types::PlaybackState;

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport state changed
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// A different track became current
    TrackChanged {
        /// ID of the new current track
        track_id: TrackId,
        /// ID of the previous current track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// A URL was picked for the current track and handed to the engine
    SourceResolved {
        /// Track being loaded
        track_id: TrackId,
        /// Label actually used
        quality: String,
        /// Whether it differs from the requested label
        fallback: bool,
    },

    /// The current track has no playable source
    TrackUnplayable {
        /// Track that could not be resolved
        track_id: TrackId,
    },

    /// The engine refused to start playback
    PlayRejected {
        /// Engine-supplied reason
        message: String,
    },

    /// The engine failed to load the current source
    LoadFailed {
        /// Track whose load failed
        track_id: TrackId,
        /// Engine-supplied reason
        message: String,
    },

    /// A resume checkpoint was applied to the loaded track
    ResumeApplied {
        /// Track that resumed
        track_id: TrackId,
        /// Position seeked to, in seconds
        position_seconds: f64,
    },

    /// Queue contents or pointer changed
    QueueChanged {
        /// New queue length
        length: usize,
        /// New current index
        current_index: Option<usize>,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Stored volume (0.0 - 1.0), unaffected by mute
        volume: f32,
        /// Whether output is muted
        muted: bool,
    },

    /// Shuffle or repeat changed
    ModesChanged {
        /// Shuffle flag
        shuffle: bool,
        /// Repeat mode
        repeat: RepeatMode,
    },

    /// Engine time advanced
    PositionUpdate {
        /// Current position in seconds
        position: f64,
        /// Duration in seconds, if known
        duration: Option<f64>,
    },

    /// A preview began loading
    PreviewStarted {
        /// Previewed track
        track_id: TrackId,
    },

    /// A preview ended
    PreviewStopped {
        /// Previewed track
        track_id: TrackId,
        /// Why it stopped
        reason: PreviewStopReason,
    },
}

/// Why a preview stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewStopReason {
    /// Reached the preview length cap
    LimitReached,
    /// Source played to its end before the cap
    Ended,
    /// Stopped explicitly by the listener
    Stopped,
    /// Main playback started
    MainPlayback,
    /// Preview engine refused to play
    Rejected,
    /// Preview source failed to load or resolve
    Failed,
}
