//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No current track
    #[default]
    Idle,

    /// Source requested, waiting for the engine's ready notification
    Loading,

    /// Source loaded, not producing audio
    Paused,

    /// Currently playing
    Playing,
}

impl PlaybackState {
    /// Whether a source is loaded (`Paused` or `Playing`)
    pub fn has_source(self) -> bool {
        matches!(self, Self::Paused | Self::Playing)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Paused => "paused",
            Self::Playing => "playing",
        };
        f.write_str(name)
    }
}
