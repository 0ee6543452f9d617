//! Platform-agnostic audio engine trait
//!
//! Abstracts the audio output device (an HTML audio element, a native media
//! player, a test double). The engine is driven with plain calls and reports
//! back through [`EngineEvent`] values that the host feeds into
//! [`PlaybackManager::handle_engine_event`](crate::PlaybackManager::handle_engine_event).

use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one load request issued to an engine
///
/// The engine hands the ticket back with its `Ready`/`LoadFailed`
/// notification. A ticket is stale once a newer load has been issued; the
/// generation distinguishes two loads of the same track (quality change,
/// A→B→A skips).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket {
    /// Monotonic load counter, unique per manager
    pub generation: u64,

    /// Track the load was issued for
    pub track_id: TrackId,
}

/// Errors reported synchronously by an engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Platform refused to start playback (e.g. autoplay restriction)
    #[error("Playback rejected: {0}")]
    PlayRejected(String),

    /// Device is gone or not initialised
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous notifications from an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Metadata for the loaded source is available
    Ready {
        /// Ticket passed to [`AudioEngine::load`]
        ticket: LoadTicket,
        /// Source duration in seconds, if the engine knows it
        duration: Option<f64>,
    },

    /// Loading the source failed
    LoadFailed {
        /// Ticket passed to [`AudioEngine::load`]
        ticket: LoadTicket,
        /// Engine-specific reason
        message: String,
    },

    /// Playback time advanced
    Progressed {
        /// Current time in seconds
        time: f64,
    },

    /// The current source played to its end
    Ended,

    /// The engine started or stopped on its own (media keys, OS interruption)
    PlayStateChanged {
        /// Whether the engine is now producing audio
        playing: bool,
    },
}

/// Audio output device driven by the playback manager
///
/// All calls are made from the same logical thread that delivers
/// [`EngineEvent`]s; implementations never need locking for the manager's
/// sake.
pub trait AudioEngine {
    /// Start loading `url`, replacing whatever was loaded
    ///
    /// Completion is reported with `EngineEvent::Ready` or
    /// `EngineEvent::LoadFailed` carrying `ticket`.
    fn load(&mut self, url: &str, ticket: LoadTicket);

    /// Start producing audio from the loaded source
    ///
    /// # Returns
    /// * `Ok(())` - Playback started
    /// * `Err(_)` - The platform refused (recoverable)
    fn play(&mut self) -> Result<(), EngineError>;

    /// Stop producing audio, keeping the position
    fn pause(&mut self);

    /// Current playback time in seconds
    fn current_time(&self) -> f64;

    /// Move the playback time
    fn set_current_time(&mut self, seconds: f64);

    /// Set output volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Loop the loaded source at its end instead of reporting `Ended`
    fn set_loop(&mut self, looping: bool);
}

impl<E: AudioEngine + ?Sized> AudioEngine for Box<E> {
    fn load(&mut self, url: &str, ticket: LoadTicket) {
        (**self).load(url, ticket);
    }

    fn play(&mut self) -> Result<(), EngineError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        (**self).set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume);
    }

    fn set_loop(&mut self, looping: bool) {
        (**self).set_loop(looping);
    }
}

/// Engine that records calls without producing audio
///
/// Used by unit tests inside this crate.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub loads: Vec<(String, LoadTicket)>,
    pub seeks: Vec<f64>,
    pub current_time: f64,
    pub volume: f32,
    pub looping: bool,
    pub playing: bool,
    pub reject_play: bool,
}

#[cfg(test)]
impl RecordingEngine {
    pub fn last_ticket(&self) -> LoadTicket {
        self.loads.last().map(|(_, t)| t.clone()).expect("no load issued")
    }
}

#[cfg(test)]
impl AudioEngine for RecordingEngine {
    fn load(&mut self, url: &str, ticket: LoadTicket) {
        self.loads.push((url.to_string(), ticket));
        self.current_time = 0.0;
        self.playing = false;
    }

    fn play(&mut self) -> Result<(), EngineError> {
        if self.reject_play {
            return Err(EngineError::PlayRejected("autoplay blocked".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.seeks.push(seconds);
        self.current_time = seconds;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }
}
