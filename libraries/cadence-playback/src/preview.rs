//! Short track previews
//!
//! A preview plays a capped sample of a track on a second engine, separate
//! from the main queue. The [`PlaybackManager`](crate::PlaybackManager)
//! keeps the two mutually exclusive: starting a preview pauses main playback
//! and main playback starting stops the preview.

use cadence_core::{Track, TrackId};
use tracing::{debug, info, warn};

use crate::engine::{AudioEngine, EngineEvent, LoadTicket};
use crate::error::{PlaybackError, Result};
use crate::events::{PlaybackEvent, PreviewStopReason};
use crate::resolver::resolve_source;

/// Default preview length in seconds
pub const DEFAULT_PREVIEW_LIMIT_SECS: f64 = 30.0;

#[derive(Debug, Clone)]
struct ActivePreview {
    ticket: LoadTicket,
    loaded: bool,
}

/// Capped sample player on its own engine
pub struct PreviewPlayer<E: AudioEngine> {
    engine: E,
    limit_secs: f64,
    active: Option<ActivePreview>,
    generation: u64,
    events: Vec<PlaybackEvent>,
}

impl<E: AudioEngine> PreviewPlayer<E> {
    /// Create a preview player with the default cap
    pub fn new(engine: E) -> Self {
        Self::with_limit(engine, DEFAULT_PREVIEW_LIMIT_SECS)
    }

    /// Create a preview player with a custom cap in seconds
    pub fn with_limit(engine: E, limit_secs: f64) -> Self {
        Self {
            engine,
            limit_secs,
            active: None,
            generation: 0,
            events: Vec::new(),
        }
    }

    /// Start previewing `track`, replacing any running preview
    ///
    /// # Errors
    /// `Unplayable` if the track has no source candidates.
    pub fn start(&mut self, track: &Track, quality: &str) -> Result<()> {
        self.stop(PreviewStopReason::Stopped);

        let Some(source) = resolve_source(track, quality) else {
            warn!("Preview unplayable: {}", track.id);
            self.events.push(PlaybackEvent::PreviewStopped {
                track_id: track.id.clone(),
                reason: PreviewStopReason::Failed,
            });
            return Err(PlaybackError::Unplayable(track.id.clone()));
        };

        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            track_id: track.id.clone(),
        };

        debug!("Preview loading {} ({})", track.id, source.quality);
        self.engine.load(&source.url, ticket.clone());
        self.active = Some(ActivePreview {
            ticket,
            loaded: false,
        });
        self.events.push(PlaybackEvent::PreviewStarted {
            track_id: track.id.clone(),
        });

        Ok(())
    }

    /// Stop the running preview, if any
    ///
    /// Returns whether a preview was stopped.
    pub fn stop(&mut self, reason: PreviewStopReason) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };

        self.engine.pause();
        debug!("Preview stopped: {} ({:?})", active.ticket.track_id, reason);
        self.events.push(PlaybackEvent::PreviewStopped {
            track_id: active.ticket.track_id,
            reason,
        });
        true
    }

    /// Feed a notification from the preview engine
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Ready { ticket, .. } => {
                let Some(active) = self.active.as_mut().filter(|a| a.ticket == ticket) else {
                    debug!("Discarding stale preview ready: {:?}", ticket);
                    return;
                };
                active.loaded = true;

                if let Err(e) = self.engine.play() {
                    warn!("Preview play rejected: {}", e);
                    self.stop(PreviewStopReason::Rejected);
                }
            }
            EngineEvent::LoadFailed { ticket, message } => {
                if self.active.as_ref().is_some_and(|a| a.ticket == ticket) {
                    warn!("Preview load failed: {}", message);
                    self.stop(PreviewStopReason::Failed);
                }
            }
            EngineEvent::Progressed { time } => {
                let over_limit = self
                    .active
                    .as_ref()
                    .is_some_and(|a| a.loaded && time >= self.limit_secs);
                if over_limit {
                    info!("Preview reached {:.0}s limit", self.limit_secs);
                    self.stop(PreviewStopReason::LimitReached);
                }
            }
            EngineEvent::Ended => {
                if self.active.as_ref().is_some_and(|a| a.loaded) {
                    self.stop(PreviewStopReason::Ended);
                }
            }
            EngineEvent::PlayStateChanged { .. } => {}
        }
    }

    /// Keep the preview engine's volume in step with the main output
    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
    }

    /// Whether a preview is loading or playing
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Track being previewed
    pub fn track_id(&self) -> Option<&TrackId> {
        self.active.as_ref().map(|a| &a.ticket.track_id)
    }

    /// Preview length cap in seconds
    pub fn limit_secs(&self) -> f64 {
        self.limit_secs
    }

    /// Get engine reference
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Take events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }
}
