//! Cadence - Playback Engine
//!
//! Platform-agnostic playback management for the Cadence streaming client.
//!
//! This crate provides:
//! - Immutable queue snapshots (replace, insert-next, append, reorder,
//!   remove, move-to-edge)
//! - Quality-aware source resolution with a fixed fallback chain
//! - Shuffle (exclude-current sampling) and repeat (off/all/one)
//! - A transport state machine driven by engine notifications
//! - One-shot resume across process restarts
//! - Capped previews on a second engine
//!
//! # Architecture
//!
//! `cadence-playback` never touches audio hardware or the network:
//! - Audio output sits behind the [`AudioEngine`] trait
//! - Persistence sits behind [`cadence_storage::KeyValueStore`]
//! - Tracks are supplied by the caller, fully formed
//!
//! Everything runs on one logical thread. The host calls listener actions on
//! [`PlaybackManager`], forwards engine notifications to
//! [`PlaybackManager::handle_engine_event`], and drains [`PlaybackEvent`]s
//! for the UI.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{quality, Track};
//! use cadence_playback::{
//!     AudioEngine, EngineError, EngineEvent, LoadTicket, PlaybackConfig, PlaybackManager,
//!     PlaybackState,
//! };
//! use cadence_storage::MemoryStore;
//!
//! // A silent engine; a real host wraps its media player here
//! struct NullEngine;
//!
//! impl AudioEngine for NullEngine {
//!     fn load(&mut self, _url: &str, _ticket: LoadTicket) {}
//!     fn play(&mut self) -> Result<(), EngineError> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn current_time(&self) -> f64 {
//!         0.0
//!     }
//!     fn set_current_time(&mut self, _seconds: f64) {}
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn set_loop(&mut self, _looping: bool) {}
//! }
//!
//! let mut manager = PlaybackManager::new(NullEngine, MemoryStore::new(), &PlaybackConfig::default());
//!
//! let album = vec![
//!     Track::new("trk-1", "Opening").with_source(quality::HIGH, "https://cdn.example/1.mp3"),
//!     Track::new("trk-2", "Closing").with_source(quality::LOW, "http://cdn.example/2.mp3"),
//! ];
//! manager.play_collection(album, None);
//! assert_eq!(manager.state(), PlaybackState::Loading);
//!
//! // The engine answers with the ticket it was given
//! let ticket = manager.pending_load().cloned().unwrap();
//! manager.handle_engine_event(EngineEvent::Ready { ticket, duration: Some(212.0) });
//! assert_eq!(manager.state(), PlaybackState::Playing);
//!
//! manager.next().unwrap();
//! assert_eq!(manager.current_track().unwrap().id, "trk-2");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod manager;
pub mod policy;
pub mod preview;
pub mod queue;
pub mod resolver;
pub mod resume;
pub mod settings;
pub mod types;

pub use config::PlaybackConfig;
pub use engine::{AudioEngine, EngineError, EngineEvent, LoadTicket};
pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, PreviewStopReason};
pub use manager::PlaybackManager;
pub use policy::PlaybackPolicy;
pub use preview::{PreviewPlayer, DEFAULT_PREVIEW_LIMIT_SECS};
pub use queue::Queue;
pub use resolver::{resolve_source, ResolvedSource};
pub use resume::{ResumeCheckpoint, ResumeManager};
pub use settings::PlaybackSettings;
pub use types::PlaybackState;
