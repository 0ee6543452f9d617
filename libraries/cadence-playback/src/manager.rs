//! Playback manager - core orchestration
//!
//! Coordinates the queue, source resolution, shuffle/repeat navigation,
//! persisted settings, resume and preview around one [`AudioEngine`].
//!
//! Listener actions are `&mut self` calls; engine notifications come back in
//! through [`PlaybackManager::handle_engine_event`] on the same thread. Each
//! call computes a new queue snapshot, swaps it in, and only then talks to
//! the engine.
//!
//! ```text
//!            play_collection / select / next
//!   Idle ──────────────────────────────────▶ Loading ──ready──▶ Playing
//!    ▲                                          │  ready, no intent │ ▲
//!    │ queue emptied                            ▼                   ▼ │
//!    └──────────────────────────────────────── Paused ◀──pause──────┘ │
//!                                               └──────play───────────┘
//! ```

use cadence_core::{QueueEdge, RepeatMode, Track, TrackId};
use cadence_storage::KeyValueStore;
use tracing::{debug, info, warn};

use crate::{
    config::PlaybackConfig,
    engine::{AudioEngine, EngineEvent, LoadTicket},
    error::{PlaybackError, Result},
    events::{PlaybackEvent, PreviewStopReason},
    policy::PlaybackPolicy,
    preview::PreviewPlayer,
    queue::Queue,
    resolver::resolve_source,
    resume::ResumeManager,
    settings::PlaybackSettings,
    types::PlaybackState,
};

/// Load issued to the engine and not yet answered
#[derive(Debug, Clone)]
struct PendingLoad {
    ticket: LoadTicket,

    /// Position to seek to once ready
    start_at: f64,

    /// Whether `start_at` came from the resume checkpoint
    resumed: bool,

    /// Quality label the resolver picked
    quality: String,
}

/// Source the engine reported ready
#[derive(Debug, Clone)]
struct LoadedSource {
    ticket: LoadTicket,
    quality: String,
    duration: Option<f64>,
}

/// Where a load should start
#[derive(Debug, Clone, Copy)]
enum LoadStart {
    /// New track identity: position 0, subject to resume
    Fresh,
    /// Same track reloaded (quality change, retry)
    KeepPosition(f64),
    /// Same track reloaded before a resumed start was applied
    Resumed(f64),
}

/// Central playback management
///
/// Orchestrates:
/// - Queue snapshots (replace, insert-next, append, reorder, remove, move)
/// - Source resolution with quality fallback
/// - Shuffle/repeat navigation and end-of-track handling
/// - Volume, mute and quality preferences (persisted)
/// - One-shot resume across restarts
/// - Preview playback on a second engine
pub struct PlaybackManager<E: AudioEngine> {
    // Output
    engine: E,
    preview: Option<PreviewPlayer<Box<dyn AudioEngine>>>,
    preview_limit_secs: f64,

    // Persistence
    store: Box<dyn KeyValueStore>,
    settings: PlaybackSettings,
    resume: ResumeManager,

    // Queue and navigation
    queue: Queue,
    policy: PlaybackPolicy,

    // Transport
    state: PlaybackState,
    wants_playback: bool,
    pending: Option<PendingLoad>,
    loaded: Option<LoadedSource>,
    generation: u64,
    position: f64,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl<E: AudioEngine> PlaybackManager<E> {
    /// Create new playback manager
    ///
    /// Reads settings and the resume checkpoint from `store` once, then
    /// brings the engine's volume and loop flag in line with them.
    pub fn new<S>(mut engine: E, store: S, config: &PlaybackConfig) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let settings = PlaybackSettings::load(&store, &config.default_settings());
        let resume = ResumeManager::load(&store, config.resume_enabled);
        let queue = Queue::new()
            .with_shuffle(config.shuffle)
            .with_repeat(config.repeat);

        engine.set_volume(settings.effective_volume());
        engine.set_loop(config.repeat == RepeatMode::One);

        debug!(
            "Playback manager ready (volume {:.2}, quality {}, muted {})",
            settings.volume, settings.quality, settings.muted
        );

        Self {
            engine,
            preview: None,
            preview_limit_secs: config.preview_limit_secs,
            store: Box::new(store),
            settings,
            resume,
            queue,
            policy: PlaybackPolicy::new(),
            state: PlaybackState::Idle,
            wants_playback: false,
            pending: None,
            loaded: None,
            generation: 0,
            position: 0.0,
            pending_events: Vec::new(),
        }
    }

    /// Replace the shuffle RNG (deterministic tests)
    #[must_use]
    pub fn with_policy(mut self, policy: PlaybackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a second engine for previews
    #[must_use]
    pub fn with_preview_engine(mut self, engine: impl AudioEngine + 'static) -> Self {
        let mut preview = PreviewPlayer::with_limit(
            Box::new(engine) as Box<dyn AudioEngine>,
            self.preview_limit_secs,
        );
        preview.set_volume(self.settings.effective_volume());
        self.preview = Some(preview);
        self
    }

    // ===== Queue Management =====

    /// Replace the queue with a collection and start playing it
    ///
    /// Playback starts at `start` if it is in `tracks`, otherwise at the
    /// first track.
    pub fn play_collection(&mut self, tracks: Vec<Track>, start: Option<&TrackId>) {
        let next = self.queue.replace(tracks, start);
        self.wants_playback = !next.is_empty();
        self.commit_queue(next, true);
    }

    /// Queue `track` right after the current one
    ///
    /// On an empty queue the track becomes current and starts playing.
    pub fn insert_next(&mut self, track: Track) {
        if self.queue.current_index().is_none() {
            self.wants_playback = true;
        }
        let next = self.queue.insert_next(track);
        self.commit_queue(next, false);
    }

    /// Append tracks that are not already queued
    ///
    /// On an empty queue the first appended track becomes current but does
    /// not start playing.
    pub fn append_many(&mut self, tracks: impl IntoIterator<Item = Track>) {
        let next = self.queue.append_many(tracks);
        if next.len() == self.queue.len() {
            return;
        }
        self.commit_queue(next, false);
    }

    /// Move the entry at `from` to `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let next = self.queue.reorder(from, to)?;
        self.commit_queue(next, false);
        Ok(())
    }

    /// Remove every entry with `id`
    ///
    /// If the current track goes, its successor is loaded in its place and
    /// playback intent carries over.
    pub fn remove_by_id(&mut self, id: &TrackId) {
        if !self.queue.contains(id) {
            return;
        }
        let next = self.queue.remove_by_id(id);
        self.commit_queue(next, false);
    }

    /// Move the first entry with `id` to the top or bottom of the queue
    pub fn move_to_edge(&mut self, id: &TrackId, edge: QueueEdge) {
        if !self.queue.contains(id) {
            return;
        }
        let next = self.queue.move_to_edge(id, edge);
        self.commit_queue(next, false);
    }

    /// Remove every entry and go idle
    pub fn clear(&mut self) {
        let next = self.queue.clear();
        self.commit_queue(next, false);
    }

    /// Skip to the queue entry at `index` and play it
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.skip_to(index)
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// No-op without a current track. While loading, records the intent so
    /// playback starts once the engine is ready.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Idle | PlaybackState::Playing => {}
            PlaybackState::Loading => self.wants_playback = true,
            PlaybackState::Paused => {
                self.wants_playback = true;
                if self.loaded.is_some() {
                    self.start_engine();
                } else {
                    // Previous load failed or was unplayable
                    self.load_current(LoadStart::KeepPosition(self.position));
                }
            }
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        match self.state {
            PlaybackState::Idle => {}
            PlaybackState::Loading | PlaybackState::Paused => self.wants_playback = false,
            PlaybackState::Playing => {
                self.wants_playback = false;
                self.engine.pause();
                self.set_state(PlaybackState::Paused);
            }
        }
    }

    /// Toggle between playing and paused
    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlaybackState::Idle => {}
            PlaybackState::Loading => self.wants_playback = !self.wants_playback,
            PlaybackState::Paused => self.play(),
            PlaybackState::Playing => self.pause(),
        }
    }

    /// Skip to next track
    ///
    /// Always wraps at the end of the queue; repeat mode only affects what
    /// happens when a track ends on its own.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<()> {
        let index = self.policy.next(&self.queue).ok_or(PlaybackError::QueueEmpty)?;
        self.skip_to(index)
    }

    /// Go to previous track
    pub fn previous(&mut self) -> Result<()> {
        let index = self.policy.prev(&self.queue).ok_or(PlaybackError::QueueEmpty)?;
        self.skip_to(index)
    }

    // ===== Seek =====

    /// Seek to `seconds` in the current track
    ///
    /// The target is clamped to `[0, duration]` and returned. State does not
    /// change. While loading, the target is applied once the engine is ready.
    pub fn seek(&mut self, seconds: f64) -> Result<f64> {
        if !seconds.is_finite() {
            return Err(PlaybackError::InvalidOperation(format!(
                "Invalid seek target: {}",
                seconds
            )));
        }

        let target = self.clamp_position(seconds);
        match self.state {
            PlaybackState::Idle => return Err(PlaybackError::NoTrackLoaded),
            PlaybackState::Loading => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.start_at = target;
                    pending.resumed = false;
                }
            }
            PlaybackState::Paused | PlaybackState::Playing => {
                if self.loaded.is_none() {
                    return Err(PlaybackError::NoTrackLoaded);
                }
                self.engine.set_current_time(target);
            }
        }

        self.position = target;
        Ok(target)
    }

    /// Seek to a fraction (0.0 - 1.0) of the current track
    pub fn seek_to_percent(&mut self, percent: f64) -> Result<f64> {
        if self.state == PlaybackState::Idle {
            return Err(PlaybackError::NoTrackLoaded);
        }
        let duration = self.duration().ok_or_else(|| {
            PlaybackError::InvalidOperation("Track duration is unknown".to_string())
        })?;

        let percent = if percent.is_finite() {
            percent.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek(duration * percent)
    }

    // ===== Volume & Quality =====

    /// Set volume (0.0 - 1.0)
    ///
    /// Out-of-range values are clamped and NaN is ignored. Mute state is
    /// kept.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !self.settings.set_volume(volume) {
            return Ok(());
        }
        self.apply_volume();
        self.persist_settings()
    }

    /// Mute audio (keeps the stored volume)
    pub fn mute(&mut self) -> Result<()> {
        self.set_muted(true)
    }

    /// Unmute audio
    pub fn unmute(&mut self) -> Result<()> {
        self.set_muted(false)
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) -> Result<()> {
        self.set_muted(!self.settings.muted)
    }

    /// Change the preferred quality label
    ///
    /// If the current track would resolve to a different source, it is
    /// reloaded at the same position.
    pub fn set_quality(&mut self, label: &str) -> Result<()> {
        let label = label.trim();
        if label.is_empty() {
            return Err(PlaybackError::InvalidOperation(
                "Quality label must not be empty".to_string(),
            ));
        }
        if label == self.settings.quality {
            return Ok(());
        }

        info!("Quality preference: {} -> {}", self.settings.quality, label);
        self.settings.quality = label.to_string();
        self.reload_for_quality();
        self.persist_settings()
    }

    // ===== Shuffle & Repeat =====

    /// Set shuffle on or off
    pub fn set_shuffle(&mut self, shuffle: bool) {
        if self.queue.shuffle() == shuffle {
            return;
        }
        self.queue = self.queue.with_shuffle(shuffle);
        self.emit_modes_changed();
    }

    /// Flip shuffle, returning the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        let shuffle = !self.queue.shuffle();
        self.set_shuffle(shuffle);
        shuffle
    }

    /// Set repeat mode
    ///
    /// The engine loops the source exactly when the mode is `One`.
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.queue.repeat_mode() == mode {
            return;
        }
        self.queue = self.queue.with_repeat(mode);
        self.engine.set_loop(mode == RepeatMode::One);
        self.emit_modes_changed();
    }

    /// Advance repeat mode `off -> all -> one -> off`, returning the new mode
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        let mode = self.queue.repeat_mode().cycle();
        self.set_repeat(mode);
        mode
    }

    // ===== Preview =====

    /// Preview `track` on the preview engine
    ///
    /// Pauses main playback first.
    pub fn start_preview(&mut self, track: &Track) -> Result<()> {
        if self.preview.is_none() {
            return Err(PlaybackError::InvalidOperation(
                "No preview engine attached".to_string(),
            ));
        }

        self.pause();

        let result = match self.preview.as_mut() {
            Some(preview) => preview.start(track, &self.settings.quality),
            None => Ok(()),
        };
        self.collect_preview_events();
        result
    }

    /// Stop the running preview
    ///
    /// Returns whether a preview was running.
    pub fn stop_preview(&mut self) -> bool {
        self.stop_preview_with(PreviewStopReason::Stopped)
    }

    /// Feed a notification from the preview engine
    pub fn handle_preview_event(&mut self, event: EngineEvent) {
        if let Some(preview) = self.preview.as_mut() {
            preview.handle_event(event);
        }
        self.collect_preview_events();
    }

    /// Whether a preview is loading or playing
    pub fn is_previewing(&self) -> bool {
        self.preview.as_ref().is_some_and(PreviewPlayer::is_active)
    }

    // ===== Engine Notifications =====

    /// Feed a notification from the main engine
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Ready { ticket, duration } => self.on_ready(ticket, duration),
            EngineEvent::LoadFailed { ticket, message } => self.on_load_failed(&ticket, message),
            EngineEvent::Progressed { time } => self.on_progressed(time),
            EngineEvent::Ended => self.on_ended(),
            EngineEvent::PlayStateChanged { playing } => self.on_play_state_changed(playing),
        }
    }

    // ===== Lifecycle =====

    /// Write the resume checkpoint and stop any preview
    ///
    /// Call once at process teardown.
    pub fn shutdown(&mut self) -> Result<()> {
        self.stop_preview_with(PreviewStopReason::Stopped);

        let Some(track_id) = self.queue.current_track().map(|t| t.id.clone()) else {
            debug!("Shutdown with empty queue, no resume checkpoint");
            return Ok(());
        };

        let position = match (&self.pending, &self.loaded) {
            (Some(pending), _) => pending.start_at,
            (None, Some(_)) => self.engine.current_time(),
            (None, None) => self.position,
        };

        ResumeManager::save(&mut *self.store, &track_id, position)?;
        info!("Saved resume point {} @ {:.1}s", track_id, position);
        Ok(())
    }

    /// Take the engine and store back (after [`shutdown`](Self::shutdown))
    pub fn into_parts(self) -> (E, Box<dyn KeyValueStore>) {
        (self.engine, self.store)
    }

    // ===== State Queries =====

    /// Get current transport state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Get current queue snapshot
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Get current track
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current_track()
    }

    /// Get listener settings
    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Last known position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration of the current track in seconds, if known
    ///
    /// Prefers what the engine reported over the catalog value.
    pub fn duration(&self) -> Option<f64> {
        self.loaded
            .as_ref()
            .and_then(|l| l.duration)
            .or_else(|| self.current_track().and_then(|t| t.duration_seconds))
    }

    /// Quality label of the loaded (or loading) source
    pub fn active_quality(&self) -> Option<&str> {
        match (&self.pending, &self.loaded) {
            (Some(pending), _) => Some(&pending.quality),
            (None, Some(loaded)) => Some(&loaded.quality),
            (None, None) => None,
        }
    }

    /// Ticket of the load the manager is waiting on
    pub fn pending_load(&self) -> Option<&LoadTicket> {
        self.pending.as_ref().map(|p| &p.ticket)
    }

    /// Whether playback should start once loading finishes
    pub fn wants_playback(&self) -> bool {
        self.wants_playback
    }

    /// Get engine reference
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get mutable engine reference
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Get settings store reference
    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    /// Get and clear pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    /// Swap in `next` and react to a change of current track
    ///
    /// `restart` reloads the current track even if its id did not change
    /// (explicit selection of the same track).
    fn commit_queue(&mut self, next: Queue, restart: bool) {
        let previous_id = self.queue.current_track().map(|t| t.id.clone());
        self.queue = next;

        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            current_index: self.queue.current_index(),
        });

        let Some(current_id) = self.queue.current_track().map(|t| t.id.clone()) else {
            if self.state != PlaybackState::Idle || self.pending.is_some() {
                self.become_idle();
            }
            return;
        };

        let changed = previous_id.as_ref() != Some(&current_id);
        if changed {
            self.emit(PlaybackEvent::TrackChanged {
                track_id: current_id,
                previous_track_id: previous_id,
            });
        }

        if changed || restart {
            self.load_current(LoadStart::Fresh);
        }
    }

    fn skip_to(&mut self, index: usize) -> Result<()> {
        let next = self.queue.select(index)?;
        self.wants_playback = true;
        self.commit_queue(next, true);
        Ok(())
    }

    /// Resolve and load the current track
    fn load_current(&mut self, start: LoadStart) {
        let Some(track) = self.queue.current_track().cloned() else {
            self.become_idle();
            return;
        };

        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            track_id: track.id.clone(),
        };

        let (start_at, resumed) = match start {
            LoadStart::Fresh => match self.resume.take_start_position(&track.id) {
                Some(position) => (position, true),
                None => (0.0, false),
            },
            LoadStart::KeepPosition(position) => (position, false),
            LoadStart::Resumed(position) => (position, true),
        };

        self.loaded = None;
        self.position = start_at;

        let Some(source) = resolve_source(&track, &self.settings.quality) else {
            warn!("No playable source for {}", track.id);
            self.pending = None;
            self.engine.pause();
            self.emit(PlaybackEvent::TrackUnplayable { track_id: track.id });
            self.set_state(PlaybackState::Paused);
            return;
        };

        if source.is_fallback() {
            debug!(
                "{}: {} unavailable, using {}",
                track.id, source.requested, source.quality
            );
        }
        self.emit(PlaybackEvent::SourceResolved {
            track_id: track.id.clone(),
            quality: source.quality.clone(),
            fallback: source.is_fallback(),
        });

        info!("Loading {} ({}) [gen {}]", track.id, source.quality, self.generation);
        self.pending = Some(PendingLoad {
            ticket: ticket.clone(),
            start_at,
            resumed,
            quality: source.quality,
        });
        self.set_state(PlaybackState::Loading);
        self.engine.load(&source.url, ticket);
    }

    fn reload_for_quality(&mut self) {
        let Some(track) = self.queue.current_track() else {
            return;
        };
        if self.state == PlaybackState::Idle {
            return;
        }

        let resolved = resolve_source(track, &self.settings.quality).map(|s| s.quality);
        if resolved.is_some() && resolved.as_deref() == self.active_quality() {
            debug!("Quality change resolves to the active source, not reloading");
            return;
        }

        let start = match (&self.pending, &self.loaded) {
            (Some(pending), _) if pending.resumed => LoadStart::Resumed(pending.start_at),
            (Some(pending), _) => LoadStart::KeepPosition(pending.start_at),
            (None, Some(_)) => LoadStart::KeepPosition(self.engine.current_time()),
            (None, None) => LoadStart::KeepPosition(self.position),
        };
        self.load_current(start);
    }

    fn become_idle(&mut self) {
        debug!("Queue empty, going idle");
        self.pending = None;
        self.loaded = None;
        self.wants_playback = false;
        self.position = 0.0;
        self.engine.pause();
        self.set_state(PlaybackState::Idle);
    }

    /// Ask the engine to play, reverting to paused if it refuses
    fn start_engine(&mut self) {
        self.stop_preview_with(PreviewStopReason::MainPlayback);

        match self.engine.play() {
            Ok(()) => self.set_state(PlaybackState::Playing),
            Err(e) => {
                warn!("Engine refused to play: {}", e);
                self.wants_playback = false;
                self.emit(PlaybackEvent::PlayRejected {
                    message: e.to_string(),
                });
                self.set_state(PlaybackState::Paused);
            }
        }
    }

    fn on_ready(&mut self, ticket: LoadTicket, duration: Option<f64>) {
        if !self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            debug!("Discarding stale ready: {:?}", ticket);
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        let duration = duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .or_else(|| self.current_track().and_then(|t| t.duration_seconds));
        let track_id = ticket.track_id.clone();
        self.loaded = Some(LoadedSource {
            ticket,
            quality: pending.quality,
            duration,
        });

        if pending.start_at > 0.0 {
            let target = self.clamp_position(pending.start_at);
            self.engine.set_current_time(target);
            self.position = target;
            if pending.resumed {
                self.emit(PlaybackEvent::ResumeApplied {
                    track_id,
                    position_seconds: target,
                });
            }
        } else {
            self.position = 0.0;
        }

        if self.wants_playback {
            self.start_engine();
        } else {
            self.set_state(PlaybackState::Paused);
        }
    }

    fn on_load_failed(&mut self, ticket: &LoadTicket, message: String) {
        if !self.pending.as_ref().is_some_and(|p| &p.ticket == ticket) {
            debug!("Discarding stale load failure: {:?}", ticket);
            return;
        }

        warn!("Load failed for {}: {}", ticket.track_id, message);
        self.pending = None;
        self.loaded = None;
        self.emit(PlaybackEvent::LoadFailed {
            track_id: ticket.track_id.clone(),
            message,
        });
        self.set_state(PlaybackState::Paused);
    }

    fn on_progressed(&mut self, time: f64) {
        if self.loaded.is_none() || !time.is_finite() {
            return;
        }

        self.position = time;
        self.emit(PlaybackEvent::PositionUpdate {
            position: time,
            duration: self.duration(),
        });
    }

    fn on_play_state_changed(&mut self, playing: bool) {
        if self.loaded.is_none() {
            return;
        }

        self.wants_playback = playing;
        if playing {
            self.stop_preview_with(PreviewStopReason::MainPlayback);
            self.set_state(PlaybackState::Playing);
        } else {
            self.set_state(PlaybackState::Paused);
        }
    }

    fn on_ended(&mut self) {
        if self.loaded.is_none() || !self.state.has_source() {
            debug!("Ignoring ended without a loaded source");
            return;
        }

        let repeat = self.queue.repeat_mode();
        if repeat == RepeatMode::One {
            self.engine.set_current_time(0.0);
            self.position = 0.0;
            self.wants_playback = true;
            self.start_engine();
            return;
        }

        let target = if self.queue.shuffle() {
            self.policy.next(&self.queue)
        } else if repeat == RepeatMode::Off && self.queue.is_at_last() {
            info!("Reached end of queue");
            self.engine.pause();
            self.engine.set_current_time(0.0);
            self.position = 0.0;
            self.wants_playback = false;
            self.set_state(PlaybackState::Paused);
            return;
        } else {
            self.queue
                .current_index()
                .map(|c| (c + 1) % self.queue.len())
        };

        if let Some(index) = target {
            // Engines may report a pause right before ended
            self.wants_playback = true;
            match self.queue.select(index) {
                Ok(next) => self.commit_queue(next, true),
                Err(e) => warn!("Cannot advance after ended: {}", e),
            }
        }
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        if self.settings.muted == muted {
            return Ok(());
        }
        self.settings.muted = muted;
        self.apply_volume();
        self.persist_settings()
    }

    fn apply_volume(&mut self) {
        let effective = self.settings.effective_volume();
        self.engine.set_volume(effective);
        if let Some(preview) = self.preview.as_mut() {
            preview.set_volume(effective);
        }
        self.emit(PlaybackEvent::VolumeChanged {
            volume: self.settings.volume,
            muted: self.settings.muted,
        });
    }

    fn persist_settings(&mut self) -> Result<()> {
        self.settings.save(&mut *self.store)
    }

    fn stop_preview_with(&mut self, reason: PreviewStopReason) -> bool {
        let stopped = self
            .preview
            .as_mut()
            .is_some_and(|preview| preview.stop(reason));
        self.collect_preview_events();
        stopped
    }

    fn collect_preview_events(&mut self) {
        if let Some(preview) = self.preview.as_mut() {
            self.pending_events.extend(preview.drain_events());
        }
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        let seconds = seconds.max(0.0);
        match self.duration() {
            Some(duration) => seconds.min(duration),
            None => seconds,
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        debug!("Playback state: {} -> {}", self.state, state);
        self.state = state;
        self.emit(PlaybackEvent::StateChanged { state });
    }

    fn emit_modes_changed(&mut self) {
        self.emit(PlaybackEvent::ModesChanged {
            shuffle: self.queue.shuffle(),
            repeat: self.queue.repeat_mode(),
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }
}
