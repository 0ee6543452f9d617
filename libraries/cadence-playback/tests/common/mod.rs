//! Shared test infrastructure for playback integration tests

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Once;

use cadence_core::{quality, Track};
use cadence_playback::{
    AudioEngine, EngineError, EngineEvent, LoadTicket, PlaybackConfig, PlaybackManager,
    PlaybackPolicy,
};
use cadence_storage::{KeyValueStore, MemoryStore};

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Everything a [`FakeEngine`] was asked to do
#[derive(Debug, Default)]
pub struct EngineLog {
    pub loads: Vec<(String, LoadTicket)>,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub seeks: Vec<f64>,
    pub current_time: f64,
    pub volume: f32,
    pub looping: bool,
    pub playing: bool,
    pub reject_play: bool,
}

/// Scriptable engine; clones share one log so tests can keep a handle
/// after moving the engine into a manager
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    log: Rc<RefCell<EngineLog>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Ref<'_, EngineLog> {
        self.log.borrow()
    }

    pub fn last_ticket(&self) -> LoadTicket {
        self.log
            .borrow()
            .loads
            .last()
            .map(|(_, ticket)| ticket.clone())
            .expect("engine has not been asked to load anything")
    }

    pub fn last_url(&self) -> String {
        self.log
            .borrow()
            .loads
            .last()
            .map(|(url, _)| url.clone())
            .expect("engine has not been asked to load anything")
    }

    pub fn load_count(&self) -> usize {
        self.log.borrow().loads.len()
    }

    pub fn is_playing(&self) -> bool {
        self.log.borrow().playing
    }

    pub fn volume(&self) -> f32 {
        self.log.borrow().volume
    }

    pub fn looping(&self) -> bool {
        self.log.borrow().looping
    }

    pub fn current_time(&self) -> f64 {
        self.log.borrow().current_time
    }

    /// Simulate playback advancing without going through the manager
    pub fn set_time(&self, seconds: f64) {
        self.log.borrow_mut().current_time = seconds;
    }

    pub fn reject_play(&self, reject: bool) {
        self.log.borrow_mut().reject_play = reject;
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, url: &str, ticket: LoadTicket) {
        let mut log = self.log.borrow_mut();
        log.loads.push((url.to_string(), ticket));
        log.current_time = 0.0;
        log.playing = false;
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let mut log = self.log.borrow_mut();
        log.play_calls += 1;
        if log.reject_play {
            return Err(EngineError::PlayRejected(
                "user gesture required".to_string(),
            ));
        }
        log.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.log.borrow_mut();
        log.pause_calls += 1;
        log.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.log.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut log = self.log.borrow_mut();
        log.seeks.push(seconds);
        log.current_time = seconds;
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.borrow_mut().volume = volume;
    }

    fn set_loop(&mut self, looping: bool) {
        self.log.borrow_mut().looping = looping;
    }
}

/// Track with all three standard qualities and a 200 s duration
pub fn track(id: &str) -> Track {
    Track::new(id, format!("Track {}", id))
        .with_artist("Test Artist")
        .with_duration(200.0)
        .with_source(quality::HIGH, format!("https://cdn.test/{}/320.mp3", id))
        .with_source(quality::MEDIUM, format!("https://cdn.test/{}/160.mp3", id))
        .with_source(quality::LOW, format!("https://cdn.test/{}/96.mp3", id))
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

/// Manager over a fresh memory store with a fixed shuffle seed
pub fn manager(engine: &FakeEngine) -> PlaybackManager<FakeEngine> {
    manager_with(engine, MemoryStore::new(), &PlaybackConfig::default())
}

pub fn manager_with<S: KeyValueStore + 'static>(
    engine: &FakeEngine,
    store: S,
    config: &PlaybackConfig,
) -> PlaybackManager<FakeEngine> {
    init_tracing();
    PlaybackManager::new(engine.clone(), store, config).with_policy(PlaybackPolicy::seeded(1234))
}

/// Answer the most recent load with `Ready`
pub fn ready(manager: &mut PlaybackManager<FakeEngine>, engine: &FakeEngine) {
    manager.handle_engine_event(EngineEvent::Ready {
        ticket: engine.last_ticket(),
        duration: Some(200.0),
    });
}

/// Manager already playing `ids` from the first track
pub fn playing(engine: &FakeEngine, ids: &[&str]) -> PlaybackManager<FakeEngine> {
    let mut manager = manager(engine);
    manager.play_collection(tracks(ids), None);
    ready(&mut manager, engine);
    manager.drain_events();
    manager
}

pub fn current_id(manager: &PlaybackManager<FakeEngine>) -> Option<String> {
    manager.current_track().map(|t| t.id.to_string())
}
