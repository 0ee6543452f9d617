//! Persisted playback settings
//!
//! Volume, preferred quality label and mute flag live under a single store
//! key and are rewritten whenever one of them changes. Muting keeps the
//! stored volume so unmuting restores it.

use cadence_core::quality;
use cadence_storage::{settings as store_settings, KeyValueStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Default output volume
pub const DEFAULT_VOLUME: f32 = 0.8;

/// Listener playback preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Output volume (0.0 - 1.0)
    pub volume: f32,

    /// Preferred quality label
    pub quality: String,

    /// Whether output is muted
    pub muted: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            quality: quality::HIGH.to_string(),
            muted: false,
        }
    }
}

impl PlaybackSettings {
    /// Read settings from `store`, falling back to `defaults`
    ///
    /// Missing, unreadable or malformed values are never fatal. Out-of-range
    /// volumes are clamped and an empty quality label is replaced.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, defaults: &Self) -> Self {
        let key = store_settings::SETTING_PLAYBACK;
        let stored = match store_settings::get_setting::<Self, S>(store, key) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!("No stored playback settings, using defaults");
                return defaults.clone();
            }
            Err(e) => {
                warn!("Ignoring stored playback settings: {}", e);
                return defaults.clone();
            }
        };

        stored.sanitized(defaults)
    }

    /// Write settings to `store`
    ///
    /// # Errors
    /// Returns an error if the store write fails.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store_settings::set_setting(store, store_settings::SETTING_PLAYBACK, self)?;
        Ok(())
    }

    /// Volume the engine should receive (0.0 while muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Set volume, clamped to 0.0 - 1.0
    ///
    /// Non-finite values are ignored. Returns whether the value changed.
    pub fn set_volume(&mut self, volume: f32) -> bool {
        if !volume.is_finite() {
            return false;
        }

        let volume = volume.clamp(0.0, 1.0);
        let changed = (volume - self.volume).abs() > f32::EPSILON;
        self.volume = volume;
        changed
    }

    fn sanitized(mut self, defaults: &Self) -> Self {
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            defaults.volume
        };

        if self.quality.trim().is_empty() {
            self.quality.clone_from(&defaults.quality);
        }

        self
    }
}
