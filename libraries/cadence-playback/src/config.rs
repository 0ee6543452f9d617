//! Playback configuration
//!
//! Startup defaults for a [`PlaybackManager`](crate::PlaybackManager). Values
//! come from an optional TOML file overridden by `CADENCE_`-prefixed
//! environment variables (`CADENCE_VOLUME=0.5`, `CADENCE_REPEAT=all`,
//! `CADENCE_STORE_PATH=/var/lib/cadence/state.json`).
//!
//! Stored listener settings take precedence over `volume` and `quality`;
//! the config only supplies the first-run values.

use std::path::{Path, PathBuf};

use cadence_core::{quality, RepeatMode};
use cadence_storage::{FileStore, KeyValueStore, MemoryStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlaybackError, Result};
use crate::preview::DEFAULT_PREVIEW_LIMIT_SECS;
use crate::settings::{PlaybackSettings, DEFAULT_VOLUME};

/// Manager startup configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// First-run output volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// First-run preferred quality label
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Initial shuffle flag
    #[serde(default)]
    pub shuffle: bool,

    /// Initial repeat mode
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Apply the stored resume checkpoint on startup
    #[serde(default = "default_resume_enabled")]
    pub resume_enabled: bool,

    /// Preview length cap in seconds
    #[serde(default = "default_preview_limit_secs")]
    pub preview_limit_secs: f64,

    /// JSON file backing the settings store; in-memory when unset
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl PlaybackConfig {
    /// Load configuration from file and environment
    ///
    /// `path` is optional; a missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = ::config::Config::builder();

        if let Some(path) = path {
            debug!("Reading playback config from {}", path.display());
            settings = settings.add_source(::config::File::from(path).required(false));
        }

        // Override with environment variables (prefixed with CADENCE_)
        settings = settings.add_source(
            ::config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::Config(format!(
                "volume must be between 0.0 and 1.0, got {}",
                self.volume
            )));
        }

        if self.quality.trim().is_empty() {
            return Err(PlaybackError::Config(
                "quality label must not be empty".to_string(),
            ));
        }

        if !self.preview_limit_secs.is_finite() || self.preview_limit_secs <= 0.0 {
            return Err(PlaybackError::Config(format!(
                "preview_limit_secs must be positive, got {}",
                self.preview_limit_secs
            )));
        }

        Ok(())
    }

    /// Settings used when the store has none
    pub fn default_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            volume: self.volume,
            quality: self.quality.clone(),
            muted: false,
        }
    }

    /// Open the configured settings store
    ///
    /// A file store when `store_path` is set, otherwise an in-memory one.
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        match &self.store_path {
            Some(path) => Ok(Box::new(FileStore::open(path)?)),
            None => Ok(Box::new(MemoryStore::new())),
        }
    }
}

// Default values
fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_quality() -> String {
    quality::HIGH.to_string()
}

fn default_resume_enabled() -> bool {
    true
}

fn default_preview_limit_secs() -> f64 {
    DEFAULT_PREVIEW_LIMIT_SECS
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            quality: default_quality(),
            shuffle: false,
            repeat: RepeatMode::Off,
            resume_enabled: default_resume_enabled(),
            preview_limit_secs: default_preview_limit_secs(),
            store_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("cadence.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn default_config_is_valid() {
        let config = PlaybackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quality, "320kbps");
        assert!(config.resume_enabled);
        assert!((config.preview_limit_secs - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn loads_values_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
volume = 0.4
quality = "160kbps"
shuffle = true
repeat = "all"
resume_enabled = false
preview_limit_secs = 15.0
store_path = "/tmp/cadence-state.json"
"#,
        );

        let config = PlaybackConfig::load(Some(&path)).unwrap();
        assert!((config.volume - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.quality, "160kbps");
        assert!(config.shuffle);
        assert_eq!(config.repeat, RepeatMode::All);
        assert!(!config.resume_enabled);
        assert!((config.preview_limit_secs - 15.0).abs() < f64::EPSILON);
        assert_eq!(
            config.store_path,
            Some(PathBuf::from("/tmp/cadence-state.json"))
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "repeat = \"one\"\n");

        let config = PlaybackConfig::load(Some(&path)).unwrap();
        assert_eq!(config.repeat, RepeatMode::One);
        assert_eq!(config.quality, "320kbps");
        assert!(config.resume_enabled);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(PlaybackConfig::load(Some(&path)).is_ok());
    }

    #[test]
    fn out_of_range_volume_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "volume = 1.5\n");

        assert!(matches!(
            PlaybackConfig::load(Some(&path)),
            Err(PlaybackError::Config(_))
        ));
    }

    #[test]
    fn bad_repeat_mode_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "repeat = \"sometimes\"\n");
        assert!(PlaybackConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn validate_rejects_bad_preview_limit() {
        let config = PlaybackConfig {
            preview_limit_secs: 0.0,
            ..PlaybackConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn open_store_uses_file_when_configured() {
        let dir = TempDir::new().unwrap();
        let config = PlaybackConfig {
            store_path: Some(dir.path().join("state.json")),
            ..PlaybackConfig::default()
        };

        let mut store = config.open_store().unwrap();
        store.set("k", "v").unwrap();
        assert!(dir.path().join("state.json").exists());
    }
}
