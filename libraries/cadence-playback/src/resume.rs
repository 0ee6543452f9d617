//! Cross-session resume
//!
//! A single `(track, position)` checkpoint is written when the manager shuts
//! down and read once when it starts. The first track that becomes current
//! afterwards consumes it: if ids match, playback seeks to the stored
//! position once the engine reports ready, otherwise it starts at 0 and the
//! checkpoint is dropped.

use cadence_core::TrackId;
use cadence_storage::{settings as store_settings, KeyValueStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Persisted resume point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCheckpoint {
    /// Track that was current at shutdown
    pub track_id: TrackId,

    /// Engine time at shutdown, in seconds
    pub position_seconds: f64,
}

/// One-shot resume state for a manager's lifetime
#[derive(Debug, Clone, Default)]
pub struct ResumeManager {
    checkpoint: Option<ResumeCheckpoint>,
    consumed: bool,
}

impl ResumeManager {
    /// Read the checkpoint from `store`
    ///
    /// Missing or malformed checkpoints, and negative or non-finite
    /// positions, are treated as absent.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let key = store_settings::SETTING_RESUME_CHECKPOINT;
        let checkpoint = match store_settings::get_setting::<ResumeCheckpoint, S>(store, key) {
            Ok(Some(cp)) if cp.position_seconds.is_finite() && cp.position_seconds >= 0.0 => {
                debug!(
                    "Loaded resume checkpoint: {} @ {:.1}s",
                    cp.track_id, cp.position_seconds
                );
                Some(cp)
            }
            Ok(Some(cp)) => {
                warn!(
                    "Ignoring resume checkpoint with invalid position: {}",
                    cp.position_seconds
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring stored resume checkpoint: {}", e);
                None
            }
        };

        Self {
            checkpoint,
            consumed: false,
        }
    }

    /// Resume state that never applies a checkpoint
    pub fn disabled() -> Self {
        Self {
            checkpoint: None,
            consumed: true,
        }
    }

    /// Start position for the first track loaded in this session
    ///
    /// The checkpoint is consumed by the first call whether or not `track_id`
    /// matches; later calls always return `None`.
    pub fn take_start_position(&mut self, track_id: &TrackId) -> Option<f64> {
        if self.consumed {
            return None;
        }
        self.consumed = true;

        let checkpoint = self.checkpoint.take()?;
        if &checkpoint.track_id == track_id {
            info!(
                "Resuming {} at {:.1}s",
                track_id, checkpoint.position_seconds
            );
            Some(checkpoint.position_seconds)
        } else {
            debug!(
                "Resume checkpoint for {} does not match {}, starting at 0",
                checkpoint.track_id, track_id
            );
            None
        }
    }

    /// Checkpoint still waiting to be applied
    pub fn checkpoint(&self) -> Option<&ResumeCheckpoint> {
        self.checkpoint.as_ref()
    }

    /// Overwrite the stored checkpoint
    ///
    /// # Errors
    /// Returns an error if the store write fails.
    pub fn save<S: KeyValueStore + ?Sized>(
        store: &mut S,
        track_id: &TrackId,
        position_seconds: f64,
    ) -> Result<()> {
        let checkpoint = ResumeCheckpoint {
            track_id: track_id.clone(),
            position_seconds: if position_seconds.is_finite() {
                position_seconds.max(0.0)
            } else {
                0.0
            },
        };

        store_settings::set_setting(
            store,
            store_settings::SETTING_RESUME_CHECKPOINT,
            &checkpoint,
        )?;
        debug!(
            "Saved resume checkpoint: {} @ {:.1}s",
            checkpoint.track_id, checkpoint.position_seconds
        );
        Ok(())
    }
}
