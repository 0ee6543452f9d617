//! Error types for playback management

use cadence_core::TrackId;
use cadence_storage::StorageError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently selected
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// No source candidate could be resolved for the track
    #[error("Track unplayable: {0}")]
    Unplayable(TrackId),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Persistent store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
