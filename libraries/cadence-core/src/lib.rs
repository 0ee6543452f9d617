//! Cadence Core
//!
//! Domain types shared by every Cadence crate.
//!
//! This crate provides:
//! - **Identity**: `TrackId`, the catalog identifier every queue operation keys on
//! - **Catalog values**: `Track` and its `SourceCandidate` list, as handed over
//!   by the catalog data source
//! - **Playback modes**: `RepeatMode` (with its fixed 3-cycle) and `QueueEdge`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{RepeatMode, Track, quality};
//!
//! let track = Track::new("trk-1", "Blue in Green")
//!     .with_artist("Miles Davis")
//!     .with_duration(337.0)
//!     .with_source(quality::HIGH, "https://cdn.example.com/trk-1/320.mp3");
//!
//! assert_eq!(track.id.as_str(), "trk-1");
//! assert_eq!(RepeatMode::Off.cycle(), RepeatMode::All);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{quality, QueueEdge, RepeatMode, SourceCandidate, Track, TrackId};
