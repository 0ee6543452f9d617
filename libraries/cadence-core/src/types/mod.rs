//! Domain types

mod ids;
mod playback_mode;
mod track;

pub use ids::TrackId;
pub use playback_mode::{QueueEdge, RepeatMode};
pub use track::{quality, SourceCandidate, Track};
