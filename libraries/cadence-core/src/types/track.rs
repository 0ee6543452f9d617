//! Catalog track values
//!
//! Tracks arrive from the catalog data source fully formed; playback never
//! mutates them.

use super::ids::TrackId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Well-known quality labels used by the catalog service
pub mod quality {
    /// 320 kbps stream
    pub const HIGH: &str = "320kbps";
    /// 160 kbps stream
    pub const MEDIUM: &str = "160kbps";
    /// 96 kbps stream
    pub const LOW: &str = "96kbps";

    /// Fallback order tried when the preferred label is missing
    pub const FALLBACK_ORDER: [&str; 3] = [HIGH, MEDIUM, LOW];
}

/// One playable rendition of a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCandidate {
    /// Quality label (e.g. "320kbps")
    pub quality: String,

    /// Stream URL as supplied by the catalog
    pub url: String,
}

impl SourceCandidate {
    /// Create a new source candidate
    pub fn new(quality: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            quality: quality.into(),
            url: url.into(),
        }
    }
}

/// Playable catalog item
///
/// Equality and hashing consider only `id`: two values carrying the same id
/// describe the same track even if their metadata differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier from the catalog
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Credited artists, in catalog order
    #[serde(default)]
    pub artists: Vec<String>,

    /// Duration in seconds, if the catalog knows it
    #[serde(default)]
    pub duration_seconds: Option<f64>,

    /// Candidate sources, one per quality label
    #[serde(default)]
    pub sources: Vec<SourceCandidate>,
}

impl Track {
    /// Create a track with no artists, duration or sources
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: Vec::new(),
            duration_seconds: None,
            sources: Vec::new(),
        }
    }

    /// Add a credited artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artists.push(artist.into());
        self
    }

    /// Set the known duration in seconds
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Add a source candidate
    #[must_use]
    pub fn with_source(mut self, quality: impl Into<String>, url: impl Into<String>) -> Self {
        self.sources.push(SourceCandidate::new(quality, url));
        self
    }

    /// Find the candidate carrying `quality`
    pub fn source_for(&self, quality: &str) -> Option<&SourceCandidate> {
        self.sources.iter().find(|s| s.quality == quality)
    }

    /// Artists joined for display ("A, B")
    pub fn artist_display(&self) -> String {
        self.artists.join(", ")
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
