//! Source resolution
//!
//! Picks one playable URL for a track given the listener's preferred quality.
//! Order tried: the preferred label, then the fixed fallback order (skipping
//! the preferred label), then whatever candidate the catalog listed first.
//! Plain `http` URLs are upgraded to `https` on the way out.

use cadence_core::{quality, SourceCandidate, Track};
use serde::Serialize;
use tracing::warn;
use url::Url;

/// URL chosen for a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    /// Playable URL, always `https` when the catalog gave `http`
    pub url: String,

    /// Label of the candidate that was actually used
    pub quality: String,

    /// Label that was asked for
    pub requested: String,
}

impl ResolvedSource {
    /// Whether a different label than the requested one was used
    pub fn is_fallback(&self) -> bool {
        self.quality != self.requested
    }
}

/// Resolve a playable URL for `track`
///
/// Returns `None` when the track has no source candidates at all.
pub fn resolve_source(track: &Track, desired: &str) -> Option<ResolvedSource> {
    let candidate = track
        .source_for(desired)
        .or_else(|| {
            quality::FALLBACK_ORDER
                .iter()
                .filter(|label| **label != desired)
                .find_map(|label| track.source_for(label))
        })
        .or_else(|| track.sources.first())?;

    Some(resolved(candidate, desired))
}

fn resolved(candidate: &SourceCandidate, desired: &str) -> ResolvedSource {
    ResolvedSource {
        url: upgrade_scheme(&candidate.url),
        quality: candidate.quality.clone(),
        requested: desired.to_string(),
    }
}

/// Rewrite an `http` URL to `https`; other URLs pass through unchanged
pub fn upgrade_scheme(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.scheme() == "http" => {
            if url.set_scheme("https").is_ok() {
                return url.to_string();
            }
            warn!("Could not upgrade URL scheme: {}", raw);
            raw.to_string()
        }
        Ok(_) => raw.to_string(),
        Err(_) => match strip_prefix_ignore_case(raw, "http://") {
            Some(rest) => format!("https://{}", rest),
            None => raw.to_string(),
        },
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}
