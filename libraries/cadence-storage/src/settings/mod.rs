//! Typed settings on top of a [`KeyValueStore`]
//!
//! Values are stored as JSON text so any `serde` type can be persisted under
//! a string key.
//!
//! # Example
//!
//! ```rust
//! use cadence_storage::{settings, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! settings::set_setting(&mut store, settings::SETTING_PLAYBACK, &vec![1, 2, 3]).unwrap();
//!
//! let value: Option<Vec<u32>> = settings::get_setting(&store, settings::SETTING_PLAYBACK).unwrap();
//! assert_eq!(value, Some(vec![1, 2, 3]));
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{KeyValueStore, Result};

// Setting key constants
/// Playback settings (volume, quality label, mute)
pub const SETTING_PLAYBACK: &str = "playback.settings";

/// Single-slot resume checkpoint (track id + position)
pub const SETTING_RESUME_CHECKPOINT: &str = "playback.resume";

/// Get a setting value
///
/// # Returns
///
/// Returns `Ok(Some(value))` if the setting exists, `Ok(None)` if not found
///
/// # Errors
///
/// Returns an error if the store read fails or the stored JSON does not
/// deserialize into `T`
pub fn get_setting<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Set a setting value (JSON-serialized)
///
/// # Errors
///
/// Returns an error if serialization or the store write fails
pub fn set_setting<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
