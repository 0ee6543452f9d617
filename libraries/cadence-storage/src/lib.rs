//! Cadence Storage
//!
//! Persistent key-value storage for playback state that must survive a
//! process restart (resume checkpoint, playback settings).
//!
//! The playback engine only needs `get(key)` and `set(key, value)` over
//! strings, so storage is modelled as the [`KeyValueStore`] trait with two
//! implementations:
//!
//! - [`MemoryStore`]: process-local map, used in tests and as a fallback
//! - [`FileStore`]: one JSON document on disk, rewritten atomically on `set`
//!
//! Typed values are layered on top by the [`settings`] module, which stores
//! each value as JSON under a well-known key.
//!
//! # Example
//!
//! ```rust
//! use cadence_storage::{settings, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! settings::set_setting(&mut store, "audio.volume", &0.5_f32).unwrap();
//!
//! let volume: Option<f32> = settings::get_setting(&store, "audio.volume").unwrap();
//! assert_eq!(volume, Some(0.5));
//! ```

mod error;
mod file_store;
mod memory_store;

pub mod settings;

pub use error::{Result, StorageError};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// String key-value store
///
/// Implementations persist values somewhere; callers decide how to treat
/// failures (the playback engine treats every read failure as a miss).
pub trait KeyValueStore {
    /// Read the value stored under `key`
    ///
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
