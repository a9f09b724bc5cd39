//! Key-value persistence for the funnel store.
//!
//! The store writes its full state as one JSON string under a single
//! key. [`KeyValueStorage`] abstracts over where that string lives
//! (browser `localStorage`, a file, or memory).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::types::Funnel;

/// Errors raised by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backend does not exist in this environment.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused a read or write.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The stored value could not be encoded or decoded.
    #[error("stored state could not be (de)serialized: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A string-to-string key-value slot store, shaped like the Web Storage API.
///
/// Methods take `&self`: backends are shared handles onto process-wide
/// storage.
pub trait KeyValueStorage {
    /// Read the value under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend rejects the write
    /// (e.g. quota exceeded).
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Where and how the store persists itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistOptions {
    /// Storage key holding the snapshot.
    pub name: String,

    /// Schema version written with every snapshot. A stored snapshot
    /// with a different version is discarded on load.
    pub version: u32,
}

impl PersistOptions {
    /// Default storage key.
    pub const DEFAULT_NAME: &'static str = "funnel-sandbox";

    /// Current snapshot schema version.
    pub const DEFAULT_VERSION: u32 = 0;
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_owned(),
            version: Self::DEFAULT_VERSION,
        }
    }
}

/// The persisted part of the store state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFunnels {
    pub funnels: Vec<Funnel>,
}

/// The JSON written under the storage key:
/// `{"state":{"funnels":[...]},"version":0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: PersistedFunnels,
    pub version: u32,
}

/// Outcome of reading the snapshot slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    /// Nothing stored yet.
    Missing,
    /// A snapshot with a matching version.
    Funnels(Vec<Funnel>),
    /// A snapshot written under another schema version.
    VersionMismatch { stored: u32 },
}

/// Encode `funnels` as a snapshot string.
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if encoding fails.
pub fn encode_snapshot(funnels: &[Funnel], version: u32) -> Result<String, StorageError> {
    let snapshot = Snapshot {
        state: PersistedFunnels {
            funnels: funnels.to_vec(),
        },
        version,
    };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Read and decode the snapshot slot named by `options`.
///
/// # Errors
///
/// Returns the backend's error if the read fails, or
/// [`StorageError::Serialization`] if the stored string is not a
/// snapshot.
pub fn load_snapshot<S: KeyValueStorage + ?Sized>(
    storage: &S,
    options: &PersistOptions,
) -> Result<Loaded, StorageError> {
    let Some(raw) = storage.get_item(&options.name)? else {
        return Ok(Loaded::Missing);
    };
    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    if snapshot.version == options.version {
        Ok(Loaded::Funnels(snapshot.state.funnels))
    } else {
        Ok(Loaded::VersionMismatch {
            stored: snapshot.version,
        })
    }
}
