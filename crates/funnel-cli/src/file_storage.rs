//! A JSON file standing in for browser `localStorage`.
//!
//! The file holds one object mapping keys to string values, so a
//! snapshot written here has the same shape as one in the browser.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use funnel_core::{KeyValueStorage, StorageError};

/// Key-value slots persisted in a single JSON file.
///
/// Every call reads (and, for writes, rewrites) the whole file. A
/// missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(&e)),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(&e))
    }

    fn io_error(&self, err: &std::io::Error) -> StorageError {
        StorageError::Backend(format!("{}: {err}", self.path.display()))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        items.insert(key.to_owned(), value.to_owned());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}
