//! `window.localStorage` as a [`KeyValueStorage`] backend.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use funnel_core::{KeyValueStorage, MemoryStorage, StorageError};
use wasm_bindgen::JsValue;

fn backend_error(value: &JsValue) -> StorageError {
    StorageError::Backend(format!("{value:?}"))
}

/// The page's `localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Get a handle on `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if there is no window or the
    /// browser has storage disabled (e.g. some private browsing modes),
    /// and [`StorageError::Backend`] if accessing it throws.
    pub fn open() -> Result<Self, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no global window".into()))?;
        let inner = window
            .local_storage()
            .map_err(|e| backend_error(&e))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { inner })
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).map_err(|e| backend_error(&e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Throws QuotaExceededError when full.
        self.inner.set_item(key, value).map_err(|e| backend_error(&e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).map_err(|e| backend_error(&e))
    }
}

/// `localStorage` when the browser offers it, otherwise an in-memory
/// map that lasts for the page's lifetime.
#[derive(Debug, Clone)]
pub enum BrowserStorage {
    Local(LocalStorage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    /// Pick the best available backend, logging when falling back.
    #[must_use]
    pub fn detect() -> Self {
        match LocalStorage::open() {
            Ok(local) => Self::Local(local),
            Err(e) => {
                tracing::warn!(error = %e, "localStorage unavailable, funnels will not survive a reload");
                Self::Memory(MemoryStorage::new())
            }
        }
    }

    /// Returns `true` if writes outlive the page.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Local(s) => s.get_item(key),
            Self::Memory(s) => s.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Local(s) => s.set_item(key, value),
            Self::Memory(s) => s.set_item(key, value),
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Local(s) => s.remove_item(key),
            Self::Memory(s) => s.remove_item(key),
        }
    }
}
