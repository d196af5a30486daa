//! `localStorage`-backed [`KeyValueStore`].

use framer_core::{KeyValueStore, StorageError};
use web_sys::Storage;

use crate::types::js_error_message;

/// Browser local storage. Reads as unavailable when the page has none
/// (disabled storage, sandboxed frames).
pub struct BrowserStore {
    storage: Option<Storage>,
}

impl BrowserStore {
    pub fn local() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable, language preference will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("localStorage".to_string()))
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_error_message(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteFailed(js_error_message(&e)))
    }
}
