//! Key-value byte stores backing the subscription slot.
//!
//! A store maps a slot name to an opaque byte value. Writes replace the whole
//! value in one call.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::StorageError;

/// Durable map from slot name to bytes.
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` when the slot was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Overwrite a slot with `value`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// One file per slot (`<dir>/<key>.json`).
///
/// Writes go to a temporary sibling first and are renamed over the slot,
/// so readers see either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at [`super::data_dir`].
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self::new(super::data_dir()?))
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(|c: char| c == '/' || c == '\\') || key.starts_with('.') {
            return Err(StorageError::Unavailable(format!("invalid slot name '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }
}

/// In-process store. Clones share the same slots.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    slots: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    available: Rc<Cell<bool>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            slots: Rc::default(),
            available: Rc::new(Cell::new(true)),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get`/`set` fail with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Raw slot content, for inspection.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.slots.borrow().get(key).cloned()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.get() {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store disabled".into()))
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check()?;
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.check()?;
        self.slots.borrow_mut().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_missing_slot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("subscriptions").unwrap().is_none());
    }

    #[test]
    fn file_store_overwrites_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set("subscriptions", b"first").unwrap();
        store.set("subscriptions", b"second").unwrap();
        assert_eq!(store.get("subscriptions").unwrap().unwrap(), b"second");
        assert!(!dir.path().join("subscriptions.json.tmp").exists());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.set("../escape", b"x").is_err());
        assert!(store.get("").is_err());
    }

    #[test]
    fn file_store_unwritable_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing").join("nested"));
        assert!(matches!(
            store.set("subscriptions", b"x"),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn memory_store_clones_share_slots() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.set("k", b"v").unwrap();
        assert_eq!(view.raw("k").unwrap(), b"v");

        view.set_available(false);
        assert!(store.get("k").is_err());
    }
}
