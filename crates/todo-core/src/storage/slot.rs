//! Key-value slot stores
//!
//! A slot store holds string values under short names, the way browser
//! local storage does. The display order lives in exactly one slot.
//!
//! `FileSlotStore` keeps one file per key under the data directory
//! (`{data_dir}/{key}.json`) and writes atomically (temp file, then rename).
//! `MemorySlotStore` keeps everything in memory.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::error::{StorageError, StorageResult};

/// A string-valued key-value store
pub trait SlotStore: Send + Sync {
    /// Read a slot, `None` if it was never written
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a slot, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: SlotStore + ?Sized> SlotStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

/// Slot store backed by one file per key
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    /// Create a store rooted at `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SlotStore for FileSlotStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.slot_path(key)?;

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(StorageError::PermissionDenied { path, source: e })
            }
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.slot_path(key)?;
        debug!("Writing slot {} ({} bytes)", key, value.len());
        atomic_write(&path, value.as_bytes())
    }
}

/// Slot store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots that have been written
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written String
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reject keys that could escape the data directory
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_missing_slot() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        assert!(store.get("taskOrder").unwrap().is_none());
    }

    #[test]
    fn test_file_store_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        store.set("taskOrder", "[3,1,2]").unwrap();
        assert_eq!(store.get("taskOrder").unwrap().as_deref(), Some("[3,1,2]"));
        assert!(temp_dir.path().join("taskOrder.json").exists());
        assert!(!temp_dir.path().join("taskOrder.tmp").exists());

        store.set("taskOrder", "[]").unwrap();
        assert_eq!(store.get("taskOrder").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let store = FileSlotStore::new(&nested);

        store.set("order", "[1]").unwrap();
        assert!(nested.join("order.json").exists());
    }

    #[test]
    fn test_file_store_rejects_bad_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        for key in ["", "../escape", "a/b", "with space", "dot.ted"] {
            assert!(matches!(
                store.set(key, "[]"),
                Err(StorageError::InvalidKey { .. })
            ));
            assert!(store.get(key).is_err());
        }
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        FileSlotStore::new(temp_dir.path())
            .set("taskOrder", "[9,8]")
            .unwrap();

        let reopened = FileSlotStore::new(temp_dir.path());
        assert_eq!(reopened.get("taskOrder").unwrap().as_deref(), Some("[9,8]"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySlotStore::new();
        assert!(store.is_empty());
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_arc_store_shares_state() {
        let store = Arc::new(MemorySlotStore::new());
        let handle = Arc::clone(&store);

        handle.set("taskOrder", "[1]").unwrap();
        assert_eq!(store.get("taskOrder").unwrap().as_deref(), Some("[1]"));
    }
}
