//! Durable key/value storage backing the per-session RSVP cache.
//!
//! The contract mirrors a browser's local storage: string keys, string
//! values, absent keys read as `None`.

#[cfg(test)]
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Arc, Mutex};

use derive_more::Display;
use tempfile::NamedTempFile;

#[derive(Debug, Display)]
pub enum StorageError {
    #[display(fmt = "storage io error: {}", _0)]
    Io(io::Error),
    #[cfg(test)]
    #[display(fmt = "storage quota exceeded ({} bytes)", _0)]
    QuotaExceeded(usize),
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// One file per key inside `dir`. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.item_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        // Readers only ever see the old file or the complete new one. Each
        // write gets its own temp file so concurrent writers never collide.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(self.item_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage. Clones share the same entries.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects writes that would push the total stored bytes past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: Arc::default(),
            quota: Some(bytes),
        }
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().expect("memory storage poisoned");
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().expect("memory storage poisoned");
        if let Some(quota) = self.quota {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded(quota));
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().expect("memory storage poisoned");
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session"));

        assert!(storage.get_item("nothing").unwrap().is_none());
        // Reading must not create the session directory.
        assert!(!storage.dir().exists());
    }

    #[test]
    fn test_file_storage_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v2"));
        // Only the entry itself is left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        storage.remove_item("k").unwrap();
        assert!(storage.get_item("k").unwrap().is_none());
        // Removing twice is fine.
        storage.remove_item("k").unwrap();
    }

    #[test]
    fn test_file_storage_concurrent_writers_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let first = "a".repeat(256 * 1024);
        let second = "b".repeat(256 * 1024);

        for _ in 0..50 {
            std::thread::scope(|s| {
                let a = s.spawn(|| storage.set_item("k", &first));
                let b = s.spawn(|| storage.set_item("k", &second));
                assert!(a.join().unwrap().is_ok());
                assert!(b.join().unwrap().is_ok());
            });

            let stored = storage.get_item("k").unwrap().unwrap();
            assert!(stored == first || stored == second);
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set_item("k", "v").unwrap();
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(10);
        storage.set_item("k", "12345").unwrap();
        // Overwriting the same key only counts the new value.
        storage.set_item("k", "123456789").unwrap();
        assert!(matches!(
            storage.set_item("other", "x"),
            Err(StorageError::QuotaExceeded(10))
        ));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("123456789"));
    }
}
