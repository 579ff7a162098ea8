//! Key/value storage backing the session and answer cache
//!
//! Storage is injected as a trait object so the same session logic runs against
//! an in-memory map (tests, ephemeral clients) or a JSON file on disk (the CLI).

use crate::error::{CoreError, CoreResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Minimal string key/value storage
pub trait KeyValueStorage: Send + Sync {
    /// Read a value, `Ok(None)` when the key is unset
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Remove a value; removing a missing key is not an error
    fn remove(&self, key: &str) -> CoreResult<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> CoreResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| CoreError::storage_unavailable("storage lock poisoned"))
}

/// Process-local storage, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object file
///
/// The whole map is kept in memory and rewritten on every mutation through a
/// temporary file and a rename, so readers never observe a half-written file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, starting empty if it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable storage file {}: {e}", path.display());
                BTreeMap::new()
            }
        };

        debug!(
            "Opened storage file {} with {} entries",
            path.display(),
            entries.len()
        );

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> CoreResult<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, serde_json::to_string_pretty(entries)?)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn mutate<F>(&self, f: F) -> CoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = lock(&self.entries)?;
        let mut updated = entries.clone();
        if !f(&mut updated) {
            return Ok(());
        }
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.mutate(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::storage::StorageTestSuite;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_contract() {
        StorageTestSuite::new(MemoryStorage::new()).run_all_tests();
    }

    #[test]
    fn test_file_storage_contract() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::open(temp_dir.path().join("session.json"));
        StorageTestSuite::new(storage).run_all_tests();
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path);
        storage.set("qroom_access_token", "A1").unwrap();
        storage.set("qroom_refresh_token", "R1").unwrap();
        storage.remove("qroom_refresh_token").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(
            reopened.get("qroom_access_token").unwrap().as_deref(),
            Some("A1")
        );
        assert_eq!(reopened.get("qroom_refresh_token").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_storage_starts_empty_on_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("anything").unwrap(), None);

        storage.set("key", "value").unwrap();
        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_storage_reports_unwritable_path() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let storage = FileStorage::open(blocker.join("session.json"));
        assert!(storage.set("key", "value").is_err());
        assert_eq!(storage.get("key").unwrap(), None);
    }
}
