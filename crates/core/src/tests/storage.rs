//! Test harness for KeyValueStorage implementations
//!
//! Any storage backend can be run through [`StorageTestSuite`] to check it
//! honours the get/set/remove contract the session store relies on.

use crate::error::{CoreError, CoreResult};
use crate::storage::KeyValueStorage;

/// Test suite for KeyValueStorage implementations
pub struct StorageTestSuite<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> StorageTestSuite<S> {
    /// Create a new test suite with the given storage
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Run all tests
    pub fn run_all_tests(&self) {
        self.test_missing_key();
        self.test_set_and_get();
        self.test_overwrite();
        self.test_remove();
        self.test_remove_missing_key();
    }

    pub fn test_missing_key(&self) {
        let value = self.storage.get("suite_missing").unwrap();
        assert!(value.is_none(), "Unset key should read as None");
    }

    pub fn test_set_and_get(&self) {
        self.storage.set("suite_key", "value-1").unwrap();
        assert_eq!(
            self.storage.get("suite_key").unwrap().as_deref(),
            Some("value-1")
        );
    }

    pub fn test_overwrite(&self) {
        self.storage.set("suite_overwrite", "first").unwrap();
        self.storage.set("suite_overwrite", "second").unwrap();
        assert_eq!(
            self.storage.get("suite_overwrite").unwrap().as_deref(),
            Some("second")
        );
    }

    pub fn test_remove(&self) {
        self.storage.set("suite_remove", "gone soon").unwrap();
        self.storage.remove("suite_remove").unwrap();
        assert!(self.storage.get("suite_remove").unwrap().is_none());
    }

    pub fn test_remove_missing_key(&self) {
        self.storage.remove("suite_never_set").unwrap();
    }
}

/// Storage that fails every operation, standing in for an unavailable medium
#[derive(Debug, Default)]
pub struct UnavailableStorage;

impl KeyValueStorage for UnavailableStorage {
    fn get(&self, _key: &str) -> CoreResult<Option<String>> {
        Err(CoreError::storage_unavailable("storage disabled"))
    }

    fn set(&self, _key: &str, _value: &str) -> CoreResult<()> {
        Err(CoreError::storage_unavailable("storage disabled"))
    }

    fn remove(&self, _key: &str) -> CoreResult<()> {
        Err(CoreError::storage_unavailable("storage disabled"))
    }
}
