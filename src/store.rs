//! Namespaced key/value store adapters.
//!
//! The host contract is small: string values addressed by `(namespace, key)`,
//! plus enumeration of the keys within a namespace. An empty value means
//! "absent"; nothing ever removes a key outright.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

/// Storage contract the repository relies on.
pub trait KeyValueStore {
    /// Value under `key`, or `None` if the key was never written.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, overwriting in place.
    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()>;

    /// Every key ever written in `namespace`, in enumeration order.
    fn keys(&self, namespace: &str) -> Result<Vec<String>>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        (**self).get(namespace, key)
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        (**self).set(namespace, key, value)
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        (**self).keys(namespace)
    }
}

/// In-memory store. Keys enumerate in lexicographic order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Namespaces>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything in `namespace`, for assertions.
    pub fn snapshot(&self, namespace: &str) -> Result<BTreeMap<String, String>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard.get(namespace).cloned().unwrap_or_default())
    }
}

fn poisoned() -> Error {
    Error::OperationFailed("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| poisoned())?;
        guard
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default())
    }
}

/// Store persisted as a single JSON file.
///
/// Every write is a locked read-modify-write of the whole file followed by
/// an atomic rename. Reads take the lock too, so they never observe a write
/// in progress.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_unlocked(&self) -> Result<Namespaces> {
        if !self.path.exists() {
            return Ok(Namespaces::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Namespaces::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn read(&self) -> Result<Namespaces> {
        lock::with_lock(&self.path, self.lock_timeout_ms, || self.read_unlocked())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let data = self.read()?;
        Ok(data.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        lock::with_lock(&self.path, self.lock_timeout_ms, || {
            let mut data = self.read_unlocked()?;
            data.entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), value.to_string());
            let json = serde_json::to_string_pretty(&data)?;
            lock::write_atomic(&self.path, json.as_bytes())
        })
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        let data = self.read()?;
        Ok(data
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_isolates_namespaces() {
        let store = MemoryStore::new();
        store.set("a", "k", "1").unwrap();
        store.set("b", "k", "2").unwrap();

        assert_eq!(store.get("a", "k").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b", "k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("c", "k").unwrap(), None);
        assert_eq!(store.keys("a").unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn empty_value_keeps_key_enumerable() {
        let store = MemoryStore::new();
        store.set("ns", "sprint_1", "{}").unwrap();
        store.set("ns", "sprint_1", "").unwrap();

        assert_eq!(store.keys("ns").unwrap(), vec!["sprint_1".to_string()]);
        assert_eq!(store.get("ns", "sprint_1").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn file_store_persists_across_handles() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");

        let store = FileStore::open(&path);
        store.set("ns", "sprint_2", "two").unwrap();
        store.set("ns", "sprint_1", "one").unwrap();

        let reopened = FileStore::open(&path).with_lock_timeout(500);
        assert_eq!(reopened.get("ns", "sprint_1").unwrap().as_deref(), Some("one"));
        assert_eq!(
            reopened.keys("ns").unwrap(),
            vec!["sprint_1".to_string(), "sprint_2".to_string()]
        );
    }

    #[test]
    fn file_store_treats_missing_file_as_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path().join("nested/store.json"));
        assert!(store.keys("ns").unwrap().is_empty());
        assert_eq!(store.get("ns", "anything").unwrap(), None);
    }
}
