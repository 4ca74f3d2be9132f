use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::core::error::StoreError;

/// Durable string key/value storage. Values are JSON text.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`; returns once the write is durable.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn keys(&self) -> Vec<String>;
}

/// In-memory store used by tests and `--data-dir`-less dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// A single JSON object on disk, rewritten synchronously on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens (or lazily creates) the store at `path`. An unreadable or
    /// corrupt file is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "store file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Encode {
            key: "<store>".to_string(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// Memory only moves ahead once the file does; a failed flush puts the
    /// previous entry back.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            match previous {
                Some(previous) => self.entries.insert(key.to_string(), previous),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if let Some(previous) = self.entries.remove(key) {
            if let Err(e) = self.flush() {
                self.entries.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Shared handle over one backing store with typed JSON helpers.
#[derive(Clone)]
pub struct Storage {
    backend: Rc<RefCell<Box<dyn KeyValueStore>>>,
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Rc::new(RefCell::new(Box::new(backend))),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Reads and decodes `key`; missing or undecodable values read as `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.borrow().get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring undecodable stored value");
                None
            }
        }
    }

    pub fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.borrow_mut().set(key, raw)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.borrow_mut().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.backend.borrow().keys()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("hs_snake", "12".to_string()).unwrap();
        store.set("theme", "\"dark\"".to_string()).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("hs_snake").as_deref(), Some("12"));
        assert_eq!(reopened.get("theme").as_deref(), Some("\"dark\""));
        assert_eq!(reopened.keys(), vec!["hs_snake".to_string(), "theme".to_string()]);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn remove_deletes_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set("sound", "true".to_string()).unwrap();
        store.remove("sound").unwrap();
        drop(store);

        assert!(FileStore::open(&path).unwrap().get("sound").is_none());
    }

    #[test]
    fn failed_flush_keeps_memory_in_step_with_disk() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let path = data.join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set("hs_snake", "5".to_string()).unwrap();

        std::fs::remove_dir_all(&data).unwrap();
        assert!(store.set("hs_snake", "9".to_string()).is_err());
        assert_eq!(store.get("hs_snake").as_deref(), Some("5"));
        assert!(store.set("theme", "\"dark\"".to_string()).is_err());
        assert!(store.get("theme").is_none());
        assert!(store.remove("hs_snake").is_err());
        assert_eq!(store.get("hs_snake").as_deref(), Some("5"));

        std::fs::create_dir_all(&data).unwrap();
        store.set("hs_snake", "9".to_string()).unwrap();
        assert_eq!(FileStore::open(&path).unwrap().get("hs_snake").as_deref(), Some("9"));
    }

    #[test]
    fn typed_helpers_round_trip_and_tolerate_garbage() {
        let storage = Storage::in_memory();
        storage.store("sound", &false).unwrap();
        assert_eq!(storage.load::<bool>("sound"), Some(false));

        storage.backend.borrow_mut().set("theme", "nope".to_string()).unwrap();
        assert_eq!(storage.load::<String>("theme"), None);
        assert_eq!(storage.load::<String>("missing"), None);
    }
}
