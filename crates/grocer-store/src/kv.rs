//! Local key/value storage with automatic serialization.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Serialize};

use crate::{StoreError, StoreResult};

/// Durable per-device key/value storage.
///
/// Values are raw bytes; [`get_json`](KeyValueStore::get_json) and
/// [`set_json`](KeyValueStore::set_json) add JSON serialization on top.
pub trait KeyValueStore: Send + Sync {
    /// Get the bytes stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Get and deserialize a JSON value.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a JSON value.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        Self: Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes)
    }
}

/// Volatile key/value storage, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKv {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::OpenError("key/value lock poisoned".to_string())
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// Key/value storage backed by a directory, one file per key.
#[derive(Debug, Clone)]
pub struct DirKv {
    root: PathBuf,
}

impl DirKv {
    /// Open (and create if needed) a storage directory.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .map_err(|e| StoreError::OpenError(format!("{}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key.replace(':', "_"))))
    }
}

impl KeyValueStore for DirKv {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        quantity: i64,
    }

    #[test]
    fn test_memory_kv_roundtrip() {
        let kv = MemoryKv::new();
        assert!(!kv.exists("cart").unwrap());

        kv.set("cart", b"[]").unwrap();
        assert_eq!(kv.get("cart").unwrap(), Some(b"[]".to_vec()));

        kv.delete("cart").unwrap();
        assert_eq!(kv.get("cart").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let kv = MemoryKv::new();
        let entry = Entry {
            name: "Sugar".to_string(),
            quantity: 2,
        };
        kv.set_json("entry", &entry).unwrap();
        assert_eq!(kv.get_json::<Entry>("entry").unwrap(), Some(entry));
    }

    #[test]
    fn test_dir_kv_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let kv = DirKv::open(dir.path()).unwrap();
            kv.set("cart", b"[1,2]").unwrap();
        }
        let kv = DirKv::open(dir.path()).unwrap();
        assert_eq!(kv.get("cart").unwrap(), Some(b"[1,2]".to_vec()));

        kv.delete("cart").unwrap();
        kv.delete("cart").unwrap();
        assert!(!kv.exists("cart").unwrap());
    }

    #[test]
    fn test_dir_kv_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let kv = DirKv::open(dir.path()).unwrap();
        assert!(matches!(kv.set("../escape", b"x"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(kv.get(""), Err(StoreError::InvalidKey(_))));
    }
}
