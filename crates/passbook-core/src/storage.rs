//! Key-value persistence adapters.
//!
//! The controller stores its whole collection as one serialized value under a
//! single key. Adapters only need to read and replace whole values.

use crate::error::StorageError;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

/// Durable storage keyed by namespace strings.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if nothing was stored yet.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

/// In-memory store, the headless stand-in for browser local storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    /// Maximum total size in bytes of all stored values.
    quota: Option<usize>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `value` under `key`.
    pub fn seeded(key: &str, value: impl Into<String>) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.into());
        store
    }

    /// Limit the total stored size. Writes that would exceed it fail the way
    /// a full browser storage quota does.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Change or lift the quota on an existing store.
    pub fn set_quota(&mut self, bytes: Option<usize>) {
        self.quota = bytes;
    }

    /// Number of successful writes since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Raw value under `key`, without going through the trait.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn used_without(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::Unavailable(format!(
                    "quota exceeded ({needed} of {quota} bytes)"
                )));
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// File-backed store: one `<key>.json` file per key inside a directory.
///
/// Writes land in a temporary file next to the target and are renamed over
/// it, so a crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the storage directory. It is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(value.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path)?;

        tracing::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_reads_back_writes() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read("passwords").unwrap(), None);

        store.write("passwords", "[]").unwrap();
        assert_eq!(store.read("passwords").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn memory_store_quota_rejects_oversized_value() {
        let mut store = MemoryStore::new().with_quota(16);
        store.write("k", "small").unwrap();

        let err = store.write("k", "this value is far too large").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        // The previous value survives.
        assert_eq!(store.get("k"), Some("small"));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn memory_store_quota_counts_replaced_value_once() {
        let mut store = MemoryStore::new().with_quota(10);
        store.write("k", "123456789").unwrap();
        store.write("k", "987654321").unwrap();
        assert_eq!(store.get("k"), Some("987654321"));
    }

    #[test]
    fn file_store_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("not-yet-created"));
        assert_eq!(store.read("passwords").unwrap(), None);
    }

    #[test]
    fn file_store_round_trips_and_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));

        store.write("passwords", "[1]").unwrap();
        store.write("passwords", "[1,2]").unwrap();

        assert_eq!(store.read("passwords").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("nested").join("passwords.json").exists());
    }

    #[test]
    fn file_store_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.write("passwords", "[]").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["passwords.json".to_string()]);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        for key in ["", "../escape", "a/b", "dot.ted"] {
            assert!(matches!(
                store.write(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
            assert!(matches!(store.read(key), Err(StorageError::InvalidKey(_))));
        }
    }

    #[test]
    fn boxed_store_forwards_calls() {
        let mut boxed: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        boxed.write("k", "v").unwrap();
        assert_eq!(boxed.read("k").unwrap().as_deref(), Some("v"));
    }
}
