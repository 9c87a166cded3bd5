//! Persistent key/value preference store.
//!
//! One JSON file per key under a configurable directory. Reads are
//! forgiving: a missing or corrupted entry loads as `None` so callers can
//! fall back to compiled-in defaults; only writes surface errors.

use crate::error::StoreError;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed preference store.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    dir: PathBuf,
}

impl PrefsStore {
    /// Store rooted at an explicit directory. The directory is created on
    /// first write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform config dir (`~/.config/candlefeed` on
    /// Linux). Falls back to the current directory when the platform
    /// provides none.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map(|d| d.join("candlefeed"))
            .unwrap_or_else(|| PathBuf::from(".candlefeed"));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load an entry. Missing files and undecodable contents both yield
    /// `None`; the latter is logged since it means the entry was corrupted.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupted store entry");
                None
            }
        }
    }

    /// Write an entry, creating the store directory if needed.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let encoded = serde_json::to_string_pretty(value).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            source: e,
        })?;
        fs::write(self.entry_path(key), encoded)?;
        Ok(())
    }

    /// Remove an entry. Missing entries are fine.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        score: u8,
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(dir.path());

        let entry = Entry {
            name: "1m".into(),
            score: 1,
        };
        store.save("selected", &entry).unwrap();

        let back: Entry = store.load("selected").unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_missing_entry_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(dir.path());
        assert!(store.load::<Entry>("nope").is_none());
    }

    #[test]
    fn test_corrupted_entry_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(dir.path());
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        assert!(store.load::<Entry>("bad").is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(dir.path());
        store.save("gone", &Entry { name: "x".into(), score: 0 }).unwrap();
        store.remove("gone").unwrap();
        store.remove("gone").unwrap();
        assert!(store.load::<Entry>("gone").is_none());
    }
}
