//! Local snapshot storage.
//!
//! Replace-by-key text storage for draft snapshots. Synchronous, no
//! transactions; overlapping writes converge last-write-wins.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::error::{Effect, Transience};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot store i/o: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot store backend: {0}")]
    Backend(String),
}

impl SnapshotError {
    pub fn transience(&self) -> Transience {
        match self {
            SnapshotError::Io(_) => Transience::Retryable,
            SnapshotError::Backend(_) => Transience::Unknown,
        }
    }

    pub fn effect(&self) -> Effect {
        // A failed replace may have left the previous value or the new one;
        // never a torn mix (writes go through a rename).
        Effect::Unknown
    }
}

/// Local snapshot store.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when the key has no value.
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError>;
    fn remove(&self, key: &str) -> Result<(), SnapshotError>;
}

/// In-memory store for tests and ephemeral sessions.
///
/// Counts writes so tests can assert on debounce behavior.
#[derive(Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    values: BTreeMap<String, String>,
    writes: u32,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls performed so far.
    pub fn writes(&self) -> u32 {
        self.entries.lock().expect("snapshot store lock").writes
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let inner = self.entries.lock().expect("snapshot store lock");
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        let mut inner = self.entries.lock().expect("snapshot store lock");
        inner.writes += 1;
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SnapshotError> {
        let mut inner = self.entries.lock().expect("snapshot store lock");
        inner.values.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
///
/// Writes land in a temp file first and are renamed into place, so a reader
/// never sees a torn snapshot.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SnapshotError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySnapshotStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.writes(), 2);

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        assert_eq!(store.get("draft.v1").unwrap(), None);
        store.set("draft.v1", "{\"a\":1}").unwrap();
        assert_eq!(store.get("draft.v1").unwrap().as_deref(), Some("{\"a\":1}"));

        store.remove("draft.v1").unwrap();
        assert_eq!(store.get("draft.v1").unwrap(), None);
        // Removing a missing key is not an error.
        store.remove("draft.v1").unwrap();
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        store.set("smartlink.draft/v1", "x").unwrap();
        assert_eq!(
            store.get("smartlink.draft/v1").unwrap().as_deref(),
            Some("x")
        );
    }
}
