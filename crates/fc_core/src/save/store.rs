//! Snapshot stores: where the per-match slices live.
//!
//! The in-memory state is always authoritative within a session; a store
//! is a mirror read once at session open. Stores are keyed by match id and
//! slice, and each slice is written independently so partial corruption
//! never blocks loading the rest.

use std::collections::HashMap;
use std::fs::{remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::PersistError;

/// One independently persisted slice of console state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKey {
    Phase,
    Assignments,
    Visiting,
    Clock,
    TimeAccounts,
    Counters,
    Timeouts,
    History,
}

impl SnapshotKey {
    pub const ALL: [SnapshotKey; 8] = [
        SnapshotKey::Phase,
        SnapshotKey::Assignments,
        SnapshotKey::Visiting,
        SnapshotKey::Clock,
        SnapshotKey::TimeAccounts,
        SnapshotKey::Counters,
        SnapshotKey::Timeouts,
        SnapshotKey::History,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SnapshotKey::Phase => "phase.dat",
            SnapshotKey::Assignments => "assignments.dat",
            SnapshotKey::Visiting => "visiting.dat",
            SnapshotKey::Clock => "clock.dat",
            SnapshotKey::TimeAccounts => "time_accounts.dat",
            SnapshotKey::Counters => "counters.dat",
            SnapshotKey::Timeouts => "timeouts.dat",
            SnapshotKey::History => "history.dat",
        }
    }
}

/// Per-match keyed storage for encoded slices.
pub trait SnapshotStore {
    fn read(&self, match_id: &str, key: SnapshotKey) -> Result<Option<Vec<u8>>, PersistError>;

    fn write(&mut self, match_id: &str, key: SnapshotKey, bytes: &[u8])
        -> Result<(), PersistError>;

    fn remove(&mut self, match_id: &str, key: SnapshotKey) -> Result<(), PersistError>;

    /// Whether any slice exists for the match (drives the resume offer).
    fn any_present(&self, match_id: &str) -> bool;

    fn clear_match(&mut self, match_id: &str) -> Result<(), PersistError> {
        for key in SnapshotKey::ALL {
            self.remove(match_id, key)?;
        }
        Ok(())
    }
}

/// Shared handle: lets the embedding layer keep a handle to the store it
/// hands the session.
impl<S: SnapshotStore> SnapshotStore for std::sync::Arc<std::sync::Mutex<S>> {
    fn read(&self, match_id: &str, key: SnapshotKey) -> Result<Option<Vec<u8>>, PersistError> {
        self.lock().unwrap().read(match_id, key)
    }

    fn write(
        &mut self,
        match_id: &str,
        key: SnapshotKey,
        bytes: &[u8],
    ) -> Result<(), PersistError> {
        self.lock().unwrap().write(match_id, key, bytes)
    }

    fn remove(&mut self, match_id: &str, key: SnapshotKey) -> Result<(), PersistError> {
        self.lock().unwrap().remove(match_id, key)
    }

    fn any_present(&self, match_id: &str) -> bool {
        self.lock().unwrap().any_present(match_id)
    }
}

/// Ephemeral store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slices: HashMap<(String, SnapshotKey), Vec<u8>>,
}

impl SnapshotStore for MemoryStore {
    fn read(&self, match_id: &str, key: SnapshotKey) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.slices.get(&(match_id.to_string(), key)).cloned())
    }

    fn write(
        &mut self,
        match_id: &str,
        key: SnapshotKey,
        bytes: &[u8],
    ) -> Result<(), PersistError> {
        self.slices.insert((match_id.to_string(), key), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, match_id: &str, key: SnapshotKey) -> Result<(), PersistError> {
        self.slices.remove(&(match_id.to_string(), key));
        Ok(())
    }

    fn any_present(&self, match_id: &str) -> bool {
        self.slices.keys().any(|(id, _)| id == match_id)
    }
}

/// File-backed store: one directory per match, one file per slice.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn match_dir(&self, match_id: &str) -> PathBuf {
        // Match ids come from the backend; keep the directory name
        // filesystem-safe regardless.
        let safe: String = match_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(safe)
    }

    fn slice_path(&self, match_id: &str, key: SnapshotKey) -> PathBuf {
        self.match_dir(match_id).join(key.file_name())
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Atomic save: write to temp file, then rename.
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.flush()?;

            // sync_all ensures data is written to disk (portable fsync)
            file.sync_all()?;
        }
        rename(&temp_path, path)?;
        Ok(())
    }
}

impl SnapshotStore for FileStore {
    fn read(&self, match_id: &str, key: SnapshotKey) -> Result<Option<Vec<u8>>, PersistError> {
        let path = self.slice_path(match_id, key);
        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    fn write(
        &mut self,
        match_id: &str,
        key: SnapshotKey,
        bytes: &[u8],
    ) -> Result<(), PersistError> {
        let path = self.slice_path(match_id, key);
        Self::write_atomic(&path, bytes)?;
        log::debug!("wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    fn remove(&mut self, match_id: &str, key: SnapshotKey) -> Result<(), PersistError> {
        let path = self.slice_path(match_id, key);
        if path.exists() {
            remove_file(&path)?;
        }
        Ok(())
    }

    fn any_present(&self, match_id: &str) -> bool {
        SnapshotKey::ALL.iter().any(|key| self.slice_path(match_id, *key).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use tempfile::TempDir;

    #[test]
    fn test_key_file_names_are_distinct() {
        let mut names: Vec<_> = SnapshotKey::iter().map(|k| k.file_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), SnapshotKey::ALL.len());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::default();
        assert!(!store.any_present("m-1"));

        store.write("m-1", SnapshotKey::Clock, b"abc").unwrap();
        assert!(store.any_present("m-1"));
        assert_eq!(store.read("m-1", SnapshotKey::Clock).unwrap(), Some(b"abc".to_vec()));
        // Other matches are untouched.
        assert_eq!(store.read("m-2", SnapshotKey::Clock).unwrap(), None);

        store.clear_match("m-1").unwrap();
        assert!(!store.any_present("m-1"));
    }

    #[test]
    fn test_file_store_roundtrip_and_atomicity() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());

        store.write("m-9", SnapshotKey::History, b"payload").unwrap();
        assert_eq!(
            store.read("m-9", SnapshotKey::History).unwrap(),
            Some(b"payload".to_vec())
        );

        // No leftover temp file after a successful write.
        let leftover = dir.path().join("m-9").join("history.tmp");
        assert!(!leftover.exists());

        store.remove("m-9", SnapshotKey::History).unwrap();
        assert_eq!(store.read("m-9", SnapshotKey::History).unwrap(), None);
    }

    #[test]
    fn test_file_store_sanitizes_match_ids() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());

        store.write("../evil/id", SnapshotKey::Phase, b"x").unwrap();
        assert_eq!(store.read("../evil/id", SnapshotKey::Phase).unwrap(), Some(b"x".to_vec()));
        // Everything stays under the store root.
        assert!(!dir.path().parent().unwrap().join("evil").exists());
    }
}
