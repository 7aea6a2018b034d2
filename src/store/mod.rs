//! Durable crawl-state persistence
//!
//! One JSON state file per crawl configuration. Saves go through a temporary
//! file in the target directory followed by an atomic rename, so a crash
//! mid-save never leaves a truncated snapshot behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::config::CrawlOptions;
use crate::state::CrawlState;

/// Errors that can occur during state persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("State file does not match the expected schema: {0}")]
    Corrupt(String),

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for state store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Reads and writes the serialized form of a [`CrawlState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store at the per-configuration path derived from the options, in the
    /// current working directory.
    pub fn for_options(options: &CrawlOptions) -> Self {
        Self {
            path: PathBuf::from(options.state_file_name()),
        }
    }

    /// Store at an explicit path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the full state to the store's path.
    ///
    /// The bytes land in a temp file first and are renamed over the final
    /// path, so readers only ever observe a complete snapshot.
    pub fn save(&self, state: &CrawlState) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(state)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!("State saved to {}", self.path.display());
        Ok(())
    }

    /// Loads the persisted state.
    ///
    /// Returns `Ok(None)` when no state file exists. A file that exists but
    /// does not deserialize into the expected schema is `Corrupt`; callers
    /// treat that as "no usable resume state" and start fresh.
    pub fn load(&self) -> StoreResult<Option<CrawlState>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let state = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Some(state))
    }

    /// Best-effort removal after a completed crawl. A missing file is not an
    /// error.
    pub fn delete(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed state file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Could not remove state file {}: {}", self.path.display(), e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CrawlTask;

    fn test_state() -> CrawlState {
        let options = CrawlOptions::new("https://example.com/", 2, true).unwrap();
        let mut state = CrawlState::new(&options);
        state.mark_seen("https://example.com/a");
        state.queue.push_back(CrawlTask {
            url: "https://example.com/a".to_string(),
            depth: 1,
            found_on: Some("https://example.com/".to_string()),
        });
        state.pages_visited_count = 1;
        state
    }

    fn store_in_tempdir(dir: &Path) -> StateStore {
        StateStore::at_path(dir.join("crawl_state_test.json"))
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in_tempdir(dir.path());
        let state = test_state();

        store.save(&state).unwrap();
        let loaded = store.load().unwrap().expect("state file should exist");

        assert_eq!(loaded.start_url, state.start_url);
        assert_eq!(loaded.queue, state.queue);
        assert_eq!(loaded.visited, state.visited);
        assert_eq!(loaded.pages_visited_count, state.pages_visited_count);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in_tempdir(dir.path());

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in_tempdir(dir.path());

        fs::write(store.path(), "{\"start_url\": 42}").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_load_truncated_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in_tempdir(dir.path());

        let state = test_state();
        let json = serde_json::to_string(&state).unwrap();
        fs::write(store.path(), &json[..json.len() / 2]).unwrap();

        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in_tempdir(dir.path());

        let mut state = test_state();
        store.save(&state).unwrap();

        state.pages_visited_count = 42;
        store.save(&state).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.pages_visited_count, 42);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in_tempdir(dir.path());

        store.save(&test_state()).unwrap();
        store.delete();
        assert!(store.load().unwrap().is_none());

        // Second delete on a missing file must not panic or warn-fail.
        store.delete();
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in_tempdir(dir.path());

        store.save(&test_state()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("crawl_state_test.json")]);
    }
}
