//! Project persistence.
//!
//! A [`ProjectStore`] holds exactly one snapshot. Saves overwrite it whole.
//! The in-memory model stays the source of truth for the session: a failed
//! save is logged by the caller and never rolls anything back.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::project::ProjectSnapshot;

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Data directory not found")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Single-slot snapshot storage.
pub trait ProjectStore {
    /// Reads the stored snapshot, if one was ever saved.
    fn load(&self) -> Result<Option<ProjectSnapshot>, StoreError>;

    /// Replaces the stored snapshot.
    fn save(&self, snapshot: &ProjectSnapshot) -> Result<(), StoreError>;
}

/// Stores the snapshot as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. Nothing is touched until a save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default snapshot location.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(data_dir.join("codepad").join("project.json"))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectStore for JsonFileStore {
    fn load(&self) -> Result<Option<ProjectSnapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &ProjectSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write to a temporary file first, then rename (atomic write)
        let json = serde_json::to_string_pretty(snapshot)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved project to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the snapshot in memory.
///
/// Clones share the same slot, so a test can hand one clone to a
/// [`Workspace`](crate::Workspace) and inspect what was saved through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    snapshot: Option<ProjectSnapshot>,
    saves: usize,
    failing: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: ProjectSnapshot) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.inner.lock() {
            slot.snapshot = Some(snapshot);
        }
        store
    }

    /// Returns the last saved snapshot.
    pub fn snapshot(&self) -> Option<ProjectSnapshot> {
        self.inner.lock().ok().and_then(|slot| slot.snapshot.clone())
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|slot| slot.saves).unwrap_or(0)
    }

    /// Makes every following load and save fail.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut slot) = self.inner.lock() {
            slot.failing = failing;
        }
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self) -> Result<Option<ProjectSnapshot>, StoreError> {
        let slot = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory slot poisoned".into()))?;
        if slot.failing {
            return Err(StoreError::Unavailable("load disabled".into()));
        }
        Ok(slot.snapshot.clone())
    }

    fn save(&self, snapshot: &ProjectSnapshot) -> Result<(), StoreError> {
        let mut slot = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory slot poisoned".into()))?;
        if slot.failing {
            return Err(StoreError::Unavailable("save disabled".into()));
        }
        slot.snapshot = Some(snapshot.clone());
        slot.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectState;
    use tempfile::tempdir;

    fn snapshot() -> ProjectSnapshot {
        let mut state = ProjectState::new("demo");
        state.tree.set_content("index.html", "<p>x</p>").unwrap();
        state.tree.set_content("js/app.js", "let a = 1;").unwrap();
        state.current_path = "js".into();
        state.snapshot()
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/project.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&snapshot()).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot()));
        assert!(!dir.path().join("nested/project.json.tmp").exists());
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_memory_store_shares_slot() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.save(&snapshot()).unwrap();
        assert_eq!(handle.snapshot(), Some(snapshot()));
        assert_eq!(handle.save_count(), 1);

        handle.set_failing(true);
        assert!(store.save(&snapshot()).is_err());
        assert_eq!(handle.save_count(), 1);
    }
}
