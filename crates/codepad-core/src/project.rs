//! Project state and its persisted snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::path;
use crate::tree::FileTree;

/// Key of the single persisted project slot.
pub const PROJECT_SLOT_ID: u32 = 1;

/// Name used when nothing better is known.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// The serializable shape written by a [`ProjectStore`](crate::ProjectStore).
///
/// ```json
/// { "id": 1, "name": "site", "currentPath": "css",
///   "files": { "index.html": "<h1>Hi</h1>" }, "folders": ["assets"] }
/// ```
///
/// `folders` only lists folders with no files below them; everything else is
/// implied by the file paths. It is omitted when empty so snapshots without
/// it load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    #[serde(default = "default_slot")]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub current_path: String,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub folders: BTreeSet<String>,
}

fn default_slot() -> u32 {
    PROJECT_SLOT_ID
}

/// Root aggregate, one per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectState {
    /// Display label
    pub name: String,

    /// Folder new items go into by default; empty for the root
    pub current_path: String,

    /// File highlighted in the tree
    pub selected_file: Option<String>,

    /// Path to content mapping
    pub tree: FileTree,
}

impl ProjectState {
    /// Creates an empty project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current_path: String::new(),
            selected_file: None,
            tree: FileTree::new(),
        }
    }

    /// Captures the persisted part of the state.
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            id: PROJECT_SLOT_ID,
            name: self.name.clone(),
            current_path: self.current_path.clone(),
            files: self
                .tree
                .files()
                .map(|(path, content)| (path.to_string(), content.to_string()))
                .collect(),
            folders: self.tree.empty_folders().map(str::to_string).collect(),
        }
    }

    /// Rebuilds state from a snapshot.
    ///
    /// Keys are normalized on the way in. Keys that cannot be stored, or that
    /// would make a path both a file and a folder, are dropped with a warning.
    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Self {
        let mut state = Self::new(snapshot.name);

        for (raw, content) in snapshot.files {
            match path::validate(&raw) {
                Ok(key) if !state.tree.is_folder(&key) && !blocked_by_file(&state.tree, &key) => {
                    state.tree.insert_raw(key, content);
                }
                _ => tracing::warn!("Dropping unusable path from snapshot: {:?}", raw),
            }
        }

        for raw in snapshot.folders {
            match path::validate(&raw) {
                Ok(key) if !state.tree.is_file(&key) && !blocked_by_file(&state.tree, &key) => {
                    state.tree.insert_folder_raw(&key);
                }
                _ => tracing::warn!("Dropping unusable folder from snapshot: {:?}", raw),
            }
        }

        let current = path::normalize(&snapshot.current_path);
        state.current_path = if state.tree.is_folder(&current) {
            current
        } else {
            String::new()
        };

        state
    }
}

impl Default for ProjectState {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }
}

fn blocked_by_file(tree: &FileTree, path: &str) -> bool {
    path::ancestors(path).any(|ancestor| tree.is_file(ancestor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectState {
        let mut state = ProjectState::new("site");
        state.tree.set_content("index.html", "<h1>Hi</h1>").unwrap();
        state.tree.set_content("css/style.css", "body {}").unwrap();
        state.tree.ensure_folder("assets/img").unwrap();
        state.current_path = "css".to_string();
        state
    }

    #[test]
    fn test_snapshot_round_trip() {
        let state = sample();
        let restored = ProjectState::from_snapshot(state.snapshot());

        assert_eq!(restored.name, state.name);
        assert_eq!(restored.current_path, state.current_path);
        assert_eq!(restored.tree, state.tree);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(sample().snapshot()).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["currentPath"], "css");
        assert_eq!(json["files"]["css/style.css"], "body {}");
        assert_eq!(json["folders"], serde_json::json!(["assets/img"]));
    }

    #[test]
    fn test_snapshot_without_folders_field() {
        let json = r#"{ "id": 1, "name": "old", "currentPath": "", "files": { "a\\b.txt": "x" } }"#;
        let snapshot: ProjectSnapshot = serde_json::from_str(json).unwrap();
        let state = ProjectState::from_snapshot(snapshot);

        assert_eq!(state.tree.content("a/b.txt"), Some("x"));
        assert!(state.tree.is_folder("a"));
    }

    #[test]
    fn test_from_snapshot_drops_conflicting_keys() {
        let mut snapshot = sample().snapshot();
        snapshot.files.insert("index.html/inner".into(), "bad".into());
        snapshot.files.insert("../escape".into(), "bad".into());
        snapshot.current_path = "gone".into();

        let state = ProjectState::from_snapshot(snapshot);
        assert!(!state.tree.exists("index.html/inner"));
        assert_eq!(state.tree.len(), 2);
        assert_eq!(state.current_path, "");
    }
}
