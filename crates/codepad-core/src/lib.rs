//! # Codepad Core
//!
//! Project state and the virtual file tree behind the codepad editor shell.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Workspace                          │
//! │  ┌──────────────┐ ┌──────────┐ ┌────────────────────────┐ │
//! │  │ ProjectStore │ │  Config  │ │ EventBus / Observers   │ │
//! │  └──────────────┘ └──────────┘ └────────────────────────┘ │
//! │         │                               │                  │
//! │  ┌──────┴───────────────────┐   ┌───────┴──────────────┐  │
//! │  │       ProjectState        │   │ EditorSurface        │  │
//! │  │  name / currentPath /     │   │ PreviewRenderer      │  │
//! │  │  selectedFile / FileTree  │   └──────────────────────┘  │
//! │  └──────────────────────────┘                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The `FileTree` is the only authority on which paths exist. Views are
//! rebuilt from it and never queried for structure.

pub mod config;
pub mod event;
pub mod path;
pub mod preview;
pub mod project;
pub mod store;
pub mod surface;
pub mod tree;
pub mod workspace;

pub use config::{Compression, Config, ConflictPolicy, ExportConfig, ImportConfig, ProjectConfig};
pub use event::{EventBus, EventHandler, Observer, ProjectEvent};
pub use project::{ProjectSnapshot, ProjectState};
pub use store::{JsonFileStore, MemoryStore, ProjectStore, StoreError};
pub use surface::{EditorSurface, OpenTabs, PreviewRenderer};
pub use tree::{FileTree, NodeKind};
pub use workspace::Workspace;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Path already exists: {0}")]
    Conflict(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0:?}")]
    InvalidPath(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl CoreError {
    /// Returns true for errors the UI should resolve by re-prompting.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
}
