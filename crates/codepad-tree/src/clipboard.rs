//! Clipboards.
//!
//! Two different things share the name: the tree's own copy/cut slot
//! ([`ClipboardEntry`]), which holds a project path, and the system text
//! clipboard used by "copy path" ([`PathClipboard`]).

/// What a paste should do with the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardAction {
    /// Duplicate, leaving the source
    Copy,
    /// Move, removing the source
    Cut,
}

/// The tree's internal clipboard slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub action: ClipboardAction,
    pub path: String,
}

/// System clipboard errors.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Text clipboard used by "copy path".
pub trait PathClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
