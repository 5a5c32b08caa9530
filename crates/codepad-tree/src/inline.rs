//! Inline name editor for create and rename.
//!
//! ```text
//! Idle ──begin──▶ Editing ──confirm/blur──▶ Committed ──▶ Idle
//!                    │  ▲
//!                    │  └── conflict (stays Editing, error returned)
//!                    └──cancel / empty blur──▶ Cancelled ──▶ Idle
//! ```
//!
//! Committed and Cancelled are reported through the return value; the
//! editor itself is back to `Idle` as soon as the call returns.

use codepad_core::{CoreError, CoreResult, NodeKind, Workspace, path};

/// What the inline editor will do on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineMode {
    /// Create a new entry inside `parent`
    Create { parent: String, kind: NodeKind },
    /// Give `path` a new base name
    Rename { path: String, kind: NodeKind },
}

impl InlineMode {
    /// Folder the typed name is resolved against.
    pub fn container(&self) -> &str {
        match self {
            InlineMode::Create { parent, .. } => parent,
            InlineMode::Rename { path, .. } => path::parent(path),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            InlineMode::Create { kind, .. } | InlineMode::Rename { kind, .. } => *kind,
        }
    }
}

/// The single active inline input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InlineEditor {
    #[default]
    Idle,
    Editing { mode: InlineMode, value: String },
}

impl InlineEditor {
    /// Opens the editor with a pre-filled value.
    pub fn begin(&mut self, mode: InlineMode, initial: impl Into<String>) {
        *self = InlineEditor::Editing { mode, value: initial.into() };
    }

    /// Replaces the typed value. Ignored while idle.
    pub fn input(&mut self, text: impl Into<String>) {
        if let InlineEditor::Editing { value, .. } = self {
            *value = text.into();
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, InlineEditor::Editing { .. })
    }

    pub fn mode(&self) -> Option<&InlineMode> {
        match self {
            InlineEditor::Editing { mode, .. } => Some(mode),
            InlineEditor::Idle => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            InlineEditor::Editing { value, .. } => Some(value),
            InlineEditor::Idle => None,
        }
    }

    /// Enter: commits a non-empty name.
    ///
    /// Returns the committed path, or `None` if the editor was idle or the
    /// value was blank (cancel). On error the editor stays open with the
    /// typed value intact.
    pub fn confirm(&mut self, ws: &mut Workspace) -> CoreResult<Option<String>> {
        let InlineEditor::Editing { mode, value } = self else {
            return Ok(None);
        };
        let name = value.trim();
        if name.is_empty() {
            *self = InlineEditor::Idle;
            return Ok(None);
        }

        let target = path::normalize(&path::join(mode.container(), name));
        match mode {
            InlineMode::Create { kind: NodeKind::File, .. } => ws.create_file(&target)?,
            InlineMode::Create { kind: NodeKind::Folder, .. } => ws.create_folder(&target)?,
            InlineMode::Rename { path, .. } => {
                if name.contains(['/', '\\']) {
                    return Err(CoreError::InvalidPath(name.to_string()));
                }
                ws.rename(path, &target)?
            }
        }

        *self = InlineEditor::Idle;
        Ok(Some(target))
    }

    /// Focus lost: same as Enter, with a blank value cancelling.
    pub fn blur(&mut self, ws: &mut Workspace) -> CoreResult<Option<String>> {
        self.confirm(ws)
    }

    /// Escape: closes without touching the model.
    pub fn cancel(&mut self) -> bool {
        let was_editing = self.is_editing();
        *self = InlineEditor::Idle;
        was_editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::{Config, MemoryStore};

    fn workspace() -> Workspace {
        let mut ws = Workspace::open(Box::new(MemoryStore::new()), Config::default());
        ws.set_content("src/main.js", "main").unwrap();
        ws
    }

    fn create(kind: NodeKind) -> InlineMode {
        InlineMode::Create { parent: "src".into(), kind }
    }

    #[test]
    fn test_create_file_commits() {
        let mut ws = workspace();
        let mut editor = InlineEditor::default();
        editor.begin(create(NodeKind::File), "");
        editor.input("util.js");

        assert_eq!(editor.confirm(&mut ws).unwrap().as_deref(), Some("src/util.js"));
        assert_eq!(editor, InlineEditor::Idle);
        assert_eq!(ws.tree().content("src/util.js"), Some(""));
    }

    #[test]
    fn test_conflict_keeps_input_open() {
        let mut ws = workspace();
        let mut editor = InlineEditor::default();
        editor.begin(create(NodeKind::Folder), "main.js");

        let err = editor.confirm(&mut ws).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(editor.value(), Some("main.js"));

        editor.input("lib");
        assert_eq!(editor.blur(&mut ws).unwrap().as_deref(), Some("src/lib"));
        assert!(ws.tree().is_folder("src/lib"));
    }

    #[test]
    fn test_blank_blur_and_escape_cancel() {
        let mut ws = workspace();
        let before = ws.tree().clone();
        let mut editor = InlineEditor::default();

        editor.begin(create(NodeKind::File), "   ");
        assert_eq!(editor.blur(&mut ws).unwrap(), None);
        assert!(!editor.is_editing());

        editor.begin(create(NodeKind::File), "draft.js");
        assert!(editor.cancel());
        assert_eq!(ws.tree(), &before);
    }

    #[test]
    fn test_rename_in_place() {
        let mut ws = workspace();
        let mut editor = InlineEditor::default();
        editor.begin(InlineMode::Rename { path: "src/main.js".into(), kind: NodeKind::File }, "main.js");
        editor.input("app.js");

        assert_eq!(editor.confirm(&mut ws).unwrap().as_deref(), Some("src/app.js"));
        assert!(!ws.tree().exists("src/main.js"));
    }

    #[test]
    fn test_rename_rejects_separators() {
        let mut ws = workspace();
        let mut editor = InlineEditor::default();
        editor.begin(InlineMode::Rename { path: "src".into(), kind: NodeKind::Folder }, "src");
        editor.input("a/b");

        assert!(matches!(editor.confirm(&mut ws), Err(CoreError::InvalidPath(_))));
        assert!(editor.is_editing());
    }
}
