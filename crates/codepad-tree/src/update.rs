//! Gesture handling.
//!
//! Each [`TreeMessage`] becomes zero or more [`Workspace`] calls. Failures
//! never escape: they turn into a [`Notice`] and the view stays usable.

use codepad_core::{CoreResult, NodeKind, Workspace, path};

use crate::clipboard::{ClipboardAction, ClipboardEntry};
use crate::inline::InlineMode;
use crate::messages::{DropTarget, TreeMessage};
use crate::notice::Notice;
use crate::view::{DragState, TreeView};

impl TreeView {
    pub fn update(&mut self, ws: &mut Workspace, message: TreeMessage) {
        match message {
            TreeMessage::FolderClicked(folder) => {
                self.context_target = None;
                let target = if self.is_expanded(&folder) {
                    self.collapse(&folder);
                    path::is_same_or_within(ws.current_path(), &folder)
                        .then(|| path::parent(&folder).to_string())
                } else {
                    self.expand(&folder);
                    Some(folder)
                };
                if let Some(target) = target {
                    if let Err(e) = ws.set_current_path(&target) {
                        self.notify(Notice::error(e.to_string()));
                    }
                }
            }

            TreeMessage::FileClicked(file) => {
                self.context_target = None;
                if let Err(e) = ws.open_file(&file) {
                    tracing::error!("Failed to open {}: {}", file, e);
                    self.notify(Notice::error(format!("Failed to open {}", file)));
                }
            }

            TreeMessage::DoubleClicked(target) => {
                self.context_target = None;
                if let Some(kind) = ws.tree().kind_of(&target).filter(|_| !target.is_empty()) {
                    self.settle_inline(ws);
                    if kind == NodeKind::Folder {
                        self.collapse(&target);
                    }
                    let name = path::file_name(&target).to_string();
                    self.inline.begin(InlineMode::Rename { path: target, kind }, name);
                }
            }

            TreeMessage::Refresh => {}

            // ==================== Drag and drop ====================
            TreeMessage::DragStarted(source) => {
                self.context_target = None;
                self.drag = ws.tree().kind_of(&source).filter(|_| !source.is_empty()).map(|kind| DragState {
                    path: source,
                    is_folder: kind == NodeKind::Folder,
                    hover: None,
                });
            }

            TreeMessage::DragOver(target) => {
                let folder = resolve_drop(ws, &target);
                if let Some(drag) = self.drag.as_mut() {
                    drag.hover = accepts(drag, &folder).then_some(folder);
                }
            }

            TreeMessage::Dropped(target) => {
                let Some(drag) = self.drag.take() else { return self.refresh(ws) };
                let folder = resolve_drop(ws, &target);
                if !accepts(&drag, &folder) {
                    self.notify(Notice::warning("Cannot move a folder into itself"));
                } else {
                    self.place(ws, &drag.path, &folder, ClipboardAction::Cut);
                }
            }

            TreeMessage::DragEnded => {
                self.drag = None;
            }

            // ==================== Context menu ====================
            TreeMessage::ShowContextMenu(target) => {
                let folder = resolve_folder(ws, target.as_deref());
                if let Err(e) = ws.set_current_path(&folder) {
                    tracing::debug!("Context target has no folder: {}", e);
                }
                self.context_target = Some(target);
            }

            TreeMessage::HideContextMenu => {
                self.context_target = None;
            }

            TreeMessage::ContextCopy => self.mark(ClipboardAction::Copy),
            TreeMessage::ContextCut => self.mark(ClipboardAction::Cut),

            TreeMessage::ContextPaste => {
                let target = self.context_target.take().flatten();
                let dest = resolve_folder(ws, target.as_deref());
                match self.clipboard.clone() {
                    Some(entry) => {
                        if self.place(ws, &entry.path, &dest, entry.action) && entry.action == ClipboardAction::Cut {
                            self.clipboard = None;
                        }
                    }
                    None => self.notify(Notice::info("Nothing to paste")),
                }
            }

            TreeMessage::ContextDelete => match self.context_target.take().flatten() {
                Some(target) => self.pending_delete = Some(target),
                None => self.notify(Notice::warning("The project root cannot be deleted")),
            },

            TreeMessage::ContextCopyPath => {
                let Some(target) = self.context_target.take().flatten() else {
                    self.notify(Notice::warning("Select a file or folder first"));
                    return self.refresh(ws);
                };
                let copied = match self.system_clipboard.as_mut() {
                    Some(clipboard) => clipboard.set_text(&target).map_err(|e| e.to_string()),
                    None => Err("no system clipboard".to_string()),
                };
                match copied {
                    Ok(()) => self.notify(Notice::info(format!("Copied path: {}", target))),
                    Err(e) => {
                        tracing::warn!("Copy path failed: {}", e);
                        self.notify(Notice::warning(format!("Copy this path manually: {}", target)));
                    }
                }
            }

            // ==================== Delete confirmation ====================
            TreeMessage::ConfirmDeleteYes => {
                if let Some(target) = self.pending_delete.take() {
                    match ws.delete(&target) {
                        Ok(_) => self.notify(Notice::info(format!("Deleted: {}", path::file_name(&target)))),
                        Err(e) => self.notify(Notice::error(format!("Delete failed: {}", e))),
                    }
                }
            }

            TreeMessage::ConfirmDeleteCancel => {
                if self.pending_delete.take().is_some() {
                    self.notify(Notice::info("Delete cancelled"));
                }
            }

            // ==================== Inline create / rename ====================
            TreeMessage::CreateNewFile => self.begin_create(ws, NodeKind::File),
            TreeMessage::CreateNewFolder => self.begin_create(ws, NodeKind::Folder),

            TreeMessage::InputChanged(value) => {
                self.inline.input(value);
            }

            TreeMessage::InputConfirm => {
                let mode = self.inline.mode().cloned();
                let result = self.inline.confirm(ws);
                self.finish_inline(ws, mode, result);
            }

            TreeMessage::InputBlur => {
                let mode = self.inline.mode().cloned();
                let result = self.inline.blur(ws);
                self.finish_inline(ws, mode, result);
            }

            TreeMessage::InputCancel => {
                self.inline.cancel();
            }
        }

        self.refresh(ws);
    }

    /// Moves (`Cut`) or duplicates (`Copy`) `source` into `dest`.
    ///
    /// Returns true if the entry was placed.
    fn place(&mut self, ws: &mut Workspace, source: &str, dest: &str, action: ClipboardAction) -> bool {
        let is_folder = ws.tree().is_folder(source);
        let result = match action {
            ClipboardAction::Cut => ws.move_entry(source, dest),
            ClipboardAction::Copy => ws.copy_entry(source, dest),
        };

        match result {
            Ok(placed) => {
                if action == ClipboardAction::Cut && is_folder {
                    self.rebase_expanded(source, &placed);
                }
                if !dest.is_empty() {
                    self.expand(dest);
                }
                if placed != source {
                    self.notify(Notice::info(format!("Pasted: {}", placed)));
                }
                true
            }
            Err(e) => {
                self.notify(Notice::error(format!("Paste failed: {}", e)));
                false
            }
        }
    }

    fn committed(&mut self, ws: &mut Workspace, mode: InlineMode, committed: String) {
        match mode {
            InlineMode::Create { kind: NodeKind::File, .. } => {
                self.notify(Notice::info(format!("Created: {}", path::file_name(&committed))));
                if let Err(e) = ws.open_file(&committed) {
                    tracing::error!("Failed to open {}: {}", committed, e);
                }
            }
            InlineMode::Create { kind: NodeKind::Folder, .. } => {
                self.notify(Notice::info(format!("Created: {}", path::file_name(&committed))));
            }
            InlineMode::Rename { path: old, kind } => {
                if kind == NodeKind::Folder {
                    self.rebase_expanded(&old, &committed);
                }
                if old != committed {
                    self.notify(Notice::info(format!("Renamed to: {}", path::file_name(&committed))));
                }
            }
        }
    }

    /// Puts `context_target` on the copy/cut slot.
    fn mark(&mut self, action: ClipboardAction) {
        match self.context_target.take().flatten() {
            Some(source) => {
                let verb = match action {
                    ClipboardAction::Copy => "Copied",
                    ClipboardAction::Cut => "Cut",
                };
                self.notify(Notice::info(format!("{}: {}", verb, path::file_name(&source))));
                self.clipboard = Some(ClipboardEntry { action, path: source });
            }
            None => self.notify(Notice::warning("Select a file or folder first")),
        }
    }

    /// Opens an inline create input in the current folder.
    fn begin_create(&mut self, ws: &mut Workspace, kind: NodeKind) {
        self.context_target = None;
        self.settle_inline(ws);
        let parent = ws.current_path().to_string();
        if !parent.is_empty() {
            self.expand(&parent);
        }
        self.inline.begin(InlineMode::Create { parent, kind }, "");
    }

    fn finish_inline(&mut self, ws: &mut Workspace, mode: Option<InlineMode>, result: CoreResult<Option<String>>) {
        match (result, mode) {
            (Ok(Some(committed)), Some(mode)) => self.committed(ws, mode, committed),
            (Ok(_), _) => {}
            (Err(e), _) => self.notify(Notice::error(e.to_string())),
        }
    }

    /// Resolves an open inline editor before another one starts.
    ///
    /// A name that cannot be committed is dropped with an error notice.
    fn settle_inline(&mut self, ws: &mut Workspace) {
        if !self.inline.is_editing() {
            return;
        }
        let mode = self.inline.mode().cloned();
        let result = self.inline.blur(ws);
        let failed = result.is_err();
        self.finish_inline(ws, mode, result);
        if failed {
            self.inline.cancel();
        }
    }
}

/// Folder a context action applies to: the folder itself, a file's parent,
/// or the root.
fn resolve_folder(ws: &Workspace, target: Option<&str>) -> String {
    match target {
        Some(p) if ws.tree().is_folder(p) => p.to_string(),
        Some(p) if ws.tree().is_file(p) => path::parent(p).to_string(),
        _ => String::new(),
    }
}

fn resolve_drop(ws: &Workspace, target: &DropTarget) -> String {
    match target {
        DropTarget::Row(row) => resolve_folder(ws, Some(row)),
        DropTarget::FolderBody(folder) => resolve_folder(ws, Some(folder)),
        DropTarget::Root => String::new(),
    }
}

/// A folder never accepts itself or its own subtree.
fn accepts(drag: &DragState, folder: &str) -> bool {
    !drag.is_folder || !path::is_same_or_within(folder, &drag.path)
}
