//! Tree view state and flattening.

use std::collections::{BTreeSet, VecDeque};

use codepad_core::{NodeKind, Workspace, path};

use crate::clipboard::{ClipboardEntry, PathClipboard};
use crate::inline::InlineEditor;
use crate::node::{TreeNode, build_nodes};
use crate::notice::Notice;

/// A dragged entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub path: String,
    pub is_folder: bool,
    /// Folder currently showing the drop affordance
    pub hover: Option<String>,
}

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub expanded: bool,
    pub selected: bool,
    pub drop_target: bool,
}

/// Presentational state of the file tree sidebar.
pub struct TreeView {
    /// Last rebuild of the hierarchy
    pub(crate) nodes: Vec<TreeNode>,

    /// Expanded folders, by path
    pub(crate) expanded: BTreeSet<String>,

    /// Path the current selection highlight points at
    pub(crate) selected: Option<String>,

    /// In-flight drag
    pub(crate) drag: Option<DragState>,

    /// Context menu target; `Some(None)` is the root
    pub(crate) context_target: Option<Option<String>>,

    /// Copy/cut slot
    pub(crate) clipboard: Option<ClipboardEntry>,

    /// Entry awaiting delete confirmation
    pub(crate) pending_delete: Option<String>,

    /// Inline create/rename input
    pub(crate) inline: InlineEditor,

    /// Toasts not yet shown
    pub(crate) notices: VecDeque<Notice>,

    /// System clipboard for "copy path"
    pub(crate) system_clipboard: Option<Box<dyn PathClipboard>>,
}

impl TreeView {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            expanded: BTreeSet::new(),
            selected: None,
            drag: None,
            context_target: None,
            clipboard: None,
            pending_delete: None,
            inline: InlineEditor::Idle,
            notices: VecDeque::new(),
            system_clipboard: None,
        }
    }

    /// Injects the system clipboard used by "copy path".
    pub fn with_clipboard(mut self, clipboard: Box<dyn PathClipboard>) -> Self {
        self.system_clipboard = Some(clipboard);
        self
    }

    /// Rebuilds the hierarchy from the model.
    ///
    /// Expanded folders survive by path; folders that no longer exist are
    /// forgotten. When the selection changes, the new selected file's
    /// ancestors are expanded so the highlight is visible; after that the
    /// user may collapse them again.
    pub fn refresh(&mut self, ws: &Workspace) {
        let tree = ws.tree();
        self.nodes = build_nodes(tree);
        self.expanded.retain(|folder| tree.is_folder(folder));

        let selected = ws.selected_file().map(str::to_string);
        if selected != self.selected {
            if let Some(file) = &selected {
                self.expanded.extend(path::ancestors(file).map(str::to_string));
            }
            self.selected = selected;
        }
        if self.pending_delete.as_deref().is_some_and(|p| !tree.exists(p)) {
            self.pending_delete = None;
        }
        if self.clipboard.as_ref().is_some_and(|entry| !tree.exists(&entry.path)) {
            self.clipboard = None;
        }
    }

    // ==================== Queries ====================

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn is_expanded(&self, folder: &str) -> bool {
        self.expanded.contains(folder)
    }

    pub fn expand(&mut self, folder: &str) {
        self.expanded.insert(folder.to_string());
    }

    pub fn collapse(&mut self, folder: &str) {
        self.expanded.remove(folder);
    }

    /// Expands every folder (used for non-interactive listings).
    pub fn expand_all(&mut self) {
        fn walk(nodes: &[TreeNode], expanded: &mut BTreeSet<String>) {
            for node in nodes.iter().filter(|n| n.is_folder()) {
                expanded.insert(node.path.clone());
                walk(&node.children, expanded);
            }
        }
        walk(&self.nodes, &mut self.expanded);
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.clipboard.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn inline(&self) -> &InlineEditor {
        &self.inline
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        match notice.level {
            crate::NoticeLevel::Error => tracing::warn!("{}", notice.message),
            _ => tracing::debug!("{}", notice.message),
        }
        self.notices.push_back(notice);
    }

    /// Carries expansion state along with a renamed or moved folder.
    pub(crate) fn rebase_expanded(&mut self, from: &str, to: &str) {
        let moved: Vec<String> = self
            .expanded
            .iter()
            .filter(|folder| path::is_same_or_within(folder, from))
            .cloned()
            .collect();
        for folder in moved {
            self.expanded.remove(&folder);
            if let Some(rebased) = path::rebase(&folder, from, to) {
                self.expanded.insert(rebased);
            }
        }
    }

    // ==================== Rendering ====================

    /// Flattens the visible part of the tree, depth-first.
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(&self.nodes, 0, &mut rows);
        rows
    }

    fn push_rows(&self, nodes: &[TreeNode], depth: usize, rows: &mut Vec<TreeRow>) {
        let hover = self.drag.as_ref().and_then(|d| d.hover.as_deref());
        for node in nodes {
            let expanded = node.is_folder() && self.is_expanded(&node.path);
            rows.push(TreeRow {
                path: node.path.clone(),
                name: node.name.clone(),
                kind: node.kind,
                depth,
                expanded,
                selected: self.selected.as_deref() == Some(node.path.as_str()),
                drop_target: hover == Some(node.path.as_str()),
            });
            if expanded {
                self.push_rows(&node.children, depth + 1, rows);
            }
        }
    }

    /// Renders the visible rows as indented text.
    ///
    /// ```text
    /// ▾ css/
    ///       site.css
    /// ▸ img/
    ///   index.html *
    /// ```
    pub fn render_ascii(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            let indent = "    ".repeat(row.depth);
            let line = match row.kind {
                NodeKind::Folder if row.expanded => format!("{indent}▾ {}/", row.name),
                NodeKind::Folder => format!("{indent}▸ {}/", row.name),
                NodeKind::File => format!("{indent}  {}", row.name),
            };
            out.push_str(&line);
            if row.selected {
                out.push_str(" *");
            }
            out.push('\n');
        }
        out
    }
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::{Config, MemoryStore};

    fn workspace() -> Workspace {
        let mut ws = Workspace::open(Box::new(MemoryStore::new()), Config::default());
        ws.set_content("index.html", "<h1>Hi</h1>").unwrap();
        ws.set_content("css/site.css", "").unwrap();
        ws.set_content("css/base/reset.css", "").unwrap();
        ws.create_folder("img").unwrap();
        ws
    }

    #[test]
    fn test_collapsed_by_default() {
        let ws = workspace();
        let mut view = TreeView::new();
        view.refresh(&ws);

        let names: Vec<_> = view.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["css", "img", "index.html"]);
    }

    #[test]
    fn test_expansion_survives_refresh() {
        let mut ws = workspace();
        let mut view = TreeView::new();
        view.refresh(&ws);
        view.expand("css");

        ws.set_content("css/extra.css", "").unwrap();
        view.refresh(&ws);

        let rows = view.rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].path, "css/base");
        assert_eq!(rows[1].depth, 1);
        assert!(!rows[1].expanded);
    }

    #[test]
    fn test_selection_expands_ancestors() {
        let mut ws = workspace();
        ws.open_file("css/base/reset.css").unwrap();
        let mut view = TreeView::new();
        view.refresh(&ws);

        let selected: Vec<_> = view.rows().into_iter().filter(|r| r.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].depth, 2);
    }

    #[test]
    fn test_deleted_folders_are_forgotten() {
        let mut ws = workspace();
        let mut view = TreeView::new();
        view.refresh(&ws);
        view.expand("img");

        ws.delete("img").unwrap();
        view.refresh(&ws);
        ws.create_folder("img").unwrap();
        view.refresh(&ws);

        assert!(!view.is_expanded("img"));
    }

    #[test]
    fn test_render_ascii() {
        let mut ws = workspace();
        ws.open_file("index.html").unwrap();
        let mut view = TreeView::new();
        view.refresh(&ws);
        view.expand_all();

        let expected = "\
▾ css/
    ▾ base/
          reset.css
      site.css
▾ img/
  index.html *
";
        assert_eq!(view.render_ascii(), expected);
    }
}
