//! Nested nodes rebuilt from the flat model.

use std::cmp::Ordering;

use codepad_core::{FileTree, NodeKind, path};

/// One entry of the rendered hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(name: &str, path: String, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            path,
            kind,
            children: Vec::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Attaches `path` below this node, creating intermediate folders.
    fn insert(&mut self, path: &str, kind: NodeKind) {
        let mut node = self;
        let mut segments = path.split(path::SEPARATOR).peekable();

        while let Some(segment) = segments.next() {
            let segment_kind = if segments.peek().is_some() { NodeKind::Folder } else { kind };
            let index = match node.children.iter().position(|c| c.name == segment) {
                Some(index) => index,
                None => {
                    let child_path = path::join(&node.path, segment);
                    node.children.push(TreeNode::new(segment, child_path, segment_kind));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
    }

    fn sort(&mut self) {
        self.children.sort_by(compare);
        for child in &mut self.children {
            child.sort();
        }
    }

    /// Number of nodes below this one.
    pub fn count(&self) -> usize {
        self.children.iter().map(|c| 1 + c.count()).sum()
    }
}

/// Folders first, then case-insensitive by name, then case-sensitive.
fn compare(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

/// Rebuilds the top-level nodes from the model.
pub fn build_nodes(tree: &FileTree) -> Vec<TreeNode> {
    let mut root = TreeNode::new("", String::new(), NodeKind::Folder);
    // Folders iterate in key order, so parents attach before children
    for folder in tree.folders() {
        root.insert(folder, NodeKind::Folder);
    }
    for file in tree.file_paths() {
        root.insert(file, NodeKind::File);
    }
    root.sort();
    root.children
}
