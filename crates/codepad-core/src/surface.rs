//! Contracts for the editor and preview collaborators.
//!
//! The workspace never reaches into editor or preview internals. It hands
//! them paths and text through these traits, and they call back into the
//! workspace (for example `Workspace::edit`) to change content.

use std::collections::HashMap;

/// The text-editing surface (tabs, models, undo) as seen from the tree.
pub trait EditorSurface {
    /// Opens `path` with `content`, or focuses it if already open.
    fn open(&mut self, path: &str, content: &str);

    /// Remaps an open buffer after its file moved.
    fn renamed(&mut self, old_path: &str, new_path: &str);

    /// Drops any buffer for a file that no longer exists.
    fn released(&mut self, path: &str);

    /// Closes everything (new project).
    fn clear(&mut self);

    /// Paths currently open, in tab order.
    fn open_paths(&self) -> Vec<String>;

    /// Path of the focused tab.
    fn active_path(&self) -> Option<String>;
}

/// The live preview pane.
pub trait PreviewRenderer {
    /// Replaces the previewed document.
    fn content_changed(&mut self, html: &str);
}

/// Plain in-memory tab set.
///
/// Keeps tab order, the focused tab and each tab's text. Enough for hosts
/// without a real editor, and for tests.
#[derive(Debug, Default, Clone)]
pub struct OpenTabs {
    /// Buffer text by path
    buffers: HashMap<String, String>,

    /// Order of tabs
    order: Vec<String>,

    /// Currently active tab
    active: Option<String>,
}

impl OpenTabs {
    /// Creates an empty tab set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffer text for `path`.
    pub fn buffer(&self, path: &str) -> Option<&str> {
        self.buffers.get(path).map(String::as_str)
    }

    /// Returns the tab order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Returns the number of open tabs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no tabs are open.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Closes a tab, focusing the last remaining one if it was active.
    pub fn close(&mut self, path: &str) -> bool {
        if self.buffers.remove(path).is_none() {
            return false;
        }
        self.order.retain(|p| p != path);
        if self.active.as_deref() == Some(path) {
            self.active = self.order.last().cloned();
        }
        true
    }
}

impl EditorSurface for OpenTabs {
    fn open(&mut self, path: &str, content: &str) {
        if !self.buffers.contains_key(path) {
            self.order.push(path.to_string());
        }
        self.buffers.insert(path.to_string(), content.to_string());
        self.active = Some(path.to_string());
    }

    fn renamed(&mut self, old_path: &str, new_path: &str) {
        let Some(text) = self.buffers.remove(old_path) else { return };
        self.buffers.insert(new_path.to_string(), text);
        for tab in &mut self.order {
            if tab == old_path {
                *tab = new_path.to_string();
            }
        }
        if self.active.as_deref() == Some(old_path) {
            self.active = Some(new_path.to_string());
        }
    }

    fn released(&mut self, path: &str) {
        self.close(path);
    }

    fn clear(&mut self) {
        self.buffers.clear();
        self.order.clear();
        self.active = None;
    }

    fn open_paths(&self) -> Vec<String> {
        self.order.clone()
    }

    fn active_path(&self) -> Option<String> {
        self.active.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_focuses_existing_tab() {
        let mut tabs = OpenTabs::new();
        tabs.open("a.html", "1");
        tabs.open("b.css", "2");
        tabs.open("a.html", "3");

        assert_eq!(tabs.order(), ["a.html", "b.css"]);
        assert_eq!(tabs.active_path().as_deref(), Some("a.html"));
        assert_eq!(tabs.buffer("a.html"), Some("3"));
    }

    #[test]
    fn test_rename_keeps_position_and_focus() {
        let mut tabs = OpenTabs::new();
        tabs.open("css/a.css", "x");
        tabs.open("index.html", "y");
        tabs.open("css/a.css", "x");

        tabs.renamed("css/a.css", "styles/a.css");
        assert_eq!(tabs.order(), ["styles/a.css", "index.html"]);
        assert_eq!(tabs.active_path().as_deref(), Some("styles/a.css"));
        assert!(tabs.buffer("css/a.css").is_none());
    }

    #[test]
    fn test_release_moves_focus() {
        let mut tabs = OpenTabs::new();
        tabs.open("a", "");
        tabs.open("b", "");
        tabs.released("b");

        assert_eq!(tabs.active_path().as_deref(), Some("a"));
        tabs.released("missing");
        assert_eq!(tabs.len(), 1);
    }
}
