//! Which HTML document the preview pane should show.
//!
//! Editing an HTML file previews that file. Editing a stylesheet or script
//! previews the page most likely to include it:
//!
//! 1. an open tab ending in `index.html`
//! 2. a project file ending in `index.html`
//! 3. any open `.html` tab
//! 4. the first `.html` file in the project

use crate::path;
use crate::tree::FileTree;

/// How a file takes part in the live preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewRole {
    /// The file is a page and previews itself
    Page,
    /// The file feeds a page (stylesheet, script)
    Asset,
    /// The file does not affect the preview
    None,
}

impl PreviewRole {
    /// Classifies `path` by extension.
    pub fn of(path: &str) -> Self {
        match path::extension(path).as_deref() {
            Some("html" | "htm") => PreviewRole::Page,
            Some("css" | "js") => PreviewRole::Asset,
            _ => PreviewRole::None,
        }
    }
}

/// Picks the page to preview for an asset, preferring open tabs.
pub fn associated_page<'a>(tree: &'a FileTree, open_paths: &'a [String]) -> Option<&'a str> {
    let open = || open_paths.iter().map(String::as_str).filter(|p| tree.is_file(p));

    open()
        .find(|p| p.ends_with("index.html"))
        .or_else(|| tree.file_paths().find(|p| p.ends_with("index.html")))
        .or_else(|| open().find(|p| is_page(p)))
        .or_else(|| tree.file_paths().find(|p| is_page(p)))
}

/// Resolves the HTML the preview should show after `path` changed.
///
/// `content` is the fresh text of `path` itself. Returns `None` when the file
/// does not participate in the preview or no page could be found.
pub fn resolve(tree: &FileTree, open_paths: &[String], path: &str, content: &str) -> Option<String> {
    match PreviewRole::of(path) {
        PreviewRole::Page => Some(content.to_string()),
        PreviewRole::Asset => {
            let page = associated_page(tree, open_paths)?;
            tree.content(page).filter(|html| !html.is_empty()).map(str::to_string)
        }
        PreviewRole::None => None,
    }
}

fn is_page(path: &str) -> bool {
    PreviewRole::of(path) == PreviewRole::Page
}
