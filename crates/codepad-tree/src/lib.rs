//! # Codepad Tree
//!
//! The file tree sidebar, minus pixels.
//!
//! ## Architecture
//!
//! The view follows the Elm architecture (TEA):
//! - **Model**: [`TreeView`] (expanded folders, drag, clipboard, inline editor)
//! - **Message**: [`TreeMessage`], one per user gesture
//! - **Update**: [`TreeView::update`] turns a gesture into workspace calls
//! - **View**: [`TreeView::rows`] flattens the rebuilt tree for rendering
//!
//! ## Learning: A Projection, Not a Source of Truth
//!
//! The node hierarchy is thrown away and rebuilt from the
//! [`FileTree`](codepad_core::FileTree) after every gesture. Only purely
//! presentational state (which folders are expanded) survives a rebuild,
//! keyed by path. Existence checks always go to the model.

pub mod clipboard;
pub mod inline;
pub mod messages;
pub mod node;
pub mod notice;
pub mod update;
pub mod view;

pub use clipboard::{ClipboardAction, ClipboardEntry, ClipboardError, PathClipboard};
pub use inline::{InlineEditor, InlineMode};
pub use messages::{DropTarget, TreeMessage};
pub use node::{TreeNode, build_nodes};
pub use notice::{Notice, NoticeLevel};
pub use view::{TreeRow, TreeView};
