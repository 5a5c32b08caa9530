//! # Codepad Archive
//!
//! Getting files into a project and back out again.
//!
//! - [`Importer`] turns loose files, directory trees and ZIP archives into
//!   `(path, text)` pairs and feeds them through the
//!   [`Workspace`](codepad_core::Workspace), one batch per call.
//! - [`export_zip`] and [`write_zip`] serialize the whole tree as a ZIP.
//!
//! ## Learning: Partial Success
//!
//! Imports are not transactional. Each entry is fully committed before the
//! next one is read, so a malformed archive stops the import where it
//! failed and leaves everything before it in place. The returned
//! [`ImportReport`] (or the error) says how far it got.

pub mod export;
pub mod import;

pub use export::{ExportError, export_zip, write_zip};
pub use import::{ImportError, ImportReport, Importer};
