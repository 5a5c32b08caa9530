//! Project path helpers.
//!
//! Project paths are plain strings: `/`-separated, root-relative, with no
//! leading, trailing or doubled separators. The empty string is the project
//! root. Everything that enters the model goes through [`normalize`] or
//! [`validate`] first, whatever platform the path came from.
//!
//! ## Learning: Borrowed Returns
//!
//! `parent` and `file_name` return `&str` slices of their input instead of
//! fresh `String`s. The borrow checker ties the result's lifetime to the
//! argument, so callers cannot keep a slice alive past the path it points into.

use crate::{CoreError, CoreResult};

/// Separator used in every stored path.
pub const SEPARATOR: char = '/';

/// Normalizes a raw path string.
///
/// Backslashes become `/`, empty and `.` segments are dropped, and no
/// separator is left at either end.
///
/// # Example
/// ```
/// use codepad_core::path::normalize;
///
/// assert_eq!(normalize("a\\b//c/"), "a/b/c");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalizes `raw` and rejects paths the model cannot store.
///
/// The root (empty path) and any `..` segment are invalid.
pub fn validate(raw: &str) -> CoreResult<String> {
    let path = normalize(raw);
    if path.is_empty() || path.split(SEPARATOR).any(|segment| segment == "..") {
        return Err(CoreError::InvalidPath(raw.to_string()));
    }
    Ok(path)
}

/// Joins a folder path and a child name. An empty parent is the root.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Returns the parent folder of `path` (empty for top-level entries).
pub fn parent(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Returns the last segment of `path`.
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Splits a base name into stem and extension.
///
/// A leading dot does not start an extension, so `.gitignore` has none.
/// Only the last dot counts: `archive.tar.gz` is `("archive.tar", "gz")`.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Returns the lowercased extension of the last segment, if any.
pub fn extension(path: &str) -> Option<String> {
    split_extension(file_name(path)).1.map(str::to_ascii_lowercase)
}

/// Returns true if `path` lies strictly below `ancestor`.
///
/// Every non-empty path is within the root.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return !path.is_empty();
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Returns true if `path` is `ancestor` or lies below it.
pub fn is_same_or_within(path: &str, ancestor: &str) -> bool {
    path == ancestor || is_within(path, ancestor)
}

/// Replaces the `from` prefix of `path` with `to`.
///
/// Returns `None` when `path` is neither `from` nor below it.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    if path == from {
        Some(to.to_string())
    } else if is_within(path, from) {
        Some(join(to, &path[from.len() + 1..]))
    } else {
        None
    }
}

/// Proper ancestors of `path`, shallowest first.
///
/// `ancestors("a/b/c")` yields `a` and `a/b`.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices(SEPARATOR).map(move |(idx, _)| &path[..idx])
}

/// Number of segments in `path` (zero for the root).
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split(SEPARATOR).count()
    }
}
