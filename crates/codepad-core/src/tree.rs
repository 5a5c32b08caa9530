//! The virtual file tree.
//!
//! `FileTree` maps normalized paths to text content. Folders are not files:
//! they live in a separate ordered set that always holds every ancestor of
//! every stored file, plus folders created empty on purpose. That makes
//! "does this path exist" a set lookup and keeps the UI projection a pure
//! function of the model.
//!
//! ## Learning: Ordered Maps as Indexes
//!
//! Both collections are `BTree*`, so all paths below `p/` form one contiguous
//! key range starting at `"p/"`. Prefix queries (descendants, folder renames,
//! cascading deletes) are range scans instead of full walks.
//!
//! Every mutation returns the [`ProjectEvent`]s it caused. The model never
//! dispatches them itself; the owning [`Workspace`](crate::Workspace) does,
//! synchronously, after the mutation is fully applied.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::event::ProjectEvent;
use crate::path;
use crate::{CoreError, CoreResult};

/// Type of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Folder,
}

/// The authoritative mapping of path to content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    files: BTreeMap<String, String>,
    folders: BTreeSet<String>,
}

impl FileTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Queries ====================

    /// Returns what `path` names, if anything. The root is a folder.
    pub fn kind_of(&self, path: &str) -> Option<NodeKind> {
        if path.is_empty() || self.folders.contains(path) {
            Some(NodeKind::Folder)
        } else if self.files.contains_key(path) {
            Some(NodeKind::File)
        } else {
            None
        }
    }

    /// Returns true if `path` names a file or folder.
    pub fn exists(&self, path: &str) -> bool {
        self.kind_of(path).is_some()
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.kind_of(path) == Some(NodeKind::Folder)
    }

    /// Returns the content stored at `path`.
    pub fn content(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Iterates over `(path, content)` pairs in path order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over file paths in path order.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Iterates over folder paths in path order.
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }

    /// Folders with nothing at all below them.
    pub fn empty_folders(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str).filter(|folder| {
            self.list_descendants(folder).next().is_none() && self.folders_within(folder).next().is_none()
        })
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if the tree holds no files and no folders.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }

    /// File paths strictly below `folder`, in path order.
    ///
    /// The iterator borrows the tree, so it always reflects the current
    /// state; call it again to restart. An empty `folder` lists every file.
    pub fn list_descendants<'a>(&'a self, folder: &str) -> Descendants<'a> {
        Descendants::new(&self.files, folder)
    }

    fn folders_within<'a>(&'a self, folder: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        let prefix = format!("{folder}/");
        self.folders
            .range::<String, _>((Bound::Included(prefix.clone()), Bound::Unbounded))
            .take_while(move |candidate| candidate.starts_with(&prefix))
    }

    // ==================== Naming ====================

    /// Appends ` (1)`, ` (2)`, ... before the extension until `candidate`
    /// no longer collides. Folders and extension-less names get the suffix
    /// at the end. Returns `candidate` unchanged when it is free.
    pub fn unique_path(&self, candidate: &str, kind: NodeKind) -> String {
        self.first_free(candidate, kind, |stem, n| format!("{stem} ({n})"))
    }

    /// Appends `_1`, `_2`, ... before the extension until `candidate` no
    /// longer collides. This is the scheme used when pasting and moving.
    pub fn disambiguate(&self, candidate: &str, kind: NodeKind) -> String {
        self.first_free(candidate, kind, |stem, n| format!("{stem}_{n}"))
    }

    fn first_free(&self, candidate: &str, kind: NodeKind, suffix: impl Fn(&str, usize) -> String) -> String {
        if !self.exists(candidate) {
            return candidate.to_string();
        }

        let parent = path::parent(candidate);
        let name = path::file_name(candidate);
        let (stem, ext) = match kind {
            NodeKind::File => path::split_extension(name),
            NodeKind::Folder => (name, None),
        };

        (1..)
            .map(|n| {
                let stem = suffix(stem, n);
                let name = match ext {
                    Some(ext) => format!("{stem}.{ext}"),
                    None => stem,
                };
                path::join(parent, &name)
            })
            .find(|attempt| !self.exists(attempt))
            .unwrap_or_else(|| candidate.to_string())
    }

    // ==================== Mutation ====================

    /// Inserts or overwrites a file.
    ///
    /// Missing ancestor folders are materialized. Fails with `Conflict` only
    /// when `path` is a folder or one of its ancestors is a file.
    pub fn set_content(&mut self, path: &str, content: impl Into<String>) -> CoreResult<Vec<ProjectEvent>> {
        let path = path::validate(path)?;
        if self.folders.contains(&path) {
            return Err(CoreError::Conflict(path));
        }

        let mut events = self.ensure_folder(path::parent(&path))?;
        let event = if self.files.insert(path.clone(), content.into()).is_some() {
            ProjectEvent::ContentChanged(path)
        } else {
            ProjectEvent::FileCreated(path)
        };
        events.push(event);
        Ok(events)
    }

    /// Creates an empty file, failing if anything already lives at `path`.
    pub fn create_file(&mut self, path: &str) -> CoreResult<Vec<ProjectEvent>> {
        let path = path::validate(path)?;
        if self.exists(&path) {
            return Err(CoreError::Conflict(path));
        }
        self.set_content(&path, String::new())
    }

    /// Creates a folder, failing if anything already lives at `path`.
    pub fn create_folder(&mut self, path: &str) -> CoreResult<Vec<ProjectEvent>> {
        let path = path::validate(path)?;
        if self.exists(&path) {
            return Err(CoreError::Conflict(path));
        }
        self.ensure_folder(&path)
    }

    /// Materializes `path` and every missing ancestor as folders.
    ///
    /// Idempotent: existing folders are left alone and only newly created
    /// ones are reported, shallowest first. The root needs nothing.
    pub fn ensure_folder(&mut self, path: &str) -> CoreResult<Vec<ProjectEvent>> {
        let path = path::normalize(path);
        if path.is_empty() {
            return Ok(Vec::new());
        }
        let path = path::validate(&path)?;

        let chain: Vec<&str> = path::ancestors(&path).chain(std::iter::once(path.as_str())).collect();
        if let Some(blocker) = chain.iter().find(|p| self.files.contains_key(**p)) {
            return Err(CoreError::Conflict(blocker.to_string()));
        }

        let mut events = Vec::new();
        for folder in chain {
            if self.folders.insert(folder.to_string()) {
                events.push(ProjectEvent::FolderCreated(folder.to_string()));
            }
        }
        Ok(events)
    }

    /// Removes a file, or a folder and everything below it.
    ///
    /// Removing a path that does not exist is a no-op and yields no events.
    pub fn delete(&mut self, path: &str) -> CoreResult<Vec<ProjectEvent>> {
        let path = path::validate(path)?;

        if self.files.remove(&path).is_some() {
            return Ok(vec![ProjectEvent::Deleted(path)]);
        }

        let doomed: Vec<String> = self.list_descendants(&path).map(str::to_string).collect();
        let nested: Vec<String> = self.folders_within(&path).cloned().collect();
        let had_folder = self.folders.remove(&path);

        let mut events = Vec::with_capacity(doomed.len() + 1);
        for file in doomed {
            self.files.remove(&file);
            events.push(ProjectEvent::Deleted(file));
        }
        for folder in nested {
            self.folders.remove(&folder);
        }
        if had_folder {
            events.push(ProjectEvent::FolderDeleted(path));
        }
        Ok(events)
    }

    /// Renames `old_path` to `new_path`, carrying every descendant along.
    ///
    /// Fails with `NotFound` if nothing lives at `old_path` and `Conflict`
    /// if anything already lives at `new_path`. A folder cannot be renamed
    /// into its own subtree. Renaming a path to itself does nothing.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> CoreResult<Vec<ProjectEvent>> {
        let old_path = path::validate(old_path)?;
        let new_path = path::validate(new_path)?;
        if old_path == new_path {
            return Ok(Vec::new());
        }

        let kind = self
            .kind_of(&old_path)
            .ok_or_else(|| CoreError::NotFound(old_path.clone()))?;
        if self.exists(&new_path) {
            return Err(CoreError::Conflict(new_path));
        }
        if kind == NodeKind::Folder && path::is_within(&new_path, &old_path) {
            return Err(CoreError::InvalidOperation(format!(
                "cannot move folder {old_path} into itself"
            )));
        }

        self.relocate(&old_path, &new_path, kind)
    }

    /// Moves `source` into `dest_folder`, disambiguating the name with the
    /// `_1`, `_2`, ... scheme if it collides.
    ///
    /// Returns the path the entry ended up at. Moving an entry to the folder
    /// it already lives in does nothing and returns its current path.
    pub fn move_entry(&mut self, source: &str, dest_folder: &str) -> CoreResult<(String, Vec<ProjectEvent>)> {
        let (source, kind, candidate) = self.placement(source, dest_folder)?;
        if candidate == source {
            return Ok((source, Vec::new()));
        }

        let target = self.disambiguate(&candidate, kind);
        let events = self.relocate(&source, &target, kind)?;
        Ok((target, events))
    }

    /// Duplicates `source` (and, for folders, all of its content) into
    /// `dest_folder` under a disambiguated name. The source is untouched.
    pub fn copy_entry(&mut self, source: &str, dest_folder: &str) -> CoreResult<(String, Vec<ProjectEvent>)> {
        let (source, kind, candidate) = self.placement(source, dest_folder)?;
        let target = self.disambiguate(&candidate, kind);

        let mut events = Vec::new();
        match kind {
            NodeKind::File => {
                let content = self.files.get(&source).cloned().unwrap_or_default();
                events.extend(self.set_content(&target, content)?);
            }
            NodeKind::Folder => {
                let files: Vec<(String, String)> = self
                    .list_descendants(&source)
                    .filter_map(|p| Some((path::rebase(p, &source, &target)?, self.files.get(p)?.clone())))
                    .collect();
                let folders: Vec<String> = self
                    .folders_within(&source)
                    .filter_map(|f| path::rebase(f, &source, &target))
                    .collect();

                events.extend(self.ensure_folder(&target)?);
                for folder in folders {
                    events.extend(self.ensure_folder(&folder)?);
                }
                for (file, content) in files {
                    events.extend(self.set_content(&file, content)?);
                }
            }
        }
        Ok((target, events))
    }

    /// Validates a move/copy request and returns the source, its kind and
    /// the undisambiguated destination path.
    fn placement(&self, source: &str, dest_folder: &str) -> CoreResult<(String, NodeKind, String)> {
        let source = path::validate(source)?;
        let dest_folder = path::normalize(dest_folder);

        let kind = self
            .kind_of(&source)
            .ok_or_else(|| CoreError::NotFound(source.clone()))?;
        if !self.is_folder(&dest_folder) {
            return Err(CoreError::NotFound(dest_folder));
        }
        if kind == NodeKind::Folder && path::is_same_or_within(&dest_folder, &source) {
            return Err(CoreError::InvalidOperation(format!(
                "cannot place folder {source} inside itself"
            )));
        }

        let candidate = path::join(&dest_folder, path::file_name(&source));
        Ok((source, kind, candidate))
    }

    /// Moves `from` to the free path `to`, substituting the prefix of every
    /// descendant. Callers have already checked that `to` is free.
    fn relocate(&mut self, from: &str, to: &str, kind: NodeKind) -> CoreResult<Vec<ProjectEvent>> {
        let mut events = self.ensure_folder(path::parent(to))?;

        match kind {
            NodeKind::File => {
                if let Some(content) = self.files.remove(from) {
                    self.files.insert(to.to_string(), content);
                    events.push(ProjectEvent::Renamed {
                        from: from.to_string(),
                        to: to.to_string(),
                    });
                }
            }
            NodeKind::Folder => {
                let moved_files: Vec<String> = self.list_descendants(from).map(str::to_string).collect();
                let moved_folders: Vec<String> = self.folders_within(from).cloned().collect();

                self.folders.remove(from);
                self.folders.insert(to.to_string());
                for folder in moved_folders {
                    self.folders.remove(&folder);
                    if let Some(rebased) = path::rebase(&folder, from, to) {
                        self.folders.insert(rebased);
                    }
                }

                let mut renamed = Vec::with_capacity(moved_files.len());
                for file in moved_files {
                    let Some(content) = self.files.remove(&file) else { continue };
                    if let Some(rebased) = path::rebase(&file, from, to) {
                        self.files.insert(rebased.clone(), content);
                        renamed.push(ProjectEvent::Renamed { from: file, to: rebased });
                    }
                }

                events.push(ProjectEvent::FolderRenamed {
                    from: from.to_string(),
                    to: to.to_string(),
                });
                events.extend(renamed);
            }
        }

        tracing::debug!("Moved {} -> {}", from, to);
        Ok(events)
    }

    /// Inserts a file without emitting events or checking conflicts.
    ///
    /// Used when hydrating from a snapshot that was already normalized.
    pub(crate) fn insert_raw(&mut self, path: String, content: String) {
        for ancestor in path::ancestors(&path) {
            self.folders.insert(ancestor.to_string());
        }
        self.files.insert(path, content);
    }

    /// Registers a folder marker without emitting events.
    pub(crate) fn insert_folder_raw(&mut self, path: &str) {
        for ancestor in path::ancestors(path) {
            self.folders.insert(ancestor.to_string());
        }
        self.folders.insert(path.to_string());
    }
}

/// Lazy, ordered iterator over the files below a folder.
pub struct Descendants<'a> {
    range: std::collections::btree_map::Range<'a, String, String>,
    prefix: String,
}

impl<'a> Descendants<'a> {
    fn new(files: &'a BTreeMap<String, String>, folder: &str) -> Self {
        let folder = path::normalize(folder);
        let prefix = if folder.is_empty() { String::new() } else { format!("{folder}/") };
        let range = files.range::<String, _>((Bound::Included(prefix.clone()), Bound::Unbounded));
        Self { range, prefix }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, _) = self.range.next()?;
        if key.starts_with(&self.prefix) {
            Some(key.as_str())
        } else {
            None
        }
    }
}
