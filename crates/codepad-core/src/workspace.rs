//! The workspace facade.
//!
//! ## Learning: The Facade Pattern
//!
//! `Workspace` is the only way to mutate a project. Every operation runs the
//! same pipeline:
//!
//! 1. apply the change to the [`FileTree`]
//! 2. fix up `selected_file` / `current_path`
//! 3. dispatch the resulting events synchronously (editor remap, observers,
//!    broadcast subscribers)
//! 4. save a full snapshot, unless a batch is open
//!
//! Step 3 finishes before the method returns, so the editor never sees a
//! half-migrated project and always remaps before the next user event.
//!
//! Saves are synchronous and best-effort: a failed save is logged and the
//! in-memory mutation stands. Because each save completes before the next
//! mutation can start, the last write always reflects the latest state.

use crate::config::Config;
use crate::event::{EventBus, Observer, ProjectEvent};
use crate::path;
use crate::preview;
use crate::project::{ProjectSnapshot, ProjectState};
use crate::store::ProjectStore;
use crate::surface::{EditorSurface, PreviewRenderer};
use crate::tree::{FileTree, NodeKind};
use crate::{CoreError, CoreResult};

/// A project plus everything wired to it.
pub struct Workspace {
    /// Project state (the only copy)
    state: ProjectState,

    /// Snapshot persistence
    store: Box<dyn ProjectStore>,

    /// Configuration
    config: Config,

    /// Event bus for notifications
    event_bus: EventBus,

    /// Injected editor surface
    editor: Option<Box<dyn EditorSurface>>,

    /// Injected preview pane
    preview: Option<Box<dyn PreviewRenderer>>,

    /// Nesting depth of open batches
    batch_depth: usize,

    /// Files touched inside the current batch
    batch_files: usize,

    /// A save was skipped while a batch was open
    dirty: bool,
}

impl Workspace {
    /// Opens a workspace, hydrating it from `store`.
    ///
    /// A missing snapshot starts an empty project. A failed load is logged
    /// and also starts empty.
    pub fn open(store: Box<dyn ProjectStore>, config: Config) -> Self {
        let state = match store.load() {
            Ok(Some(snapshot)) => {
                tracing::info!("Loaded project {:?}", snapshot.name);
                ProjectState::from_snapshot(snapshot)
            }
            Ok(None) => {
                tracing::info!("No saved project, starting empty");
                ProjectState::new(config.project.default_name.clone())
            }
            Err(e) => {
                tracing::error!("Failed to load project: {}", e);
                ProjectState::new(config.project.default_name.clone())
            }
        };

        Self {
            state,
            store,
            config,
            event_bus: EventBus::new(),
            editor: None,
            preview: None,
            batch_depth: 0,
            batch_files: 0,
            dirty: false,
        }
    }

    /// Injects the editor surface.
    pub fn attach_editor(&mut self, editor: Box<dyn EditorSurface>) {
        self.editor = Some(editor);
    }

    /// Injects the preview pane.
    pub fn attach_preview(&mut self, preview: Box<dyn PreviewRenderer>) {
        self.preview = Some(preview);
    }

    /// Registers a synchronous observer.
    pub fn observe(&mut self, observer: Box<dyn Observer>) {
        self.event_bus.observe(observer);
    }

    /// Subscribes to events asynchronously.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProjectEvent> {
        self.event_bus.subscribe()
    }

    // ==================== Getters ====================

    /// Returns the project state.
    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    /// Returns the file tree.
    pub fn tree(&self) -> &FileTree {
        &self.state.tree
    }

    /// Returns the project name.
    pub fn project_name(&self) -> &str {
        &self.state.name
    }

    /// Returns the default insertion folder.
    pub fn current_path(&self) -> &str {
        &self.state.current_path
    }

    /// Returns the highlighted file.
    pub fn selected_file(&self) -> Option<&str> {
        self.state.selected_file.as_deref()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Captures the persisted part of the state.
    pub fn snapshot(&self) -> ProjectSnapshot {
        self.state.snapshot()
    }

    // ==================== Content ====================

    /// Inserts or overwrites a file.
    pub fn set_content(&mut self, path: &str, content: impl Into<String>) -> CoreResult<()> {
        let events = self.state.tree.set_content(path, content)?;
        self.commit(events);
        Ok(())
    }

    /// Creates an empty file; `Conflict` if the path is taken.
    pub fn create_file(&mut self, path: &str) -> CoreResult<()> {
        let events = self.state.tree.create_file(path)?;
        self.commit(events);
        Ok(())
    }

    /// Creates a folder; `Conflict` if the path is taken.
    pub fn create_folder(&mut self, path: &str) -> CoreResult<()> {
        let events = self.state.tree.create_folder(path)?;
        self.commit(events);
        Ok(())
    }

    /// Materializes `path` and its ancestors as folders.
    pub fn ensure_folder(&mut self, path: &str) -> CoreResult<()> {
        let events = self.state.tree.ensure_folder(path)?;
        if !events.is_empty() {
            self.commit(events);
        }
        Ok(())
    }

    /// Records an edit made in the editor and refreshes the preview.
    pub fn edit(&mut self, path: &str, content: &str) -> CoreResult<()> {
        self.set_content(path, content)?;
        self.refresh_preview(path);
        Ok(())
    }

    // ==================== Structure ====================

    /// Deletes a file or folder. Returns the removed file paths.
    ///
    /// Deleting a path that does not exist is a no-op. Open editor buffers
    /// for removed files are released before this returns.
    pub fn delete(&mut self, path: &str) -> CoreResult<Vec<String>> {
        let events = self.state.tree.delete(path)?;
        let removed = events
            .iter()
            .filter_map(|event| match event {
                ProjectEvent::Deleted(file) => Some(file.clone()),
                _ => None,
            })
            .collect();
        if !events.is_empty() {
            self.commit(events);
        }
        Ok(removed)
    }

    /// Renames a file or folder in place.
    ///
    /// Fails with `Conflict` if `new_path` is taken. Every affected open file
    /// is remapped in the editor before this returns.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> CoreResult<()> {
        let events = self.state.tree.rename(old_path, new_path)?;
        if !events.is_empty() {
            self.commit(events);
        }
        Ok(())
    }

    /// Moves an entry into `dest_folder`, disambiguating its name.
    /// Returns where it ended up.
    pub fn move_entry(&mut self, source: &str, dest_folder: &str) -> CoreResult<String> {
        let (target, events) = self.state.tree.move_entry(source, dest_folder)?;
        if !events.is_empty() {
            self.commit(events);
        }
        Ok(target)
    }

    /// Duplicates an entry into `dest_folder`, disambiguating its name.
    /// Returns the path of the copy.
    pub fn copy_entry(&mut self, source: &str, dest_folder: &str) -> CoreResult<String> {
        let (target, events) = self.state.tree.copy_entry(source, dest_folder)?;
        self.commit(events);
        Ok(target)
    }

    /// Returns a free variant of `candidate` using the ` (n)` scheme.
    pub fn unique_path(&self, candidate: &str, kind: NodeKind) -> String {
        self.state.tree.unique_path(&path::normalize(candidate), kind)
    }

    // ==================== Selection ====================

    /// Opens a file in the editor and highlights it.
    pub fn open_file(&mut self, path: &str) -> CoreResult<()> {
        let path = path::normalize(path);
        let content = self
            .state
            .tree
            .content(&path)
            .ok_or_else(|| CoreError::NotFound(path.clone()))?
            .to_string();

        if let Some(editor) = self.editor.as_mut() {
            editor.open(&path, &content);
        }
        self.state.selected_file = Some(path.clone());
        self.refresh_preview(&path);
        Ok(())
    }

    /// Highlights a file without opening it.
    pub fn select_file(&mut self, path: Option<&str>) -> CoreResult<()> {
        match path.map(path::normalize) {
            Some(path) if !self.state.tree.is_file(&path) => Err(CoreError::NotFound(path)),
            selected => {
                self.state.selected_file = selected;
                Ok(())
            }
        }
    }

    /// Sets the default insertion folder. Not persisted until the next save.
    pub fn set_current_path(&mut self, folder: &str) -> CoreResult<()> {
        let folder = path::normalize(folder);
        if !self.state.tree.is_folder(&folder) {
            return Err(CoreError::NotFound(folder));
        }
        self.state.current_path = folder;
        Ok(())
    }

    /// Renames the project. Blank names are ignored.
    pub fn set_project_name(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.state.name = name.to_string();
        self.persist();
    }

    /// Discards everything and starts an empty project called `name`.
    pub fn new_project(&mut self, name: &str) {
        let name = match name.trim() {
            "" => self.config.project.default_name.clone(),
            trimmed => trimmed.to_string(),
        };
        tracing::info!("Starting new project {:?}", name);

        self.state = ProjectState::new(name.clone());
        if let Some(editor) = self.editor.as_mut() {
            editor.clear();
        }
        if let Some(preview) = self.preview.as_mut() {
            preview.content_changed("");
        }
        self.event_bus.emit(ProjectEvent::ProjectReset(name));
        self.persist();
    }

    // ==================== Batching ====================

    /// Defers saves until the matching [`finish_batch`](Self::finish_batch).
    ///
    /// Batches nest; only the outermost finish saves.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_files = 0;
        }
        self.batch_depth += 1;
    }

    /// Closes a batch, saving once and emitting `BatchFinished` if it was
    /// the outermost one.
    pub fn finish_batch(&mut self) {
        if self.batch_depth == 0 {
            tracing::warn!("finish_batch called without begin_batch");
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }

        if self.dirty {
            self.save();
        }
        let files = std::mem::take(&mut self.batch_files);
        tracing::info!("Batch finished ({} files)", files);
        self.event_bus.emit(ProjectEvent::BatchFinished { files });
    }

    /// Returns true while a batch is open.
    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    // ==================== Internals ====================

    /// Dispatches `events` and persists.
    fn commit(&mut self, events: Vec<ProjectEvent>) {
        for event in events {
            tracing::debug!("{:?}", event);
            self.apply_fixups(&event);
            self.forward_to_editor(&event);
            let touched = matches!(event, ProjectEvent::FileCreated(_) | ProjectEvent::ContentChanged(_));
            if touched && self.in_batch() {
                self.batch_files += 1;
            }
            self.event_bus.emit(event);
        }
        self.persist();
    }

    fn apply_fixups(&mut self, event: &ProjectEvent) {
        let state = &mut self.state;
        match event {
            ProjectEvent::Renamed { from, to } => {
                if state.selected_file.as_deref() == Some(from.as_str()) {
                    state.selected_file = Some(to.clone());
                }
            }
            ProjectEvent::FolderRenamed { from, to } => {
                if let Some(rebased) = path::rebase(&state.current_path, from, to) {
                    state.current_path = rebased;
                }
            }
            ProjectEvent::Deleted(file) => {
                if state.selected_file.as_deref() == Some(file.as_str()) {
                    state.selected_file = None;
                }
            }
            ProjectEvent::FolderDeleted(folder) => {
                if path::is_same_or_within(&state.current_path, folder) {
                    state.current_path = path::parent(folder).to_string();
                }
            }
            _ => {}
        }
    }

    fn forward_to_editor(&mut self, event: &ProjectEvent) {
        let Some(editor) = self.editor.as_mut() else { return };
        match event {
            ProjectEvent::Renamed { from, to } => editor.renamed(from, to),
            ProjectEvent::Deleted(file) => editor.released(file),
            _ => {}
        }
    }

    fn refresh_preview(&mut self, path: &str) {
        let Some(preview_pane) = self.preview.as_mut() else { return };
        let Some(content) = self.state.tree.content(path) else { return };
        let open = self.editor.as_ref().map(|e| e.open_paths()).unwrap_or_default();

        if let Some(html) = preview::resolve(&self.state.tree, &open, path, content) {
            preview_pane.content_changed(&html);
        }
    }

    fn persist(&mut self) {
        if self.in_batch() {
            self.dirty = true;
        } else {
            self.save();
        }
    }

    /// Writes a snapshot now. Failures are logged, never returned.
    pub fn save(&mut self) {
        if let Err(e) = self.flush() {
            tracing::error!("Failed to save project: {}", e);
        }
    }

    /// Writes a snapshot now and reports a failed write.
    ///
    /// For hosts where the user explicitly asked for the save.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.dirty = false;
        self.store.save(&self.state.snapshot())?;
        Ok(())
    }
}
