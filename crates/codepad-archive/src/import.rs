//! Import pipeline.
//!
//! Three sources, one shape: every source is reduced to normalized
//! `(path, text)` pairs applied with `set_content`, with folders
//! materialized before anything is attached below them.
//!
//! Content is text. Valid UTF-8 is stored as-is; anything else is decoded
//! lossily and logged, so binary files do not survive an import intact.

use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use codepad_core::{ConflictPolicy, CoreError, ImportConfig, NodeKind, Workspace, path};
use zip::ZipArchive;
use zip::result::ZipError;

/// Import errors.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ZIP file {archive} could not be read: {source}")]
    Zip {
        archive: String,
        #[source]
        source: ZipError,
    },

    #[error("Cannot import {path}: {source}")]
    Model {
        path: String,
        #[source]
        source: CoreError,
    },

    #[error("Import cancelled")]
    Cancelled,
}

impl ImportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ImportError::Io { path: path.to_path_buf(), source }
    }

    fn zip(archive: &str, source: ZipError) -> Self {
        ImportError::Zip { archive: archive.to_string(), source }
    }
}

/// What an import did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Files stored (created or overwritten)
    pub files: usize,

    /// Folders newly created
    pub folders: usize,

    /// Entries skipped and units that failed, one message each
    pub failures: Vec<String>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One line for the status bar.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Imported {} file{}, {} folder{}",
            self.files,
            if self.files == 1 { "" } else { "s" },
            self.folders,
            if self.folders == 1 { "" } else { "s" },
        );
        match self.failures.as_slice() {
            [] => {}
            [only] => line.push_str(&format!("; failed: {only}")),
            [first, rest @ ..] => line.push_str(&format!("; failed: {first} (and {} more)", rest.len())),
        }
        line
    }

    fn absorb(&mut self, other: ImportReport) {
        self.files += other.files;
        self.folders += other.folders;
        self.failures.extend(other.failures);
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

type ImportResult<T> = Result<T, ImportError>;

/// Feeds external files into a workspace.
pub struct Importer<'a> {
    ws: &'a mut Workspace,
    config: ImportConfig,
    /// Folder imports land in
    dest: String,
}

impl<'a> Importer<'a> {
    /// Creates an importer using the workspace's import config, targeting
    /// the project root.
    pub fn new(ws: &'a mut Workspace) -> Self {
        let config = ws.config().import.clone();
        Self { ws, config, dest: String::new() }
    }

    /// Overrides the import config.
    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// Imports below `folder` instead of the root.
    pub fn into_folder(mut self, folder: &str) -> Self {
        self.dest = path::normalize(folder);
        self
    }

    // ==================== Entry points ====================

    /// Imports a mixed selection the way a drop is handled: directories
    /// first, then loose files, then ZIP archives.
    ///
    /// Each directory and archive is its own unit; a failing unit is
    /// recorded in the report and the rest still run. An empty selection
    /// is `Cancelled`.
    pub async fn import_paths(&mut self, paths: &[PathBuf]) -> ImportResult<ImportReport> {
        if paths.is_empty() {
            return Err(ImportError::Cancelled);
        }

        let mut report = ImportReport::default();
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let mut archives = Vec::new();
        for source in paths {
            if is_zip(source) {
                archives.push(source.clone());
                continue;
            }
            match tokio::fs::metadata(source).await {
                Ok(meta) if meta.is_dir() => dirs.push(source.clone()),
                Ok(_) => files.push(source.clone()),
                Err(e) => report.failures.push(ImportError::io(source, e).to_string()),
            }
        }

        self.ws.begin_batch();
        for dir in &dirs {
            let unit = self.import_directory(dir).await;
            collect(&mut report, unit);
        }
        if !files.is_empty() {
            let unit = self.import_files(&files).await;
            collect(&mut report, unit);
        }
        for archive in &archives {
            let unit = self.import_zip(archive).await;
            collect(&mut report, unit);
        }
        self.ws.finish_batch();

        if report.is_clean() {
            tracing::info!("{}", report.summary());
        } else {
            tracing::warn!("{}", report.summary());
        }
        Ok(report)
    }

    /// Imports a directory tree as `<dest>/<dir name>/...`.
    pub async fn import_directory(&mut self, dir: &Path) -> ImportResult<ImportReport> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root = path::join(&self.dest, &path::normalize(&name));

        let (before, mut report) = self.start();
        let result = self.walk(dir, root, &mut report).await;
        self.finish(before, report, result)
    }

    /// Imports loose files as `<dest>/<file name>`.
    pub async fn import_files(&mut self, files: &[PathBuf]) -> ImportResult<ImportReport> {
        let (before, mut report) = self.start();
        let mut result = Ok(());
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let target = path::join(&self.dest, &path::normalize(&name));
            result = self.read_file(file, &target, &mut report).await;
            if result.is_err() {
                break;
            }
        }
        self.finish(before, report, result)
    }

    /// Reads and imports a ZIP archive from disk.
    pub async fn import_zip(&mut self, archive: &Path) -> ImportResult<ImportReport> {
        let bytes = tokio::fs::read(archive)
            .await
            .map_err(|e| ImportError::io(archive, e))?;
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive.display().to_string());
        self.import_zip_bytes(&name, bytes).await
    }

    /// Imports an in-memory ZIP archive below `dest`.
    ///
    /// Directory entries are created first, shallowest first, then file
    /// entries are inflated and attached one at a time.
    pub async fn import_zip_bytes(&mut self, archive: &str, bytes: Vec<u8>) -> ImportResult<ImportReport> {
        let zip = open_archive(archive, bytes)?;
        self.import_archive(archive, zip).await
    }

    /// Replaces the project with the contents of `dir`, named after it.
    ///
    /// The current project is only discarded once `dir` is known to be a
    /// readable directory.
    pub async fn open_folder_as_project(&mut self, dir: &Path) -> ImportResult<ImportReport> {
        let meta = tokio::fs::metadata(dir).await.map_err(|e| ImportError::io(dir, e))?;
        if !meta.is_dir() {
            return Err(ImportError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        tokio::fs::read_dir(dir).await.map_err(|e| ImportError::io(dir, e))?;

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ws.new_project(&name);
        let root = self.dest.clone();

        let (before, mut report) = self.start();
        let result = self.walk(dir, root, &mut report).await;
        self.finish(before, report, result)
    }

    /// Replaces the project with the contents of a ZIP archive, named after
    /// the archive's file stem.
    ///
    /// The archive is parsed before anything is reset, so an unreadable
    /// archive leaves the current project untouched.
    pub async fn open_zip_as_project(&mut self, archive: &Path) -> ImportResult<ImportReport> {
        let bytes = tokio::fs::read(archive)
            .await
            .map_err(|e| ImportError::io(archive, e))?;
        let stem = archive
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let zip = open_archive(&name, bytes)?;
        self.ws.new_project(&stem);
        self.import_archive(&name, zip).await
    }

    // ==================== Units ====================

    /// Opens the batch for one import unit.
    fn start(&mut self) -> (usize, ImportReport) {
        self.ws.begin_batch();
        (self.ws.tree().folders().count(), ImportReport::default())
    }

    /// Closes the unit's batch and fills in the folder count.
    fn finish(&mut self, folders_before: usize, mut report: ImportReport, result: ImportResult<()>) -> ImportResult<ImportReport> {
        self.ws.finish_batch();
        report.folders = self.ws.tree().folders().count().saturating_sub(folders_before);
        match result {
            Ok(()) => Ok(report),
            Err(e) => {
                tracing::error!("{} ({} files imported before the failure)", e, report.files);
                Err(e)
            }
        }
    }

    async fn import_archive(&mut self, archive: &str, zip: ZipArchive<Cursor<Vec<u8>>>) -> ImportResult<ImportReport> {
        let (before, mut report) = self.start();
        let result = self.unpack(archive, zip, &mut report).await;
        self.finish(before, report, result)
    }

    /// Depth-first walk of `dir`, children in name order.
    async fn walk(&mut self, dir: &Path, root: String, report: &mut ImportReport) -> ImportResult<()> {
        let mut stack = vec![(dir.to_path_buf(), root, true)];

        while let Some((source, target, is_dir)) = stack.pop() {
            if !is_dir {
                self.read_file(&source, &target, report).await?;
                continue;
            }

            if !target.is_empty() {
                self.ws
                    .ensure_folder(&target)
                    .map_err(|e| ImportError::Model { path: target.clone(), source: e })?;
            }

            let mut children = Vec::new();
            let mut entries = tokio::fs::read_dir(&source)
                .await
                .map_err(|e| ImportError::io(&source, e))?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| ImportError::io(&source, e))? {
                let name = entry.file_name().to_string_lossy().into_owned();
                if self.config.skips(&name) {
                    tracing::debug!("Skipping {}", entry.path().display());
                    continue;
                }
                let file_type = entry.file_type().await.map_err(|e| ImportError::io(&entry.path(), e))?;
                if file_type.is_symlink() {
                    tracing::warn!("Skipping symlink {}", entry.path().display());
                    report.failures.push(format!("{} (symlink)", entry.path().display()));
                    continue;
                }
                children.push((name, entry.path(), file_type.is_dir()));
            }

            children.sort_by(|a, b| a.0.cmp(&b.0));
            for (name, child, child_is_dir) in children.into_iter().rev() {
                stack.push((child, path::join(&target, &path::normalize(&name)), child_is_dir));
            }
        }
        Ok(())
    }

    /// Reads one file from disk and stores it at `target`.
    async fn read_file(&mut self, source: &Path, target: &str, report: &mut ImportReport) -> ImportResult<()> {
        let meta = tokio::fs::metadata(source).await.map_err(|e| ImportError::io(source, e))?;
        if meta.len() > self.config.max_file_size {
            tracing::warn!("Skipping {} ({} bytes)", source.display(), meta.len());
            report.failures.push(format!("{} (too large)", source.display()));
            return Ok(());
        }

        let bytes = tokio::fs::read(source).await.map_err(|e| ImportError::io(source, e))?;
        self.store(target, bytes, report)
    }

    async fn unpack(
        &mut self,
        archive: &str,
        mut zip: ZipArchive<Cursor<Vec<u8>>>,
        report: &mut ImportReport,
    ) -> ImportResult<()> {
        // Classify from the central directory without inflating anything
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for index in 0..zip.len() {
            let entry = zip.by_index_raw(index).map_err(|e| ImportError::zip(archive, e))?;
            let name = entry.name().to_string();
            let normalized = match path::validate(&name) {
                Ok(normalized) => normalized,
                Err(_) if path::normalize(&name).is_empty() => continue,
                Err(e) => {
                    tracing::warn!("Skipping {} in {}: {}", name, archive, e);
                    report.failures.push(format!("{archive}:{name} (invalid path)"));
                    continue;
                }
            };
            let target = path::join(&self.dest, &normalized);
            if entry.is_dir() {
                dirs.push(target);
            } else {
                files.push((index, target, entry.size()));
            }
        }

        dirs.sort_by_key(|dir| path::depth(dir));
        for dir in dirs {
            self.ws
                .ensure_folder(&dir)
                .map_err(|e| ImportError::Model { path: dir.clone(), source: e })?;
        }

        let limit = self.config.max_file_size;
        for (index, target, size) in files {
            if size > limit {
                tracing::warn!("Skipping {} in {} ({} bytes)", target, archive, size);
                report.failures.push(format!("{archive}:{target} (too large)"));
                continue;
            }

            // The declared size can lie, so the limit also caps the inflated bytes
            let mut entry = zip.by_index(index).map_err(|e| ImportError::zip(archive, e))?;
            let mut data = Vec::with_capacity(size as usize);
            (&mut entry)
                .take(limit.saturating_add(1))
                .read_to_end(&mut data)
                .map_err(|e| ImportError::zip(archive, ZipError::Io(e)))?;
            drop(entry);

            if data.len() as u64 > limit {
                tracing::warn!("Skipping {} in {} (inflates past {} bytes)", target, archive, limit);
                report.failures.push(format!("{archive}:{target} (too large)"));
                continue;
            }

            self.store(&target, data, report)?;
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Decodes `bytes` and writes them at `target`, honoring the conflict
    /// policy.
    fn store(&mut self, target: &str, bytes: Vec<u8>, report: &mut ImportReport) -> ImportResult<()> {
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("{} is not valid UTF-8, importing lossily", target);
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let target = match self.config.on_conflict {
            ConflictPolicy::KeepBoth if self.ws.tree().exists(target) => self.ws.unique_path(target, NodeKind::File),
            _ => target.to_string(),
        };

        self.ws
            .set_content(&target, text)
            .map_err(|e| ImportError::Model { path: target.clone(), source: e })?;
        report.files += 1;
        Ok(())
    }
}

/// Folds a unit's outcome into a combined report.
fn collect(report: &mut ImportReport, unit: ImportResult<ImportReport>) {
    match unit {
        Ok(part) => report.absorb(part),
        Err(e) => report.failures.push(e.to_string()),
    }
}

fn open_archive(archive: &str, bytes: Vec<u8>) -> ImportResult<ZipArchive<Cursor<Vec<u8>>>> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| ImportError::zip(archive, e))
}

fn is_zip(source: &Path) -> bool {
    source
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::{Config, MemoryStore, ProjectEvent};
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn workspace() -> (Workspace, MemoryStore) {
        let store = MemoryStore::new();
        let ws = Workspace::open(Box::new(store.clone()), Config::default());
        (ws, store)
    }

    fn zip_of(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            match content {
                Some(content) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(content.as_bytes()).unwrap();
                }
                None => writer.add_directory(*name, options).unwrap(),
            }
        }
        writer.finish().unwrap().into_inner()
    }

    /// Overwrites the uncompressed size field of the header starting at `at`.
    fn forge_size(bytes: &mut [u8], at: usize, offset: usize, size: u32) {
        bytes[at + offset..at + offset + 4].copy_from_slice(&size.to_le_bytes());
    }

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let full = root.join(rel);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    #[tokio::test]
    async fn test_import_directory() {
        let dir = tempdir().unwrap();
        let site = dir.path().join("site");
        write(&site, "index.html", b"<h1>Hi</h1>");
        write(&site, "css/site.css", b"body {}");
        write(&site, ".git/config", b"[core]");
        std::fs::create_dir_all(site.join("img")).unwrap();

        let (mut ws, store) = workspace();
        let mut config = ImportConfig::default();
        config.skip_hidden = true;
        let report = Importer::new(&mut ws)
            .with_config(config)
            .import_directory(&site)
            .await
            .unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.folders, 3);
        assert_eq!(ws.tree().content("site/css/site.css"), Some("body {}"));
        assert!(ws.tree().is_folder("site/img"));
        assert!(!ws.tree().exists("site/.git"));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_import_files_keep_both() {
        let dir = tempdir().unwrap();
        write(dir.path(), "notes.txt", b"new");

        let (mut ws, _) = workspace();
        ws.set_content("notes.txt", "old").unwrap();
        let mut config = ImportConfig::default();
        config.on_conflict = ConflictPolicy::KeepBoth;

        Importer::new(&mut ws)
            .with_config(config)
            .import_files(&[dir.path().join("notes.txt")])
            .await
            .unwrap();

        assert_eq!(ws.tree().content("notes.txt"), Some("old"));
        assert_eq!(ws.tree().content("notes (1).txt"), Some("new"));
    }

    #[tokio::test]
    async fn test_import_files_overwrite_into_folder() {
        let dir = tempdir().unwrap();
        write(dir.path(), "app.js", b"v2");

        let (mut ws, _) = workspace();
        ws.set_content("js/app.js", "v1").unwrap();
        Importer::new(&mut ws)
            .into_folder("js")
            .import_files(&[dir.path().join("app.js")])
            .await
            .unwrap();

        assert_eq!(ws.tree().content("js/app.js"), Some("v2"));
    }

    #[tokio::test]
    async fn test_zip_parents_exist_before_children() {
        let (mut ws, _) = workspace();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ws.observe(Box::new(move |event: &ProjectEvent| sink.borrow_mut().push(event.clone())));

        let bytes = zip_of(&[("x/y/z.txt", Some("deep"))]);
        Importer::new(&mut ws).import_zip_bytes("deep.zip", bytes).await.unwrap();

        let seen = seen.borrow();
        let position = |event: &ProjectEvent| seen.iter().position(|e| e == event).unwrap();
        let file = position(&ProjectEvent::FileCreated("x/y/z.txt".into()));
        assert!(position(&ProjectEvent::FolderCreated("x".into())) < file);
        assert!(position(&ProjectEvent::FolderCreated("x/y".into())) < file);
    }

    #[tokio::test]
    async fn test_zip_directory_entries_shallow_first() {
        let (mut ws, _) = workspace();
        let bytes = zip_of(&[
            ("a/b/c/", None),
            ("a/", None),
            ("a/b/readme.md", Some("# b")),
        ]);

        let report = Importer::new(&mut ws).import_zip_bytes("dirs.zip", bytes).await.unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(report.folders, 3);
        assert!(ws.tree().is_folder("a/b/c"));
    }

    #[tokio::test]
    async fn test_malformed_zip() {
        let (mut ws, _) = workspace();
        let err = Importer::new(&mut ws)
            .import_zip_bytes("broken.zip", b"not a zip".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Zip { ref archive, .. } if archive == "broken.zip"));
        assert!(ws.tree().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_keeps_earlier_entries() {
        let mut bytes = zip_of(&[("first.txt", Some("first-entry")), ("second.txt", Some("second-entry"))]);
        let needle = b"second-entry";
        let at = bytes.windows(needle.len()).position(|w| w == needle).unwrap();
        bytes[at..at + needle.len()].copy_from_slice(b"SECOND-ENTRY");

        let (mut ws, store) = workspace();
        let result = Importer::new(&mut ws).import_zip_bytes("partial.zip", bytes).await;

        assert!(matches!(result, Err(ImportError::Zip { .. })));
        assert_eq!(ws.tree().content("first.txt"), Some("first-entry"));
        assert!(!ws.tree().exists("second.txt"));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_inflated_size_is_capped() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        writer.start_file("bomb.txt", options).unwrap();
        writer.write_all(&vec![b'a'; 1_000_000]).unwrap();
        writer.start_file("ok.txt", options).unwrap();
        writer.write_all(b"fine").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        // Local header at the start, first central directory header after the data
        forge_size(&mut bytes, 0, 22, 10);
        let central = bytes.windows(4).position(|w| w == b"PK\x01\x02").unwrap();
        forge_size(&mut bytes, central, 24, 10);

        let (mut ws, _) = workspace();
        let mut config = ImportConfig::default();
        config.max_file_size = 100;
        let report = Importer::new(&mut ws)
            .with_config(config)
            .import_zip_bytes("bomb.zip", bytes)
            .await
            .unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.failures, vec!["bomb.zip:bomb.txt (too large)".to_string()]);
        assert!(!ws.tree().exists("bomb.txt"));
        assert_eq!(ws.tree().content("ok.txt"), Some("fine"));
    }

    #[tokio::test]
    async fn test_binary_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        write(dir.path(), "logo.bin", &[0xff, b'a']);

        let (mut ws, _) = workspace();
        Importer::new(&mut ws)
            .import_files(&[dir.path().join("logo.bin")])
            .await
            .unwrap();

        assert_eq!(ws.tree().content("logo.bin"), Some("\u{FFFD}a"));
    }

    #[tokio::test]
    async fn test_large_files_are_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "big.txt", b"0123456789");
        write(dir.path(), "small.txt", b"ok");

        let (mut ws, _) = workspace();
        let mut config = ImportConfig::default();
        config.max_file_size = 4;
        let report = Importer::new(&mut ws)
            .with_config(config)
            .import_files(&[dir.path().join("big.txt"), dir.path().join("small.txt")])
            .await
            .unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(!ws.tree().exists("big.txt"));
    }

    #[tokio::test]
    async fn test_import_paths_mixed_drop() {
        let dir = tempdir().unwrap();
        write(dir.path(), "lib/util.js", b"export {}");
        write(dir.path(), "readme.md", b"# readme");
        std::fs::write(dir.path().join("assets.zip"), zip_of(&[("img/logo.svg", Some("<svg/>"))])).unwrap();

        let (mut ws, store) = workspace();
        let report = Importer::new(&mut ws)
            .import_paths(&[
                dir.path().join("assets.zip"),
                dir.path().join("readme.md"),
                dir.path().join("lib"),
                dir.path().join("missing.txt"),
            ])
            .await
            .unwrap();

        assert_eq!(report.files, 3);
        assert_eq!(report.failures.len(), 1);
        assert!(report.summary().starts_with("Imported 3 files, 2 folders; failed:"));
        assert!(ws.tree().is_file("lib/util.js"));
        assert!(ws.tree().is_file("img/logo.svg"));
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_is_cancelled() {
        let (mut ws, _) = workspace();
        let result = Importer::new(&mut ws).import_paths(&[]).await;
        assert!(matches!(result, Err(ImportError::Cancelled)));
    }

    #[tokio::test]
    async fn test_open_zip_as_project() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("portfolio.zip");
        std::fs::write(&archive, zip_of(&[("index.html", Some("<p>me</p>"))])).unwrap();

        let (mut ws, _) = workspace();
        ws.set_content("old.txt", "gone").unwrap();
        Importer::new(&mut ws).open_zip_as_project(&archive).await.unwrap();

        assert_eq!(ws.project_name(), "portfolio");
        assert!(!ws.tree().exists("old.txt"));
        assert_eq!(ws.tree().content("index.html"), Some("<p>me</p>"));
    }

    #[tokio::test]
    async fn test_open_malformed_zip_keeps_project() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"not a zip at all").unwrap();

        let (mut ws, store) = workspace();
        ws.set_project_name("site");
        ws.set_content("index.html", "<h1>Hi</h1>").unwrap();
        let saves = store.save_count();

        let result = Importer::new(&mut ws).open_zip_as_project(&archive).await;

        assert!(matches!(result, Err(ImportError::Zip { .. })));
        assert_eq!(ws.project_name(), "site");
        assert_eq!(ws.tree().content("index.html"), Some("<h1>Hi</h1>"));
        assert_eq!(store.save_count(), saves);
        assert_eq!(store.snapshot().unwrap().files.len(), 1);
    }

    #[tokio::test]
    async fn test_open_folder_on_a_file_keeps_project() {
        let dir = tempdir().unwrap();
        write(dir.path(), "notes.txt", b"n");

        let (mut ws, store) = workspace();
        ws.set_content("index.html", "<h1>Hi</h1>").unwrap();
        let saves = store.save_count();

        let result = Importer::new(&mut ws)
            .open_folder_as_project(&dir.path().join("notes.txt"))
            .await;

        assert!(matches!(result, Err(ImportError::Io { .. })));
        assert!(ws.tree().is_file("index.html"));
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn test_open_folder_as_project() {
        let dir = tempdir().unwrap();
        let blog = dir.path().join("blog");
        write(&blog, "posts/first.md", b"# first");

        let (mut ws, _) = workspace();
        Importer::new(&mut ws).open_folder_as_project(&blog).await.unwrap();

        assert_eq!(ws.project_name(), "blog");
        assert_eq!(ws.tree().content("posts/first.md"), Some("# first"));
    }
}
