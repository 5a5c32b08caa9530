//! ZIP export.

use std::io::{Cursor, Write};
use std::path::Path;

use codepad_core::{Compression, ExportConfig, FileTree};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Export errors.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes every file into a ZIP archive, one entry per path.
///
/// Leaf folders without files get directory entries when
/// `include_empty_folders` is set, so they survive a round trip.
pub fn export_zip(tree: &FileTree, config: &ExportConfig) -> Result<Vec<u8>, ExportError> {
    let method = match config.compression {
        Compression::Stored => CompressionMethod::Stored,
        Compression::Deflated => CompressionMethod::Deflated,
    };
    let options = SimpleFileOptions::default()
        .compression_method(method)
        .unix_permissions(0o644);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    if config.include_empty_folders {
        for folder in tree.empty_folders() {
            writer.add_directory(format!("{folder}/"), options)?;
        }
    }
    for (path, content) in tree.files() {
        writer.start_file(path, options)?;
        writer.write_all(content.as_bytes())?;
    }

    let bytes = writer.finish()?.into_inner();
    tracing::info!("Exported {} files ({} bytes)", tree.len(), bytes.len());
    Ok(bytes)
}

/// Exports to `dest`.
///
/// The archive is written next to `dest` first and renamed into place, so a
/// failure never leaves a partial file behind. Returns the archive size.
pub fn write_zip(tree: &FileTree, config: &ExportConfig, dest: &Path) -> Result<usize, ExportError> {
    let bytes = export_zip(tree, config)?;

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.file_name.clone());
    let temp_path = dest.with_file_name(format!(".{file_name}.tmp"));

    let written = std::fs::write(&temp_path, &bytes).and_then(|()| std::fs::rename(&temp_path, dest));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(bytes.len())
}
