//! Codepad configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! Serde is Rust's standard for serialization/deserialization.
//! The `#[derive(Serialize, Deserialize)]` macro generates
//! code to convert structs to/from JSON, TOML, etc.
//!
//! `#[serde(default)]` uses Default::default() for missing fields,
//! making configs backward-compatible.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::project::DEFAULT_PROJECT_NAME;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project defaults and storage location
    pub project: ProjectConfig,

    /// Import behavior
    pub import: ImportConfig,

    /// Export behavior
    pub export: ExportConfig,
}

impl Config {
    /// Loads config from the default location.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {}", e);
            Self::default()
        })
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("codepad").join("config.toml"))
    }

    /// Saves the config to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Project defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Name given to new projects
    pub default_name: String,

    /// Snapshot file (defaults to the platform data directory)
    pub store_path: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_PROJECT_NAME.to_string(),
            store_path: None,
        }
    }
}

/// What to do when an imported path is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Replace the existing file's content
    #[default]
    Overwrite,
    /// Store the import under a ` (n)` suffixed name
    KeepBoth,
}

/// Import configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Entry names skipped while walking directories
    pub ignore_names: Vec<String>,

    /// Skip dot-files and dot-folders while walking directories
    pub skip_hidden: bool,

    /// Collision handling for imported files
    pub on_conflict: ConflictPolicy,

    /// Files larger than this many bytes are skipped
    pub max_file_size: u64,
}

impl ImportConfig {
    /// Returns true if a directory entry with this name should be skipped.
    pub fn skips(&self, name: &str) -> bool {
        (self.skip_hidden && name.starts_with('.')) || self.ignore_names.iter().any(|n| n == name)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            ignore_names: Vec::new(),
            skip_hidden: false,
            on_conflict: ConflictPolicy::Overwrite,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

/// Archive compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Suggested archive file name
    pub file_name: String,

    /// Entry compression
    pub compression: Compression,

    /// Write directory entries for folders with no files
    pub include_empty_folders: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "project.zip".to_string(),
            compression: Compression::Deflated,
            include_empty_folders: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
