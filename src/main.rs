//! # Codepad - A Virtual Project Tree
//!
//! Drives a codepad project from the terminal. The project lives in a single
//! JSON snapshot, the same one the editor shell loads at startup.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start a project from a folder on disk
//! cargo run -- open-folder ./my-site
//!
//! # Look around
//! cargo run -- tree
//! cargo run -- cd css && cargo run -- ls
//!
//! # Ship it
//! cargo run -- export -o site.zip
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codepad_archive::{ImportError, Importer, write_zip};
use codepad_core::{Config, JsonFileStore, NodeKind, Workspace, path};
use codepad_tree::{ClipboardError, PathClipboard, TreeMessage, TreeNode, TreeView, build_nodes};

/// Codepad - manage a virtual project tree
#[derive(Parser, Debug)]
#[command(name = "codepad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project snapshot file
    #[arg(long, value_name = "FILE", global = true)]
    store: Option<PathBuf>,

    /// Config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List a folder (the current one by default)
    Ls {
        path: Option<String>,
        /// Print JSON instead of names
        #[arg(long)]
        json: bool,
    },
    /// Print the whole project tree
    Tree,
    /// Print the current folder
    Pwd,
    /// Change the current folder
    Cd { path: String },
    /// Create an empty file
    Touch { path: String },
    /// Create a folder and any missing parents
    Mkdir { path: String },
    /// Write a file, reading stdin unless --content is given
    Write {
        path: String,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Print a file
    Cat { path: String },
    /// Delete a file or folder
    Rm {
        path: String,
        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
    /// Move into a folder, or rename when the destination does not exist
    Mv { source: String, dest: String },
    /// Copy into a folder
    Cp { source: String, dest: String },
    /// Give an entry a new base name
    Rename { path: String, new_name: String },
    /// Import files, folders and ZIP archives
    Import {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Project folder to import into
        #[arg(long, default_value = "")]
        into: String,
    },
    /// Replace the project with a folder on disk
    OpenFolder { dir: PathBuf },
    /// Replace the project with a ZIP archive
    OpenZip { archive: PathBuf },
    /// Export the project as a ZIP archive
    Export {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Start a new empty project
    New { name: Option<String> },
    /// Copy a project path to the system clipboard
    CopyPath { path: String },
}

/// `ls --json` row.
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    name: &'a str,
    path: &'a str,
    kind: &'static str,
}

/// System clipboard through arboard.
struct SystemClipboard;

impl PathClipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    tracing::debug!("Starting codepad v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load(),
    };
    let store_path = match args.store.clone().or_else(|| config.project.store_path.clone()) {
        Some(path) => path,
        None => JsonFileStore::default_path()?,
    };
    tracing::info!("Using project store {}", store_path.display());

    let mut ws = Workspace::open(Box::new(JsonFileStore::new(store_path)), config);
    let stdout = std::io::stdout();
    execute(&mut ws, args.command, &mut stdout.lock()).await
}

/// Runs one command against the workspace.
async fn execute(ws: &mut Workspace, command: Command, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Command::Ls { path, json } => {
            let folder = resolve(ws, path.as_deref().unwrap_or("."));
            if !ws.tree().is_folder(&folder) {
                bail!("Not a folder: {}", display(&folder));
            }
            let nodes = build_nodes(ws.tree());
            let children = children_of(&nodes, &folder);
            if json {
                let entries: Vec<ListEntry> = children
                    .iter()
                    .map(|node| ListEntry {
                        name: &node.name,
                        path: &node.path,
                        kind: if node.is_folder() { "folder" } else { "file" },
                    })
                    .collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
            } else {
                for node in children {
                    let suffix = if node.is_folder() { "/" } else { "" };
                    writeln!(out, "{}{}", node.name, suffix)?;
                }
            }
        }

        Command::Tree => {
            let mut view = TreeView::new();
            view.refresh(ws);
            view.expand_all();
            writeln!(out, "{}/", ws.project_name())?;
            write!(out, "{}", view.render_ascii())?;
        }

        Command::Pwd => {
            writeln!(out, "{}", display(ws.current_path()))?;
        }

        Command::Cd { path } => {
            let folder = resolve(ws, &path);
            ws.set_current_path(&folder)?;
            ws.flush()?;
        }

        Command::Touch { path } => {
            let file = resolve(ws, &path);
            if !ws.tree().is_file(&file) {
                ws.create_file(&file)?;
            }
        }

        Command::Mkdir { path } => {
            let folder = resolve(ws, &path);
            if ws.tree().is_folder(&folder) {
                bail!("Already exists: {}", display(&folder));
            }
            ws.ensure_folder(&folder)?;
        }

        Command::Write { path, content } => {
            let file = resolve(ws, &path);
            let content = match content {
                Some(content) => content,
                None => std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?,
            };
            ws.set_content(&file, content)?;
        }

        Command::Cat { path } => {
            let file = resolve(ws, &path);
            let content = ws
                .tree()
                .content(&file)
                .with_context(|| format!("No such file: {}", display(&file)))?;
            write!(out, "{}", content)?;
        }

        Command::Rm { path, yes } => {
            let target = resolve(ws, &path);
            if !ws.tree().exists(&target) || target.is_empty() {
                bail!("No such file or folder: {}", display(&target));
            }

            let mut view = TreeView::new();
            view.refresh(ws);
            view.update(ws, TreeMessage::ShowContextMenu(Some(target.clone())));
            view.update(ws, TreeMessage::ContextDelete);
            if !yes {
                view.update(ws, TreeMessage::ConfirmDeleteCancel);
                bail!("Refusing to delete {} without --yes", display(&target));
            }
            view.update(ws, TreeMessage::ConfirmDeleteYes);
            report_notices(&mut view, out)?;
        }

        Command::Mv { source, dest } => {
            let source = resolve(ws, &source);
            let dest = resolve(ws, &dest);
            let placed = if ws.tree().is_folder(&dest) {
                ws.move_entry(&source, &dest)?
            } else {
                ws.rename(&source, &dest)?;
                dest
            };
            writeln!(out, "{}", display(&placed))?;
        }

        Command::Cp { source, dest } => {
            let source = resolve(ws, &source);
            let dest = resolve(ws, &dest);
            if !ws.tree().is_folder(&dest) {
                bail!("Not a folder: {}", display(&dest));
            }
            let placed = ws.copy_entry(&source, &dest)?;
            writeln!(out, "{}", display(&placed))?;
        }

        Command::Rename { path, new_name } => {
            let source = resolve(ws, &path);
            if new_name.contains(['/', '\\']) {
                bail!("A name cannot contain a path separator: {}", new_name);
            }
            let target = path::join(path::parent(&source), &new_name);
            ws.rename(&source, &target)?;
            writeln!(out, "{}", display(&target))?;
        }

        Command::Import { paths, into } => {
            let folder = resolve(ws, &into);
            let result = Importer::new(ws).into_folder(&folder).import_paths(&paths).await;
            match result {
                Ok(report) => writeln!(out, "{}", report.summary())?,
                Err(ImportError::Cancelled) => writeln!(out, "Nothing to import")?,
                Err(e) => return Err(e.into()),
            }
        }

        Command::OpenFolder { dir } => {
            let report = Importer::new(ws).open_folder_as_project(&dir).await?;
            writeln!(out, "{}: {}", ws.project_name(), report.summary())?;
        }

        Command::OpenZip { archive } => {
            let report = Importer::new(ws).open_zip_as_project(&archive).await?;
            writeln!(out, "{}: {}", ws.project_name(), report.summary())?;
        }

        Command::Export { output } => {
            let config = ws.config().export.clone();
            let dest = output.unwrap_or_else(|| PathBuf::from(&config.file_name));
            let size = write_zip(ws.tree(), &config, &dest)
                .with_context(|| format!("Export to {} failed", dest.display()))?;
            writeln!(out, "Exported {} files to {} ({} bytes)", ws.tree().len(), dest.display(), size)?;
        }

        Command::New { name } => {
            ws.new_project(name.as_deref().unwrap_or_default());
            writeln!(out, "Started {}", ws.project_name())?;
        }

        Command::CopyPath { path } => {
            let target = resolve(ws, &path);
            if !ws.tree().exists(&target) {
                bail!("No such file or folder: {}", display(&target));
            }
            let mut view = TreeView::new().with_clipboard(Box::new(SystemClipboard));
            view.update(ws, TreeMessage::ShowContextMenu(Some(target)));
            view.update(ws, TreeMessage::ContextCopyPath);
            report_notices(&mut view, out)?;
        }
    }

    Ok(())
}

/// Resolves a terminal-style path against the current folder.
///
/// A leading `/` starts from the root; `..` climbs, never past the root.
fn resolve(ws: &Workspace, raw: &str) -> String {
    let raw = raw.replace('\\', "/");
    let mut segments: Vec<&str> = if raw.starts_with('/') {
        Vec::new()
    } else {
        ws.current_path().split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    segments.join("/")
}

fn children_of<'a>(nodes: &'a [TreeNode], folder: &str) -> &'a [TreeNode] {
    if folder.is_empty() {
        return nodes;
    }
    let mut level = nodes;
    for segment in folder.split('/') {
        match level.iter().find(|n| n.name == segment && n.kind == NodeKind::Folder) {
            Some(node) => level = &node.children,
            None => return &[],
        }
    }
    level
}

fn display(path: &str) -> String {
    format!("/{}", path)
}

fn report_notices(view: &mut TreeView, out: &mut dyn Write) -> anyhow::Result<()> {
    for notice in view.take_notices() {
        if notice.is_error() {
            bail!("{}", notice.message);
        }
        writeln!(out, "{}", notice)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::MemoryStore;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn workspace() -> Workspace {
        Workspace::open(Box::new(MemoryStore::new()), Config::default())
    }

    async fn run(ws: &mut Workspace, argv: &[&str]) -> anyhow::Result<String> {
        let args = Args::try_parse_from(std::iter::once("codepad").chain(argv.iter().copied()))?;
        let mut out = Vec::new();
        execute(ws, args.command, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["codepad", "-vv", "ls"]);
        assert_eq!(args.verbose, 2);
        assert!(args.store.is_none());
        assert_eq!(args.command, Command::Ls { path: None, json: false });
    }

    #[test]
    fn test_args_global_store() {
        let args = Args::parse_from(["codepad", "rm", "css", "--store", "p.json", "--yes"]);
        assert_eq!(args.store, Some(PathBuf::from("p.json")));
        assert_eq!(args.command, Command::Rm { path: "css".into(), yes: true });
    }

    #[test]
    fn test_import_requires_paths() {
        assert!(Args::try_parse_from(["codepad", "import"]).is_err());
    }

    #[test]
    fn test_resolve() {
        let mut ws = workspace();
        ws.ensure_folder("css/base").unwrap();
        ws.set_current_path("css/base").unwrap();

        assert_eq!(resolve(&ws, "reset.css"), "css/base/reset.css");
        assert_eq!(resolve(&ws, "../site.css"), "css/site.css");
        assert_eq!(resolve(&ws, "/index.html"), "index.html");
        assert_eq!(resolve(&ws, "../../../.."), "");
        assert_eq!(resolve(&ws, "."), "css/base");
    }

    proptest! {
        #[test]
        fn prop_resolve_never_climbs_out(raw in "[a-z./\\\\]{0,24}") {
            let ws = workspace();
            let resolved = resolve(&ws, &raw);
            prop_assert!(resolved.split('/').all(|s| s != ".." && s != "."));
            prop_assert_eq!(path::normalize(&resolved), resolved);
        }
    }

    #[tokio::test]
    async fn test_scenario() {
        let mut ws = workspace();
        run(&mut ws, &["write", "index.html", "-c", "<h1>Hi</h1>"]).await.unwrap();
        run(&mut ws, &["mkdir", "css"]).await.unwrap();
        run(&mut ws, &["touch", "css/style.css"]).await.unwrap();
        run(&mut ws, &["rename", "css", "styles"]).await.unwrap();

        assert_eq!(run(&mut ws, &["ls"]).await.unwrap(), "styles/\nindex.html\n");
        assert!(run(&mut ws, &["rm", "styles"]).await.is_err());

        run(&mut ws, &["rm", "styles", "--yes"]).await.unwrap();
        let files: Vec<_> = ws.tree().file_paths().collect();
        assert_eq!(files, ["index.html"]);
    }

    #[tokio::test]
    async fn test_cd_and_relative_paths() {
        let mut ws = workspace();
        run(&mut ws, &["mkdir", "js/lib"]).await.unwrap();
        run(&mut ws, &["cd", "js"]).await.unwrap();
        run(&mut ws, &["write", "lib/util.js", "-c", "export {}"]).await.unwrap();

        assert_eq!(run(&mut ws, &["pwd"]).await.unwrap(), "/js\n");
        assert_eq!(run(&mut ws, &["cat", "/js/lib/util.js"]).await.unwrap(), "export {}");
        assert!(run(&mut ws, &["cd", "nowhere"]).await.is_err());
    }

    #[tokio::test]
    async fn test_mv_and_cp() {
        let mut ws = workspace();
        run(&mut ws, &["write", "notes.txt", "-c", "n"]).await.unwrap();
        run(&mut ws, &["mkdir", "docs"]).await.unwrap();

        assert_eq!(run(&mut ws, &["cp", "notes.txt", "/"]).await.unwrap(), "/notes_1.txt\n");
        assert_eq!(run(&mut ws, &["mv", "notes.txt", "docs"]).await.unwrap(), "/docs/notes.txt\n");
        assert_eq!(run(&mut ws, &["mv", "notes_1.txt", "todo.txt"]).await.unwrap(), "/todo.txt\n");
    }

    #[tokio::test]
    async fn test_ls_json() {
        let mut ws = workspace();
        run(&mut ws, &["write", "a/b.txt", "-c", ""]).await.unwrap();

        let json = run(&mut ws, &["ls", "a", "--json"]).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["path"], "a/b.txt");
        assert_eq!(parsed[0]["kind"], "file");
    }

    #[tokio::test]
    async fn test_tree_output() {
        let mut ws = workspace();
        run(&mut ws, &["write", "css/site.css", "-c", ""]).await.unwrap();
        run(&mut ws, &["write", "index.html", "-c", ""]).await.unwrap();

        let tree = run(&mut ws, &["tree"]).await.unwrap();
        assert_eq!(tree, "Untitled Project/\n▾ css/\n      site.css\n  index.html\n");
    }

    #[tokio::test]
    async fn test_export_and_open_zip() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("site.zip");
        let archive_arg = archive.to_string_lossy().into_owned();

        let mut ws = workspace();
        run(&mut ws, &["write", "index.html", "-c", "<p>x</p>"]).await.unwrap();
        run(&mut ws, &["export", "-o", &archive_arg]).await.unwrap();

        let mut fresh = workspace();
        let summary = run(&mut fresh, &["open-zip", &archive_arg]).await.unwrap();
        assert_eq!(summary, "site: Imported 1 file, 0 folders\n");
        assert_eq!(fresh.tree().content("index.html"), Some("<p>x</p>"));
    }
}
