//! Command tree construction from a directory of command files.
//!
//! Every `*.yaml`, `*.yml` or `*.json` file is a command named after its
//! stem; every sub-directory is a branch. A file named `index` inside a
//! directory is that directory's own command:
//!
//! ```text
//! commands/
//!   a.yaml                 -> cli a
//!   with-index/
//!     index.yaml           -> cli with-index
//!     c.yaml               -> cli with-index c
//!   without-index/
//!     d.yaml               -> cli without-index d   (`cli without-index` shows help)
//! ```
//!
//! Entries are visited in name order; names starting with `.` or `_` and
//! files with other extensions are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use command_tree_core::{
    CommandDecl, CommandNode, SchemaError, SchemaErrorKind, normalize_command, validate_tree,
};
use tracing::debug;

use crate::error::{LoadError, Result};

/// File stem that marks a directory's own command.
pub const INDEX_STEM: &str = "index";

/// Extensions recognized as command files.
pub const DECLARATION_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// A directory entry relevant to tree building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Sub-directory (branch).
    Dir { name: String, path: PathBuf },
    /// Command declaration file, `name` is the stem.
    File { name: String, path: PathBuf },
}

/// Lists the relevant entries of `dir` in name order.
///
/// # Errors
///
/// Returns [`LoadError::IoError`] if the directory cannot be read.
pub fn entries(dir: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') || file_name.starts_with('_') {
            continue;
        }

        if path.is_dir() {
            entries.push(Entry::Dir {
                name: file_name.to_string(),
                path,
            });
            continue;
        }

        let is_declaration = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| DECLARATION_EXTENSIONS.contains(&ext));
        let stem = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);
        if let (true, Some(name)) = (is_declaration, stem) {
            entries.push(Entry::File { name, path });
        }
    }

    entries.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(entries)
}

impl Entry {
    /// Filesystem path of the entry.
    pub fn path(&self) -> &Path {
        match self {
            Self::Dir { path, .. } | Self::File { path, .. } => path,
        }
    }
}

/// Reads one command file.
///
/// An empty file is a command with no flags, positionals or description.
///
/// # Errors
///
/// Returns [`LoadError::IoError`] if the file cannot be read, or
/// [`LoadError::InvalidDeclaration`] if it does not parse.
pub fn read_declaration(path: &Path) -> Result<CommandDecl> {
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(CommandDecl::default());
    }

    let parsed = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&raw).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_str(&raw).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| LoadError::InvalidDeclaration {
        path: path.to_path_buf(),
        message,
    })
}

/// Builds and validates the command tree rooted at `dir`.
///
/// The root node is named `program`, the name shown in usage lines.
///
/// # Errors
///
/// Returns [`LoadError::MissingCommandsDir`] if `dir` is not a directory,
/// [`LoadError::InvalidDeclaration`] for unparsable files, and
/// [`LoadError::Schema`] for schema violations (including two entries that
/// map to the same command name).
pub fn build_tree(dir: &Path, program: &str) -> Result<CommandNode> {
    if !dir.is_dir() {
        return Err(LoadError::MissingCommandsDir(dir.to_path_buf()));
    }

    let mut path = vec![program.to_string()];
    let mut root = build_dir(dir, program, &mut path)?;
    root.name = program.to_string();

    validate_tree(&root)?;
    debug!(
        dir = %dir.display(),
        commands = root.count(),
        "built command tree"
    );
    Ok(root)
}

fn build_dir(dir: &Path, name: &str, path: &mut Vec<String>) -> Result<CommandNode> {
    let mut index = None;
    let mut children = Vec::new();

    for entry in entries(dir)? {
        match entry {
            Entry::File { name: stem, path: file } if stem == INDEX_STEM => {
                // `index.json` next to `index.yaml` declares the directory twice.
                if index.is_some() {
                    let file_name = file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| INDEX_STEM.to_string());
                    return Err(SchemaError::new(
                        &path.join(" "),
                        SchemaErrorKind::DuplicateCommand(file_name),
                    )
                    .into());
                }
                let decl = read_declaration(&file)?;
                let mut node = normalize_command(&path.join(" "), INDEX_STEM, &decl)?;
                node.is_index = true;
                index = Some(node);
            }
            Entry::File { name: stem, path: file } => {
                let decl = read_declaration(&file)?;
                let display = format!("{} {}", path.join(" "), stem);
                children.push(normalize_command(&display, &stem, &decl)?);
            }
            Entry::Dir { name: stem, path: sub_dir } => {
                path.push(stem.clone());
                let child = build_dir(&sub_dir, &stem, path);
                path.pop();
                children.push(child?);
            }
        }
    }

    let named = CommandNode::group(name);
    let mut node = index.unwrap_or_else(|| named.clone());
    node.name = named.name;
    node.key = named.key;
    node.children = children;
    Ok(node)
}
