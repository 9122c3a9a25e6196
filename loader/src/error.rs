//! Error types for loading command trees.
//!
//! Covers every way turning a project directory into a tree can fail: I/O,
//! config/manifest parsing, malformed command files and schema validation.

use std::path::PathBuf;

use command_tree_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading a command tree.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure (config or manifest).
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure (config).
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A command file that does not parse as a declaration.
    #[error("invalid declaration {}: {message}", path.display())]
    InvalidDeclaration { path: PathBuf, message: String },

    /// A declaration that parses but violates the schema rules.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The commands directory does not exist.
    #[error("commands directory not found: {}", .0.display())]
    MissingCommandsDir(PathBuf),

    /// Build manifest no longer matches the command files.
    #[error("stale manifest: {}", .0.display())]
    StaleManifest(PathBuf),

    /// Build manifest has an unsupported format.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// All configured loader sources failed.
    #[error("no command sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
