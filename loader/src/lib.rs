//! Filesystem side of declarative command trees.
//!
//! Turns a project directory into a validated
//! [`CommandNode`](command_tree_core::CommandNode) tree: one command file per
//! command under a commands directory, optional project configuration, and
//! an optional build manifest that caches the resolved tree.
//!
//! # Quick start
//!
//! ```no_run
//! use command_tree_loader::{Project, build_tree};
//!
//! // Walk a commands directory directly
//! let tree = build_tree("commands".as_ref(), "cli").unwrap();
//! println!("{:?}", tree.child_names());
//!
//! // Or open a project: config, manifest, then commands directories
//! let project = Project::open(".").unwrap();
//! let app = project.app().unwrap();
//! let outcome = app.run(&["--help"]);
//! print!("{}", outcome.stdout);
//! ```

mod config;
mod error;
mod loader;
mod manifest;
mod walk;

pub use config::{CONFIG_FILE_NAMES, DEFAULT_COMMAND_DIRS, DEFAULT_MANIFEST_PATH, ProjectConfig};
pub use error::{LoadError, Result};
pub use loader::{LoadedTree, Project, TreeLoader, TreeSource};
pub use manifest::{BuildManifest, MANIFEST_FORMAT_VERSION, fingerprint};
pub use walk::{
    DECLARATION_EXTENSIONS, Entry, INDEX_STEM, build_tree, entries, read_declaration,
};
