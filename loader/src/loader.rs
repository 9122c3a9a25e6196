//! Command tree loading with a builder-style fallback chain.
//!
//! [`TreeLoader`] tries its sources in the order they were added and keeps
//! the first that yields a tree. A build manifest is only trusted while it
//! matches the command files it was built from; a stale or unreadable
//! manifest is skipped with a warning. A commands directory that exists but
//! contains a malformed command is an error, not a reason to fall back.
//!
//! [`Project`] wires the chain up from a project directory and its
//! [`ProjectConfig`]:
//!
//! ```no_run
//! use command_tree_loader::Project;
//!
//! let project = Project::open(".").unwrap();
//! let app = project.app().unwrap();
//! let outcome = app.run(&["with-index", "c"]);
//! print!("{}", outcome.stdout);
//! ```

use std::path::{Path, PathBuf};

use command_tree_core::{App, CommandNode, validate_tree};
use tracing::{debug, info, warn};

use crate::config::ProjectConfig;
use crate::error::{LoadError, Result};
use crate::manifest::BuildManifest;
use crate::walk::build_tree;

/// Where a tree can come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    /// A build manifest; `commands_dir` is the directory its fingerprint is
    /// checked against (skipped when absent or missing on disk).
    Manifest {
        path: PathBuf,
        commands_dir: Option<PathBuf>,
    },
    /// A directory of command files.
    Directory(PathBuf),
}

/// A tree together with the source it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub tree: CommandNode,
    pub source: TreeSource,
    /// Version recorded by the source; only manifests carry one.
    pub version: Option<String>,
}

/// Builder for loading a command tree from a fallback chain.
///
/// # Example
///
/// ```no_run
/// use command_tree_loader::TreeLoader;
///
/// let loaded = TreeLoader::new("cli")
///     .from_manifest("build/cli.json", Some("commands".into()))
///     .from_dir("commands")
///     .from_dir("src/commands")
///     .build()
///     .unwrap();
/// println!("{} commands", loaded.tree.count());
/// ```
#[derive(Debug, Clone)]
pub struct TreeLoader {
    program: String,
    sources: Vec<TreeSource>,
}

impl TreeLoader {
    /// Creates a loader with no sources; `program` names the root node.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            sources: Vec::new(),
        }
    }

    /// Adds a build manifest as a source.
    pub fn from_manifest(
        mut self,
        path: impl Into<PathBuf>,
        commands_dir: Option<PathBuf>,
    ) -> Self {
        self.sources.push(TreeSource::Manifest {
            path: path.into(),
            commands_dir,
        });
        self
    }

    /// Adds a commands directory as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(TreeSource::Directory(path.into()));
        self
    }

    /// The configured sources, in order.
    pub fn sources(&self) -> &[TreeSource] {
        &self.sources
    }

    /// Loads the tree from the first usable source.
    ///
    /// # Errors
    ///
    /// Returns the error of an existing commands directory that fails to
    /// build, or [`LoadError::NoSourcesAvailable`] when no source is usable.
    pub fn build(self) -> Result<LoadedTree> {
        for source in &self.sources {
            let (tree, version) = match source {
                TreeSource::Manifest { path, commands_dir } => {
                    match self.load_manifest(path, commands_dir.as_deref()) {
                        Ok(Some(manifest)) => (manifest.tree, Some(manifest.version)),
                        Ok(None) => continue,
                        Err(err) => {
                            warn!(path = %path.display(), error = %err, "skipping manifest");
                            continue;
                        }
                    }
                }
                TreeSource::Directory(dir) => {
                    if !dir.is_dir() {
                        debug!(dir = %dir.display(), "commands directory not found");
                        continue;
                    }
                    (build_tree(dir, &self.program)?, None)
                }
            };

            info!(source = ?source, commands = tree.count(), "loaded command tree");
            return Ok(LoadedTree {
                tree,
                source: source.clone(),
                version,
            });
        }

        Err(LoadError::NoSourcesAvailable)
    }

    fn load_manifest(
        &self,
        path: &Path,
        commands_dir: Option<&Path>,
    ) -> Result<Option<BuildManifest>> {
        if !path.is_file() {
            debug!(path = %path.display(), "manifest not found");
            return Ok(None);
        }

        let manifest = BuildManifest::load(path)?;
        if manifest.name != self.program {
            return Err(LoadError::InvalidManifest(format!(
                "built for `{}`, expected `{}`",
                manifest.name, self.program
            )));
        }
        if let Some(dir) = commands_dir.filter(|dir| dir.is_dir()) {
            if !manifest.is_fresh(dir)? {
                return Err(LoadError::StaleManifest(path.to_path_buf()));
            }
        }

        validate_tree(&manifest.tree)?;
        Ok(Some(manifest))
    }
}

/// A project directory: its config plus everything derived from it.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    /// `false` when running on defaults because no config file exists.
    configured: bool,
}

impl Project {
    /// Opens `root`, reading its config file if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let configured = ProjectConfig::find(&root).is_some();
        let config = ProjectConfig::discover(&root)?;
        Ok(Self {
            root,
            config,
            configured,
        })
    }

    /// Uses an explicit config instead of discovering one.
    pub fn with_config(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
            configured: true,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The commands directory in use.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingCommandsDir`] naming the first candidate
    /// when none exists.
    pub fn commands_dir(&self) -> Result<PathBuf> {
        self.config.resolve_commands_dir(&self.root).ok_or_else(|| {
            let first = self
                .config
                .command_dirs(&self.root)
                .into_iter()
                .next()
                .unwrap_or_else(|| self.root.clone());
            LoadError::MissingCommandsDir(first)
        })
    }

    /// Default manifest location for this project.
    pub fn manifest_path(&self) -> PathBuf {
        self.config.manifest_path(&self.root)
    }

    /// Builds the tree straight from the commands directory.
    ///
    /// # Errors
    ///
    /// See [`build_tree`].
    pub fn build_tree(&self) -> Result<CommandNode> {
        let tree = build_tree(&self.commands_dir()?, &self.config.name)?;
        Ok(self.decorate(tree))
    }

    /// Builds the tree and captures it in a manifest.
    ///
    /// # Errors
    ///
    /// See [`build_tree`] and [`BuildManifest::new`].
    pub fn build_manifest(&self) -> Result<BuildManifest> {
        let dir = self.commands_dir()?;
        let tree = self.decorate(build_tree(&dir, &self.config.name)?);
        BuildManifest::new(&self.config, &dir, tree)
    }

    /// The fallback chain for this project: manifest, then the commands
    /// directories.
    pub fn loader(&self) -> TreeLoader {
        let dirs = self.config.command_dirs(&self.root);
        let fingerprinted = self.config.resolve_commands_dir(&self.root);
        dirs.into_iter().fold(
            TreeLoader::new(&self.config.name).from_manifest(self.manifest_path(), fingerprinted),
            |loader, dir| loader.from_dir(dir),
        )
    }

    /// Loads the tree through [`loader`](Self::loader).
    ///
    /// # Errors
    ///
    /// See [`TreeLoader::build`].
    pub fn load(&self) -> Result<LoadedTree> {
        let mut loaded = self.loader().build()?;
        loaded.tree = self.decorate(loaded.tree);
        Ok(loaded)
    }

    /// Loads the tree and wraps it in a runnable [`App`].
    ///
    /// The configured version wins; without a config file, the version
    /// recorded in the manifest is used.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn app(&self) -> Result<App> {
        let loaded = self.load()?;
        let version = match loaded.version {
            Some(recorded) if !self.configured => recorded,
            _ => self.config.version.clone(),
        };
        Ok(App::new(loaded.tree, version)?)
    }

    fn decorate(&self, mut tree: CommandNode) -> CommandNode {
        if tree.description.is_none() {
            tree.description = self.config.description.clone();
        }
        tree
    }
}
