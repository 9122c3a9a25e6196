//! Project configuration.
//!
//! A project may carry a `cmdtree.yaml` (or `.yml` / `.json`) at its root.
//! Every field is optional; a project without the file runs on defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! name: cli
//! version: 1.0.0
//! description: My tool
//! commands_dir: commands
//! manifest: build/cli.json
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Config file names tried in order by [`ProjectConfig::discover`].
pub const CONFIG_FILE_NAMES: &[&str] = &["cmdtree.yaml", "cmdtree.yml", "cmdtree.json"];

/// Commands directories tried in order when none is configured.
pub const DEFAULT_COMMAND_DIRS: &[&str] = &["commands", "src/commands"];

/// Default location of the build manifest, relative to the project root.
pub const DEFAULT_MANIFEST_PATH: &str = "build/cli.json";

/// Per-project settings.
///
/// # Examples
///
/// ```
/// use command_tree_loader::ProjectConfig;
///
/// let config = ProjectConfig::default();
/// assert_eq!(config.name, "cli");
/// assert_eq!(config.version, "0.0.0");
/// assert!(config.commands_dir.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Program name shown in usage lines.
    pub name: String,
    /// Printed by `--version`.
    pub version: String,
    /// Root description when the root command declares none.
    pub description: Option<String>,
    /// Commands directory relative to the project root.
    pub commands_dir: Option<PathBuf>,
    /// Build manifest path relative to the project root.
    pub manifest: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "cli".to_string(),
            version: "0.0.0".to_string(),
            description: None,
            commands_dir: None,
            manifest: PathBuf::from(DEFAULT_MANIFEST_PATH),
        }
    }
}

impl ProjectConfig {
    /// Loads configuration from a YAML or JSON file (by extension).
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoadError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::LoadError::YamlError) /
    /// [`JsonError`](crate::LoadError::JsonError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(config)
    }

    /// Loads the first config file found in `project_dir`, or defaults.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) for a config file that exists.
    pub fn discover(project_dir: impl AsRef<Path>) -> Result<Self> {
        match Self::find(project_dir) {
            Some(path) => {
                debug!(path = %path.display(), "loading project config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Path of the first config file present in `project_dir`.
    pub fn find(project_dir: impl AsRef<Path>) -> Option<PathBuf> {
        let project_dir = project_dir.as_ref();
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Commands directories to try, in order.
    pub fn command_dirs(&self, project_dir: &Path) -> Vec<PathBuf> {
        match &self.commands_dir {
            Some(dir) => vec![project_dir.join(dir)],
            None => DEFAULT_COMMAND_DIRS
                .iter()
                .map(|dir| project_dir.join(dir))
                .collect(),
        }
    }

    /// The commands directory currently in use: the configured one, else the
    /// first default that exists.
    pub fn resolve_commands_dir(&self, project_dir: &Path) -> Option<PathBuf> {
        self.command_dirs(project_dir)
            .into_iter()
            .find(|dir| dir.is_dir())
    }

    /// Absolute manifest path for `project_dir`.
    pub fn manifest_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::discover(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_load_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cmdtree.yaml"),
            "name: tool\nversion: 2.1.0\ncommands_dir: cmds\n",
        )
        .unwrap();

        let config = ProjectConfig::discover(dir.path()).unwrap();
        assert_eq!(config.name, "tool");
        assert_eq!(config.version, "2.1.0");
        assert_eq!(config.manifest, PathBuf::from(DEFAULT_MANIFEST_PATH));
        assert_eq!(
            config.command_dirs(dir.path()),
            vec![dir.path().join("cmds")]
        );
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdtree.json");
        std::fs::write(&path, r#"{"name": "tool", "description": "Tool"}"#).unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.description.as_deref(), Some("Tool"));
        assert_eq!(config.version, "0.0.0");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cmdtree.yaml"), "nmae: typo\n").unwrap();
        assert!(ProjectConfig::discover(dir.path()).is_err());
    }

    #[test]
    fn test_resolve_commands_dir_falls_back_to_src() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/commands")).unwrap();

        let config = ProjectConfig::default();
        assert_eq!(
            config.resolve_commands_dir(dir.path()),
            Some(dir.path().join("src/commands"))
        );
    }
}
