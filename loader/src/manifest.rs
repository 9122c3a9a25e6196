//! Build manifest: a resolved command tree frozen to JSON.
//!
//! `cmdtree build` writes one next to the project so `cmdtree-run` can skip
//! walking and normalizing the commands directory. The manifest records a
//! SHA-256 fingerprint of every command file (relative path and bytes); a
//! manifest whose fingerprint no longer matches the files on disk is stale.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use command_tree_loader::{BuildManifest, ProjectConfig, build_tree};
//!
//! let config = ProjectConfig::default();
//! let dir = Path::new("commands");
//! let tree = build_tree(dir, &config.name).unwrap();
//!
//! let manifest = BuildManifest::new(&config, dir, tree).unwrap();
//! manifest.save("build/cli.json").unwrap();
//!
//! let loaded = BuildManifest::load("build/cli.json").unwrap();
//! assert!(loaded.is_fresh(dir).unwrap());
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use command_tree_core::CommandNode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ProjectConfig;
use crate::error::{LoadError, Result};
use crate::walk::{Entry, entries};

/// Manifest layout version written by this crate.
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// A serialized command tree plus the metadata needed to trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub format_version: u32,
    /// Program name the tree was built for.
    pub name: String,
    /// Printed by `--version`.
    pub version: String,
    /// RFC 3339 timestamp of the build.
    pub generated_at: String,
    /// SHA-256 over the command files, see [`fingerprint`].
    pub fingerprint: String,
    pub tree: CommandNode,
}

impl BuildManifest {
    /// Captures `tree`, built from `commands_dir`, for the given project.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::IoError`] if the command files cannot be read
    /// for fingerprinting.
    pub fn new(config: &ProjectConfig, commands_dir: &Path, tree: CommandNode) -> Result<Self> {
        Ok(Self {
            format_version: MANIFEST_FORMAT_VERSION,
            name: config.name.clone(),
            version: config.version.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            fingerprint: fingerprint(commands_dir)?,
            tree,
        })
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](LoadError::IoError) if the file cannot be read,
    /// [`JsonError`](LoadError::JsonError) if it is not manifest JSON, or
    /// [`InvalidManifest`](LoadError::InvalidManifest) for an unsupported
    /// format version.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest: Self = serde_json::from_reader(reader)?;
        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(LoadError::InvalidManifest(format!(
                "unsupported format version {} (expected {MANIFEST_FORMAT_VERSION})",
                manifest.format_version
            )));
        }
        Ok(manifest)
    }

    /// Saves the manifest as pretty-printed JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](LoadError::IoError) if the file cannot be
    /// written, or [`JsonError`](LoadError::JsonError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Returns `true` if the command files under `commands_dir` still hash
    /// to the recorded fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::IoError`] if the files cannot be read.
    pub fn is_fresh(&self, commands_dir: &Path) -> Result<bool> {
        Ok(fingerprint(commands_dir)? == self.fingerprint)
    }
}

/// Computes the SHA-256 hex digest of every command file under `dir`.
///
/// Files are visited in the same order the tree builder uses; each
/// contributes its `/`-separated relative path and its bytes, so renames
/// change the fingerprint as well as edits.
///
/// # Errors
///
/// Returns [`LoadError::IoError`] if a directory or file cannot be read.
pub fn fingerprint(dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    hash_dir(dir, "", &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn hash_dir(dir: &Path, prefix: &str, hasher: &mut Sha256) -> Result<()> {
    for entry in entries(dir)? {
        match entry {
            Entry::Dir { name, path } => {
                hash_dir(&path, &format!("{prefix}{name}/"), hasher)?;
            }
            Entry::File { path, .. } => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let bytes = std::fs::read(&path)?;
                hasher.update(format!("{prefix}{file_name}").as_bytes());
                hasher.update([0u8]);
                hasher.update((bytes.len() as u64).to_le_bytes());
                hasher.update(&bytes);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::build_tree;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let commands = dir.path().join("commands");
        std::fs::create_dir_all(commands.join("group")).unwrap();
        std::fs::write(commands.join("a.yaml"), "action:\n  print: Command A\n").unwrap();
        std::fs::write(commands.join("group/b.yaml"), "").unwrap();
        dir
    }

    fn manifest_for(dir: &Path) -> BuildManifest {
        let commands = dir.join("commands");
        let config = ProjectConfig::default();
        let tree = build_tree(&commands, &config.name).unwrap();
        BuildManifest::new(&config, &commands, tree).unwrap()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = project();
        let manifest = manifest_for(dir.path());
        let path = dir.path().join("build/cli.json");

        manifest.save(&path).unwrap();
        let loaded = BuildManifest::load(&path).unwrap();

        assert_eq!(loaded, manifest);
        assert_eq!(loaded.tree.child_names(), vec!["a", "group"]);
        assert!(chrono::DateTime::parse_from_rfc3339(&loaded.generated_at).is_ok());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let dir = project();
        let commands = dir.path().join("commands");
        assert_eq!(fingerprint(&commands).unwrap(), fingerprint(&commands).unwrap());
        assert_eq!(fingerprint(&commands).unwrap().len(), 64);
    }

    #[test]
    fn test_edit_makes_manifest_stale() {
        let dir = project();
        let commands = dir.path().join("commands");
        let manifest = manifest_for(dir.path());
        assert!(manifest.is_fresh(&commands).unwrap());

        std::fs::write(commands.join("a.yaml"), "action:\n  print: Changed\n").unwrap();
        assert!(!manifest.is_fresh(&commands).unwrap());
    }

    #[test]
    fn test_rename_makes_manifest_stale() {
        let dir = project();
        let commands = dir.path().join("commands");
        let manifest = manifest_for(dir.path());

        std::fs::rename(commands.join("group"), commands.join("other")).unwrap();
        assert!(!manifest.is_fresh(&commands).unwrap());
    }

    #[test]
    fn test_ignored_files_do_not_affect_fingerprint() {
        let dir = project();
        let commands = dir.path().join("commands");
        let before = fingerprint(&commands).unwrap();

        std::fs::write(commands.join("notes.txt"), "scratch").unwrap();
        std::fs::write(commands.join("_draft.yaml"), "").unwrap();
        assert_eq!(fingerprint(&commands).unwrap(), before);
    }

    #[test]
    fn test_rejects_unknown_format_version() {
        let dir = project();
        let mut manifest = manifest_for(dir.path());
        manifest.format_version = 99;
        let path = dir.path().join("cli.json");
        manifest.save(&path).unwrap();

        let err = BuildManifest::load(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidManifest(_)));
    }
}
