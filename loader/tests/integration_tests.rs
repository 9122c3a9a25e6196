use std::path::Path;

use command_tree_core::{App, BindingError};
use command_tree_loader::{
    BuildManifest, LoadError, Project, ProjectConfig, TreeLoader, TreeSource, build_tree,
    fingerprint,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn multi_command(dir: &Path) {
    write(dir, "commands/a.yaml", "action:\n  print: Command A\n");
    write(dir, "commands/b.yaml", "action:\n  print: Command B\n");
    write(
        dir,
        "commands/with-index/index.yaml",
        "action:\n  print: Command With Index\n",
    );
    write(dir, "commands/with-index/c.yaml", "action:\n  print: Command C\n");
    write(dir, "commands/without-index/d.yaml", "action:\n  print: Command D\n");
}

// ---------------------------------------------------------------------------
// Tree building and dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_multi_command_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    multi_command(dir.path());

    let tree = build_tree(&dir.path().join("commands"), "cli").unwrap();
    let app = App::new(tree, "1.0.0").unwrap();

    assert_eq!(app.run(&["a"]).stdout, "Command A");
    assert_eq!(app.run(&["with-index"]).stdout, "Command With Index");
    assert_eq!(app.run(&["with-index", "c"]).stdout, "Command C");
    assert_eq!(app.run(&["without-index", "d"]).stdout, "Command D");

    let group = app.run(&["without-index"]);
    assert_eq!(group.exit_code, 1);
    assert_eq!(group.error, Some(BindingError::MissingCommand));
    assert!(group.stderr.starts_with("cli without-index\n\nCommands:\n"));

    let unknown = app.run(&["with-index", "z"]);
    assert_eq!(unknown.error, Some(BindingError::CommandNotFound("z".into())));
}

#[test]
fn test_help_before_sub_command() {
    let dir = tempfile::tempdir().unwrap();
    multi_command(dir.path());

    let tree = build_tree(&dir.path().join("commands"), "cli").unwrap();
    let app = App::new(tree, "1.0.0").unwrap();

    let outcome = app.run(&["--help", "without-index"]);
    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.stdout.starts_with("cli without-index\n"));
}

#[test]
fn test_rust_handler_overrides_declared_action() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "commands/deploy-app.yaml",
        "positionals:\n  - name: target\n    required: true\nflags:\n  - name: dry-run\n    default: false\n",
    );

    let tree = build_tree(&dir.path().join("commands"), "cli").unwrap();
    let app = App::new(tree, "1.0.0")
        .unwrap()
        .with_handler("deploy-app", |opts| {
            let target = opts.get("target").and_then(|v| v.as_str()).unwrap_or("?");
            if opts.get("dryRun") == Some(&serde_json::json!(true)) {
                Ok(format!("would deploy {target}"))
            } else {
                Err(format!("refusing to deploy {target}"))
            }
        });

    assert_eq!(
        app.run(&["deploy-app", "prod", "--dry-run"]).stdout,
        "would deploy prod"
    );

    let failed = app.run(&["deployApp", "prod"]);
    assert_eq!(failed.exit_code, 1);
    assert_eq!(failed.stderr, "refusing to deploy prod");
}

// ---------------------------------------------------------------------------
// Manifest and fallback chain
// ---------------------------------------------------------------------------

#[test]
fn test_manifest_roundtrip_through_loader() {
    let dir = tempfile::tempdir().unwrap();
    multi_command(dir.path());
    let commands = dir.path().join("commands");
    let manifest_path = dir.path().join("build/cli.json");

    let tree = build_tree(&commands, "cli").unwrap();
    BuildManifest::new(&ProjectConfig::default(), &commands, tree.clone())
        .unwrap()
        .save(&manifest_path)
        .unwrap();

    let loaded = TreeLoader::new("cli")
        .from_manifest(&manifest_path, Some(commands.clone()))
        .from_dir(&commands)
        .build()
        .unwrap();

    assert_eq!(loaded.tree, tree);
    assert_eq!(
        loaded.source,
        TreeSource::Manifest {
            path: manifest_path,
            commands_dir: Some(commands),
        }
    );
}

#[test]
fn test_corrupt_manifest_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    multi_command(dir.path());
    write(dir.path(), "build/cli.json", "{ not json");

    let project = Project::open(dir.path()).unwrap();
    let loaded = project.load().unwrap();
    assert_eq!(
        loaded.source,
        TreeSource::Directory(dir.path().join("commands"))
    );
}

#[test]
fn test_fingerprint_ignores_manifest_location() {
    let dir = tempfile::tempdir().unwrap();
    multi_command(dir.path());
    let commands = dir.path().join("commands");

    let before = fingerprint(&commands).unwrap();
    write(dir.path(), "build/cli.json", "{}");
    assert_eq!(fingerprint(&commands).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_configured_commands_dir() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "cmdtree.yml", "name: tool\ncommands_dir: cli/cmds\n");
    write(dir.path(), "cli/cmds/hello.yaml", "action:\n  print: hi\n");

    let project = Project::open(dir.path()).unwrap();
    assert_eq!(project.commands_dir().unwrap(), dir.path().join("cli/cmds"));

    let app = project.app().unwrap();
    assert_eq!(app.run(&["hello"]).stdout, "hi");
    assert!(app.run(&["--help"]).stdout.starts_with("tool\n"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "cmdtree.yaml", "name: [unterminated\n");

    let err = Project::open(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::YamlError(_)));
}
