use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_tree_cli::output::{OutputFormat, format_tree};
use command_tree_cli::telemetry::init_tracing;
use command_tree_loader::Project;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "cmdtree")]
#[command(version)]
#[command(about = "Build and inspect declarative command trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the command tree and write the build manifest.
    Build(BuildArgs),
    /// Validate the command tree without writing anything.
    Validate(ProjectArgs),
    /// Print the resolved command tree.
    Tree(TreeArgs),
}

#[derive(Debug, Args)]
struct ProjectArgs {
    /// Project root containing the commands directory.
    #[arg(long, default_value = ".")]
    project: PathBuf,
}

#[derive(Debug, Args)]
struct BuildArgs {
    #[command(flatten)]
    project: ProjectArgs,
    /// Manifest output path (default: the configured manifest path).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TreeArgs {
    #[command(flatten)]
    project: ProjectArgs,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Build(args) => run_build(args),
        Command::Validate(args) => run_validate(args),
        Command::Tree(args) => run_tree(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn open_project(args: &ProjectArgs) -> Result<Project, String> {
    Project::open(&args.project).map_err(|err| {
        format!(
            "Failed to open project '{}': {err}",
            args.project.display()
        )
    })
}

fn run_build(args: BuildArgs) -> Result<(), String> {
    let project = open_project(&args.project)?;
    let manifest = project.build_manifest().map_err(|e| e.to_string())?;
    let out = args.out.unwrap_or_else(|| project.manifest_path());

    manifest
        .save(&out)
        .map_err(|err| format!("Failed to write '{}': {err}", out.display()))?;
    info!(path = %out.display(), fingerprint = %manifest.fingerprint, "wrote manifest");

    println!(
        "Built {} command(s) into '{}'.",
        manifest.tree.count(),
        out.display()
    );
    Ok(())
}

fn run_validate(args: ProjectArgs) -> Result<(), String> {
    let project = open_project(&args)?;
    let dir = project.commands_dir().map_err(|e| e.to_string())?;
    let tree = project.build_tree().map_err(|e| e.to_string())?;
    println!(
        "Validated {} command(s) in '{}'.",
        tree.count(),
        dir.display()
    );
    Ok(())
}

fn run_tree(args: TreeArgs) -> Result<(), String> {
    let project = open_project(&args.project)?;
    let tree = project.build_tree().map_err(|e| e.to_string())?;
    let rendered = format_tree(&tree, args.format)?;
    println!("{rendered}");
    Ok(())
}
