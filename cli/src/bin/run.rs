use std::path::PathBuf;

use command_tree_cli::telemetry::init_tracing;
use command_tree_loader::Project;

/// Overrides the project directory (default: the working directory).
const PROJECT_ENV: &str = "CMDTREE_PROJECT";

fn main() {
    init_tracing();

    match collect_args().and_then(|args| run(&args)) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn collect_args() -> Result<Vec<String>, String> {
    std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| format!("invalid UTF-8 argument: {arg:?}"))
        })
        .collect()
}

fn run(args: &[String]) -> Result<i32, String> {
    let root = match std::env::var_os(PROJECT_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()
            .map_err(|err| format!("Failed to read working directory: {err}"))?,
    };

    let project = Project::open(&root).map_err(|e| e.to_string())?;
    let app = project.app().map_err(|e| e.to_string())?;
    let outcome = app.run(args);

    if !outcome.stdout.is_empty() {
        println!("{}", outcome.stdout);
    }
    if !outcome.stderr.is_empty() {
        eprintln!("{}", outcome.stderr);
    }
    Ok(outcome.exit_code)
}
