//! Invocation runtime.
//!
//! [`App`] ties the pieces together for one process invocation: resolve the
//! sub-command, answer `--help` / `--version`, bind arguments, then run the
//! node's handler. [`App::run`] never writes to the terminal itself; it
//! returns an [`Outcome`] so binaries decide where the text goes and tests
//! can compare it byte for byte.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::bind::{BindingError, BoundOptions, bind};
use crate::help::render_help;
use crate::naming::to_kebab_case;
use crate::normalize::{INPUT_ARGS_KEY, SchemaError, validate_tree};
use crate::resolve::{Resolution, resolve};
use crate::{Action, CommandNode};

/// Exit status for every failed invocation.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Rust handler registered for a command path.
pub type Handler = Box<dyn Fn(&BoundOptions) -> Result<String, String> + Send + Sync>;

/// What an invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Set when the invocation failed during dispatch or binding.
    pub error: Option<BindingError>,
}

impl Outcome {
    fn success(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
            error: None,
        }
    }

    fn failure(stderr: String, error: Option<BindingError>) -> Self {
        Self {
            stdout: String::new(),
            stderr,
            exit_code: FAILURE_EXIT_CODE,
            error,
        }
    }

    /// Returns `true` when the exit code is zero.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A runnable command tree.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let tree = CommandNode::group("cli")
///     .with_child(CommandNode::command("a", Action::Print("Command A".into())))
///     .with_child(CommandNode::command("greet", Action::Echo(None))
///         .with_positional(PositionalSpec::new("name", ValueType::String).required()));
///
/// let app = App::new(tree, "1.2.3").unwrap()
///     .with_handler("greet", |opts| Ok(format!("Hi {}", opts.get("name").unwrap())));
///
/// assert_eq!(app.run(&["a"]).stdout, "Command A");
/// assert_eq!(app.run(&["greet", "bob"]).stdout, "Hi \"bob\"");
/// assert_eq!(app.run(&["--version"]).stdout, "1.2.3");
///
/// let missing = app.run::<&str>(&[]);
/// assert_eq!(missing.exit_code, 1);
/// assert!(missing.stderr.starts_with("cli\n\nCommands:\n"));
/// ```
pub struct App {
    root: CommandNode,
    version: String,
    handlers: HashMap<Vec<String>, Handler>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root", &self.root.name)
            .field("version", &self.version)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl App {
    /// Creates a runtime after validating the whole tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found in the tree.
    pub fn new(root: CommandNode, version: impl Into<String>) -> Result<Self, SchemaError> {
        validate_tree(&root)?;
        Ok(Self {
            root,
            version: version.into(),
            handlers: HashMap::new(),
        })
    }

    /// Registers a handler for the command at `path`, a space-separated list
    /// of sub-command names (empty for the root). Handlers take precedence
    /// over declared actions and make group nodes runnable.
    pub fn with_handler<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&BoundOptions) -> Result<String, String> + Send + Sync + 'static,
    {
        let key = path.split_whitespace().map(to_kebab_case).collect();
        self.handlers.insert(key, Box::new(handler));
        self
    }

    /// The root of the command tree.
    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// The version printed by `--version`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Renders help for the node reached by `tokens`.
    pub fn help<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        render_help(&resolve(&self.root, tokens).path)
    }

    /// Runs one invocation; `args` excludes the program name.
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> Outcome {
        let resolution = resolve(&self.root, args);
        let node = resolution.node();
        debug!(command = %resolution.display_path(), args = ?resolution.args, "resolved command");

        if resolution.wants_help() {
            return Outcome::success(render_help(&resolution.path));
        }
        if resolution.wants_version() {
            return Outcome::success(self.version.clone());
        }

        let bound = match bind(node, &resolution.args) {
            Ok(bound) => bound,
            Err(err) => return fail(&resolution, err),
        };

        let key: Vec<String> = resolution.path[1..]
            .iter()
            .map(|n| n.name.clone())
            .collect();
        let result = match (self.handlers.get(&key), &node.action) {
            (Some(handler), _) => handler(&bound),
            (None, Some(action)) => Ok(perform(node, action, &bound)),
            (None, None) => {
                return Outcome::failure(
                    render_help(&resolution.path),
                    Some(BindingError::MissingCommand),
                );
            }
        };

        match result {
            Ok(stdout) => Outcome::success(stdout),
            Err(message) => Outcome::failure(message, None),
        }
    }
}

fn fail(resolution: &Resolution<'_>, err: BindingError) -> Outcome {
    let stderr = format!("{}\n\n{err}", render_help(&resolution.path));
    Outcome::failure(stderr, Some(err))
}

/// Executes a declarative action.
pub fn perform(node: &CommandNode, action: &Action, bound: &BoundOptions) -> String {
    match action {
        Action::Print(template) => {
            let mut text = template.clone();
            for key in node
                .declared_keys()
                .into_iter()
                .chain(std::iter::once(INPUT_ARGS_KEY))
            {
                let placeholder = format!("{{{key}}}");
                if text.contains(&placeholder) {
                    if let Some(value) = bound.value(key) {
                        text = text.replace(&placeholder, &render_value(&value));
                    }
                }
            }
            text
        }
        Action::Echo(keys) => {
            let keys: Vec<&str> = match keys {
                Some(keys) => keys.iter().map(String::as_str).collect(),
                None => node.declared_keys(),
            };
            keys.into_iter()
                .filter_map(|key| {
                    bound
                        .value(key)
                        .map(|value| format!("{key}: {}", render_value(&value)))
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Strings render raw, everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
