//! Declarative command trees: schema normalization, argument binding and
//! help rendering.
//!
//! This crate holds the pure core of a convention-driven CLI builder:
//!
//! - [`CommandDecl`] - a command as declared in a YAML/JSON command file.
//! - [`normalize_command`] - turns a declaration into a validated
//!   [`CommandNode`] with typed [`FlagSpec`]s and [`PositionalSpec`]s.
//! - [`resolve`] - walks a tree with invocation tokens to pick a node.
//! - [`bind`] - binds tokens against a node's schema into [`BoundOptions`].
//! - [`render_help`] - deterministic, column-aligned help text.
//! - [`App`] - runs one invocation end to end and returns an [`Outcome`].
//!
//! Reading command files from disk lives in the `command-tree-loader`
//! crate; nothing here touches the filesystem.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//! use serde_json::json;
//!
//! let flags = CommandNode::command("flags", Action::Echo(None))
//!     .with_description("Flags command")
//!     .with_flag(FlagSpec::new("stringArg", ValueType::String).with_default(json!("string")))
//!     .with_flag(FlagSpec::new("booleanArg", ValueType::Boolean).with_default(json!(false)));
//! let tree = CommandNode::group("cli").with_child(flags);
//!
//! let app = App::new(tree, "1.0.0").unwrap();
//! let outcome = app.run(&["flags", "--string-arg", "hello", "--boolean-arg"]);
//! assert_eq!(outcome.stdout, "stringArg: hello\nbooleanArg: true");
//!
//! let outcome = app.run(&["flags", "--help"]);
//! assert!(outcome.stdout.starts_with("cli flags\n\nFlags command\n"));
//! ```

mod app;
mod bind;
mod decl;
mod help;
pub mod naming;
mod normalize;
mod resolve;
mod types;

pub use app::{App, FAILURE_EXIT_CODE, Handler, Outcome, perform, render_value};
pub use bind::{BindingError, BoundOptions, bind};
pub use decl::{ActionDecl, AliasDecl, CommandDecl, EchoDecl, FlagDecl, PositionalDecl};
pub use help::{HELP_WIDTH, render_help, usage_line};
pub use normalize::{
    INPUT_ARGS_KEY, SchemaError, SchemaErrorKind, normalize_command, validate_node, validate_tree,
};
pub use resolve::{HELP_SWITCH, Resolution, VERSION_SWITCH, display_path, resolve};
pub use types::*;
