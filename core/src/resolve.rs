//! Sub-command dispatch.
//!
//! Leading tokens are matched against child names, kebab-case or camelCase.
//! `--help` and `--version` may precede a sub-command token; every other
//! token starting with `-` stops the descent, as does the first token that
//! names no child. A token that names a child always dispatches, even when
//! the current node also declares positionals.

use crate::CommandNode;

/// Global switches available on every node.
pub const HELP_SWITCH: &str = "--help";
pub const VERSION_SWITCH: &str = "--version";

/// Outcome of walking the tree with an invocation's tokens.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Root first, selected node last.
    pub path: Vec<&'a CommandNode>,
    /// Tokens left for the selected node, global switches included.
    pub args: Vec<String>,
}

impl<'a> Resolution<'a> {
    /// The selected node.
    pub fn node(&self) -> &'a CommandNode {
        // `path` always holds at least the root.
        self.path[self.path.len() - 1]
    }

    /// Space-separated display path, e.g. `cli without-index`.
    pub fn display_path(&self) -> String {
        display_path(&self.path)
    }

    /// Whether `--help` appears before any `--` terminator.
    pub fn wants_help(&self) -> bool {
        self.has_global(HELP_SWITCH)
    }

    /// Whether `--version` appears before any `--` terminator.
    pub fn wants_version(&self) -> bool {
        self.has_global(VERSION_SWITCH)
    }

    fn has_global(&self, switch: &str) -> bool {
        self.args
            .iter()
            .take_while(|arg| arg.as_str() != "--")
            .any(|arg| arg == switch)
    }
}

/// Walks the tree from `root` following sub-command tokens.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let tree = CommandNode::group("cli").with_child(
///     CommandNode::group("without-index")
///         .with_child(CommandNode::command("d", Action::Print("Command D".into()))),
/// );
///
/// let resolution = resolve(&tree, &["without-index", "d", "extra"]);
/// assert_eq!(resolution.display_path(), "cli without-index d");
/// assert_eq!(resolution.args, vec!["extra"]);
///
/// let resolution = resolve(&tree, &["--help", "without-index"]);
/// assert_eq!(resolution.display_path(), "cli without-index");
/// assert!(resolution.wants_help());
/// ```
pub fn resolve<'a, S: AsRef<str>>(root: &'a CommandNode, tokens: &[S]) -> Resolution<'a> {
    let mut path = vec![root];
    let mut node = root;
    let mut leading = Vec::new();
    let mut idx = 0;

    while let Some(token) = tokens.get(idx).map(|t| t.as_ref()) {
        if token == HELP_SWITCH || token == VERSION_SWITCH {
            leading.push(token.to_string());
        } else if token.starts_with('-') {
            break;
        } else if let Some(child) = node.find_child(token) {
            path.push(child);
            node = child;
        } else {
            break;
        }
        idx += 1;
    }

    let args = leading
        .into_iter()
        .chain(tokens[idx..].iter().map(|t| t.as_ref().to_string()))
        .collect();
    Resolution { path, args }
}

/// Joins node names with spaces.
pub fn display_path(path: &[&CommandNode]) -> String {
    path.iter()
        .map(|node| node.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
