//! Help text rendering.
//!
//! Rendering is two-pass per section: the left column width is computed
//! over every row of the section first, then each row is formatted against
//! it. Annotations (`[type]`, `[required]`, `[default: ...]`) are right
//! aligned to [`HELP_WIDTH`]. Output has no trailing whitespace and no
//! trailing newline, and depends only on the schema.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//! use serde_json::json;
//!
//! let node = CommandNode::command("cli", Action::Echo(None))
//!     .with_description("Flags command")
//!     .with_flag(
//!         FlagSpec::new("numberArg", ValueType::Number)
//!             .with_description("Number arg")
//!             .with_default(json!(0)),
//!     );
//!
//! let help = render_help(&[&node]);
//! assert!(help.starts_with("cli\n\nFlags command\n\nOptions:\n"));
//! assert!(help.ends_with("  --number-arg  Number arg                                 [number] [default: 0]"));
//! ```

use crate::naming::{switch, to_kebab_case};
use crate::resolve::display_path;
use crate::{CommandNode, FlagSpec, PositionalSpec};

/// Column at which annotations end.
pub const HELP_WIDTH: usize = 80;

const INDENT: &str = "  ";
const GAP: usize = 2;

struct Row {
    left: String,
    description: String,
    annotations: Vec<String>,
}

impl Row {
    fn new(left: String, description: Option<&str>) -> Self {
        Self {
            left,
            description: description.unwrap_or_default().to_string(),
            annotations: Vec::new(),
        }
    }

    fn annotate(mut self, annotation: String) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Renders help for the last node of `path`; earlier entries are its
/// ancestors and only feed the usage line.
///
/// # Panics
///
/// Panics if `path` is empty.
pub fn render_help(path: &[&CommandNode]) -> String {
    let node = path[path.len() - 1];
    let prefix = display_path(path);
    let mut sections = vec![usage_line(&prefix, node)];

    if let Some(description) = node.description.as_deref() {
        sections.push(description.to_string());
    }

    if !node.children.is_empty() {
        let rows = node
            .children
            .iter()
            .map(|child| Row::new(format!("{prefix} {}", child.name), child.description.as_deref()))
            .collect::<Vec<_>>();
        sections.push(render_section("Commands:", &rows));
    }

    if !node.positionals.is_empty() {
        // The rest positional is listed ahead of the others.
        let ordered = node
            .rest_positional()
            .into_iter()
            .chain(node.positionals.iter().filter(|p| !p.rest));
        let rows = ordered.map(positional_row).collect::<Vec<_>>();
        sections.push(render_section("Positionals:", &rows));
    }

    let mut options = vec![
        Row::new("--help".to_string(), Some("Show help")).annotate("[boolean]".to_string()),
        Row::new("--version".to_string(), Some("Show version number"))
            .annotate("[boolean]".to_string()),
    ];
    options.extend(node.flags.iter().map(flag_row));
    sections.push(render_section("Options:", &options));

    sections.join("\n\n")
}

/// Builds the usage line: `<path> <required> [optional] [rest..]`.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let node = CommandNode::command("cli", Action::Echo(None))
///     .with_positional(PositionalSpec::new("message", ValueType::String).required())
///     .with_positional(PositionalSpec::new("otherMessage", ValueType::String))
///     .with_positional(PositionalSpec::rest("restMessages"));
///
/// assert_eq!(
///     usage_line("cli", &node),
///     "cli <message> [other-message] [rest-messages..]"
/// );
/// ```
pub fn usage_line(prefix: &str, node: &CommandNode) -> String {
    let mut parts = vec![prefix.to_string()];
    for positional in &node.positionals {
        let names = std::iter::once(&positional.name)
            .chain(positional.aliases.iter())
            .map(|name| to_kebab_case(name))
            .collect::<Vec<_>>()
            .join("|");
        let dots = if positional.rest { ".." } else { "" };
        if positional.required {
            parts.push(format!("<{names}{dots}>"));
        } else {
            parts.push(format!("[{names}{dots}]"));
        }
    }
    parts.join(" ")
}

fn positional_row(positional: &PositionalSpec) -> Row {
    let left = std::iter::once(&positional.name)
        .chain(positional.aliases.iter())
        .map(|name| to_kebab_case(name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut row = Row::new(left, positional.description.as_deref());
    if !positional.rest {
        row = row.annotate(format!("[{}]", positional.value_type.as_str()));
    }
    if let Some(default) = &positional.default {
        row = row.annotate(format!("[default: {default}]"));
    }
    row
}

fn flag_row(flag: &FlagSpec) -> Row {
    let left = std::iter::once(&flag.name)
        .chain(flag.aliases.iter())
        .map(|name| switch(name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut row = Row::new(left, flag.description.as_deref())
        .annotate(format!("[{}]", flag.value_type.as_str()));
    if flag.required {
        row = row.annotate("[required]".to_string());
    }
    if let Some(default) = &flag.default {
        row = row.annotate(format!("[default: {default}]"));
    }
    row
}

fn render_section(title: &str, rows: &[Row]) -> String {
    let width = rows
        .iter()
        .map(|row| row.left.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![title.to_string()];
    for row in rows {
        let mut line = format!(
            "{INDENT}{left:<width$}{gap}{description}",
            left = row.left,
            gap = " ".repeat(GAP),
            description = row.description,
        );

        if row.annotations.is_empty() {
            lines.push(line.trim_end().to_string());
            continue;
        }

        let annotations = row.annotations.join(" ");
        let used = line.chars().count();
        let needed = annotations.chars().count();
        if used + GAP + needed <= HELP_WIDTH {
            line.push_str(&" ".repeat(HELP_WIDTH - used - needed));
        } else {
            line = line.trim_end().to_string();
            line.push_str(&" ".repeat(GAP));
        }
        line.push_str(&annotations);
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Action, ValueType};

    fn flags_command() -> CommandNode {
        CommandNode::command("cli", Action::Echo(None))
            .with_description("Flags command")
            .with_flag(
                FlagSpec::new("stringArg", ValueType::String)
                    .with_description("String arg")
                    .with_default(json!("string"))
                    .required(),
            )
            .with_flag(
                FlagSpec::new("booleanArg", ValueType::Boolean)
                    .with_description("Boolean arg")
                    .with_default(json!(false)),
            )
            .with_flag(
                FlagSpec::new("numberArg", ValueType::Number)
                    .with_description("Number arg")
                    .with_default(json!(0)),
            )
            .with_flag(
                FlagSpec::new("arrayArg", ValueType::Array)
                    .with_description("Array arg")
                    .with_default(json!(["a", "b", false, 0])),
            )
    }

    #[test]
    fn test_flags_help() {
        let expected = "\
cli

Flags command

Options:
  --help         Show help                                             [boolean]
  --version      Show version number                                   [boolean]
  --string-arg   String arg              [string] [required] [default: \"string\"]
  --boolean-arg  Boolean arg                          [boolean] [default: false]
  --number-arg   Number arg                                [number] [default: 0]
  --array-arg    Array arg                  [array] [default: [\"a\",\"b\",false,0]]";

        assert_eq!(render_help(&[&flags_command()]), expected);
    }

    #[test]
    fn test_aliases_help() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_description("Aliases command")
            .with_positional(
                PositionalSpec::new("positional", ValueType::String)
                    .with_alias("otherName")
                    .with_description("Positional arg"),
            )
            .with_flag(
                FlagSpec::new("stream", ValueType::String)
                    .with_alias("s")
                    .with_description("Stream arg"),
            )
            .with_flag(
                FlagSpec::new("newArg", ValueType::String)
                    .with_alias("oldArg")
                    .with_description("New arg"),
            );

        let expected = "\
cli [positional|other-name]

Aliases command

Positionals:
  positional, other-name  Positional arg                                [string]

Options:
  --help                Show help                                      [boolean]
  --version             Show version number                            [boolean]
  --stream, -s          Stream arg                                      [string]
  --new-arg, --old-arg  New arg                                         [string]";

        assert_eq!(render_help(&[&node]), expected);
    }

    #[test]
    fn test_positional_help_lists_rest_first() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_description("Positional args command")
            .with_positional(
                PositionalSpec::new("message", ValueType::String)
                    .required()
                    .with_description("Message"),
            )
            .with_positional(
                PositionalSpec::new("otherMessage", ValueType::String)
                    .with_description("Other message"),
            )
            .with_positional(
                PositionalSpec::rest("restMessages").with_description("Rest of the messages"),
            );

        let expected = "\
cli <message> [other-message] [rest-messages..]

Positional args command

Positionals:
  rest-messages  Rest of the messages
  message        Message                                                [string]
  other-message  Other message                                          [string]

Options:
  --help     Show help                                                 [boolean]
  --version  Show version number                                       [boolean]";

        assert_eq!(render_help(&[&node]), expected);
    }

    #[test]
    fn test_group_help_lists_commands() {
        let root = CommandNode::group("cli");
        let group = CommandNode::group("without-index")
            .with_child(CommandNode::command("d", Action::Print("Command D".into())));

        let expected = "\
cli without-index

Commands:
  cli without-index d

Options:
  --help     Show help                                                 [boolean]
  --version  Show version number                                       [boolean]";

        assert_eq!(render_help(&[&root, &group]), expected);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let node = flags_command();
        assert_eq!(render_help(&[&node]), render_help(&[&node]));
    }

    #[test]
    fn test_overlong_row_keeps_annotations() {
        let node = CommandNode::command("cli", Action::Echo(None)).with_flag(
            FlagSpec::new("x", ValueType::String).with_description(&"d".repeat(90)),
        );

        let help = render_help(&[&node]);
        let last = help.lines().last().unwrap();
        assert!(last.ends_with(&format!("{}  [string]", "d".repeat(90))));
    }
}
