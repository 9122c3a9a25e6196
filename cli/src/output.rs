//! Output formatting for resolved command trees.

use command_tree_core::{CommandNode, usage_line};

/// Supported output formats for `cmdtree tree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}

/// Formats a command tree in the requested output format.
pub fn format_tree(tree: &CommandNode, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(tree)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(tree).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Text => Ok(tree_to_text(tree)),
    }
}

/// One line per command, indented by depth:
///
/// ```text
/// cli
///   a  Command A
///   with-index (index)
///     c
///   without-index (group)
///     d
/// ```
fn tree_to_text(tree: &CommandNode) -> String {
    let mut lines = Vec::new();
    push_node(tree, 0, &mut lines);
    lines.join("\n")
}

fn push_node(node: &CommandNode, depth: usize, lines: &mut Vec<String>) {
    let mut line = format!("{}{}", "  ".repeat(depth), usage_line(&node.name, node));
    if node.is_index && depth > 0 {
        line.push_str(" (index)");
    } else if !node.is_runnable() {
        line.push_str(" (group)");
    }
    if let Some(desc) = &node.description {
        line.push_str("  ");
        line.push_str(desc);
    }
    lines.push(line);

    for child in &node.children {
        push_node(child, depth + 1, lines);
    }
}
