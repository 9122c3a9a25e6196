//! Schema normalization and tree validation.
//!
//! Turns loose [`CommandDecl`] values into strongly-typed [`CommandNode`]s and
//! rejects malformed declarations eagerly: duplicate names or aliases, a rest
//! positional that is not last, defaults whose type does not match, reserved
//! names, and echo actions naming undeclared keys.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::*;
//!
//! let decl: CommandDecl = serde_json::from_str(r#"{
//!     "description": "Flags command",
//!     "flags": [
//!         {"name": "numberArg", "type": "number", "default": 0},
//!         {"name": "arrayArg", "type": "array", "default": ["a", "b", false, 0]}
//!     ]
//! }"#).unwrap();
//!
//! let node = normalize_command("cli", "cli", &decl).unwrap();
//! assert_eq!(node.flags.len(), 2);
//! assert_eq!(node.flags[1].value_type, ValueType::Array);
//!
//! // Invalid: the default does not match the declared type
//! let bad: CommandDecl = serde_json::from_str(r#"{
//!     "flags": [{"name": "numberArg", "type": "number", "default": "zero"}]
//! }"#).unwrap();
//! assert!(normalize_command("cli", "cli", &bad).is_err());
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::decl::{ActionDecl, CommandDecl, EchoDecl, FlagDecl, PositionalDecl};
use crate::naming::{to_camel_case, to_kebab_case};
use crate::{Action, CommandNode, FlagSpec, PositionalSpec, ValueType};

/// Key under which unconsumed positional tokens are exposed.
pub const INPUT_ARGS_KEY: &str = "inputArgs";

/// Names every command gets for free.
const RESERVED_NAMES: &[&str] = &["help", "version", INPUT_ARGS_KEY];

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("static regex must compile"));

/// A malformed command declaration.
///
/// Always fatal at load time. `command` is the space-separated path of the
/// offending command (e.g. `cli without-index d`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid command `{command}`: {kind}")]
pub struct SchemaError {
    pub command: String,
    pub kind: SchemaErrorKind,
}

/// What exactly is wrong with a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    /// Name is empty, does not start with a letter, or contains characters
    /// other than letters, digits and `-`.
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    /// Name collides with `help`, `version` or `inputArgs`.
    #[error("reserved name: {0}")]
    ReservedName(String),
    /// Two flags/positionals share a canonical name.
    #[error("duplicate name in scope: {0}")]
    DuplicateName(String),
    /// An alias is already used by another entry in the same scope.
    #[error("duplicate alias in scope: {0}")]
    DuplicateAlias(String),
    /// A rest positional is followed by another positional.
    #[error("rest positional must be the last positional: {0}")]
    RestNotLast(String),
    /// A rest positional declared with a non-array type.
    #[error("rest positional must have array type: {0}")]
    RestType(String),
    /// A non-rest positional declared with array type.
    #[error("array positional must be declared as rest: {0}")]
    ArrayPositional(String),
    /// A default whose runtime type differs from the declared type.
    #[error("default for {name} must be of type {expected}")]
    DefaultTypeMismatch { name: String, expected: &'static str },
    /// Two sibling commands share a name.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
    /// Action declares neither or both of `print` and `echo`, or an unknown
    /// echo keyword.
    #[error("invalid action: {0}")]
    InvalidAction(String),
    /// Echo action lists a key the command does not declare.
    #[error("echo names undeclared key: {0}")]
    UnknownEchoKey(String),
}

impl SchemaError {
    /// Error for the command at the space-separated `command` path.
    pub fn new(command: &str, kind: SchemaErrorKind) -> Self {
        Self {
            command: command.to_string(),
            kind,
        }
    }
}

/// Normalizes one command declaration into a validated node.
///
/// `path` is used only for error messages; `name` becomes the node name.
/// A declaration without an action echoes every declared key.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found.
pub fn normalize_command(
    path: &str,
    name: &str,
    decl: &CommandDecl,
) -> Result<CommandNode, SchemaError> {
    check_name(path, name)?;

    let flags = decl
        .flags
        .iter()
        .map(normalize_flag)
        .collect::<Vec<_>>();
    let positionals = decl
        .positionals
        .iter()
        .map(normalize_positional)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|kind| SchemaError::new(path, kind))?;
    let action = match &decl.action {
        Some(action) => normalize_action(action).map_err(|kind| SchemaError::new(path, kind))?,
        None => Action::Echo(None),
    };

    let node = CommandNode {
        description: decl.description.clone(),
        positionals,
        flags,
        action: Some(action),
        ..CommandNode::group(name)
    };
    validate_node(path, &node)?;
    Ok(node)
}

fn normalize_flag(decl: &FlagDecl) -> FlagSpec {
    FlagSpec {
        name: to_camel_case(&decl.name),
        aliases: decl
            .alias
            .as_ref()
            .map(|a| a.to_vec().iter().map(|s| to_camel_case(s)).collect())
            .unwrap_or_default(),
        value_type: decl
            .value_type
            .unwrap_or_else(|| infer_type(decl.default.as_ref())),
        default: decl.default.clone(),
        required: decl.required,
        description: decl.description.clone(),
    }
}

fn normalize_positional(decl: &PositionalDecl) -> Result<PositionalSpec, SchemaErrorKind> {
    let value_type = match (decl.rest, decl.value_type) {
        (true, None | Some(ValueType::Array)) => ValueType::Array,
        (true, Some(_)) => return Err(SchemaErrorKind::RestType(decl.name.clone())),
        (false, Some(ValueType::Array)) => {
            return Err(SchemaErrorKind::ArrayPositional(decl.name.clone()));
        }
        (false, declared) => declared.unwrap_or_else(|| infer_type(decl.default.as_ref())),
    };

    Ok(PositionalSpec {
        name: to_camel_case(&decl.name),
        aliases: decl
            .alias
            .as_ref()
            .map(|a| a.to_vec().iter().map(|s| to_camel_case(s)).collect())
            .unwrap_or_default(),
        value_type,
        required: decl.required,
        rest: decl.rest,
        default: decl.default.clone(),
        description: decl.description.clone(),
    })
}

fn normalize_action(decl: &ActionDecl) -> Result<Action, SchemaErrorKind> {
    match (&decl.print, &decl.echo) {
        (Some(text), None) => Ok(Action::Print(text.clone())),
        (None, Some(EchoDecl::Keys(keys))) => Ok(Action::Echo(Some(
            keys.iter().map(|k| to_camel_case(k)).collect(),
        ))),
        (None, Some(EchoDecl::Keyword(word))) if word == "all" => Ok(Action::Echo(None)),
        (None, Some(EchoDecl::Keyword(word))) => Err(SchemaErrorKind::InvalidAction(format!(
            "unknown echo keyword {word:?}"
        ))),
        (Some(_), Some(_)) => Err(SchemaErrorKind::InvalidAction(
            "print and echo are mutually exclusive".to_string(),
        )),
        (None, None) => Err(SchemaErrorKind::InvalidAction(
            "expected print or echo".to_string(),
        )),
    }
}

fn infer_type(default: Option<&Value>) -> ValueType {
    match default {
        Some(Value::Bool(_)) => ValueType::Boolean,
        Some(Value::Number(_)) => ValueType::Number,
        Some(Value::Array(_)) => ValueType::Array,
        _ => ValueType::String,
    }
}

/// Validates a whole tree: every node's schema plus sibling uniqueness.
///
/// Trees built by the loader are already validated node by node; this is
/// for trees deserialized from a manifest or constructed in code.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let tree = CommandNode::group("cli")
///     .with_child(CommandNode::command("a", Action::Print("A".into())))
///     .with_child(CommandNode::command("a", Action::Print("B".into())));
///
/// let err = validate_tree(&tree).unwrap_err();
/// assert_eq!(err.kind, SchemaErrorKind::DuplicateCommand("a".into()));
/// ```
pub fn validate_tree(root: &CommandNode) -> Result<(), SchemaError> {
    let mut path = vec![root.name.clone()];
    validate_node(&root.name, root)?;
    validate_children(root, &mut path)
}

fn validate_children(node: &CommandNode, path: &mut Vec<String>) -> Result<(), SchemaError> {
    let mut seen: HashSet<String> = HashSet::new();

    for child in &node.children {
        if !seen.insert(to_kebab_case(&child.key)) {
            return Err(SchemaError::new(
                &path.join(" "),
                SchemaErrorKind::DuplicateCommand(child.name.clone()),
            ));
        }

        path.push(child.name.clone());
        let joined = path.join(" ");
        check_name(&joined, &child.name)?;
        validate_node(&joined, child)?;
        validate_children(child, path)?;
        path.pop();
    }

    Ok(())
}

/// Validates the flag/positional schema of a single node.
pub fn validate_node(path: &str, node: &CommandNode) -> Result<(), SchemaError> {
    let fail = |kind: SchemaErrorKind| -> Result<(), SchemaError> {
        Err(SchemaError::new(path, kind))
    };

    // Lookups fold names to kebab-case, so uniqueness is checked in that form.
    let declared = node.declared_keys();
    let mut canonical: HashSet<String> = HashSet::new();
    for name in declared.iter().copied() {
        check_entry_name(name).map_err(|kind| SchemaError::new(path, kind))?;
        if !canonical.insert(to_kebab_case(name)) {
            return fail(SchemaErrorKind::DuplicateName(to_kebab_case(name)));
        }
    }

    let mut aliases: HashSet<String> = HashSet::new();
    let all_aliases = node
        .flags
        .iter()
        .flat_map(|f| f.aliases.iter())
        .chain(node.positionals.iter().flat_map(|p| p.aliases.iter()));
    for alias in all_aliases {
        check_entry_name(alias).map_err(|kind| SchemaError::new(path, kind))?;
        let kebab = to_kebab_case(alias);
        if canonical.contains(&kebab) || !aliases.insert(kebab) {
            return fail(SchemaErrorKind::DuplicateAlias(to_kebab_case(alias)));
        }
    }

    let last = node.positionals.len().saturating_sub(1);
    for (idx, positional) in node.positionals.iter().enumerate() {
        if positional.rest && idx != last {
            return fail(SchemaErrorKind::RestNotLast(to_kebab_case(&positional.name)));
        }
        if positional.rest && positional.value_type != ValueType::Array {
            return fail(SchemaErrorKind::RestType(to_kebab_case(&positional.name)));
        }
        if !positional.rest && positional.value_type == ValueType::Array {
            return fail(SchemaErrorKind::ArrayPositional(to_kebab_case(
                &positional.name,
            )));
        }
        check_default(&positional.name, positional.value_type, positional.default.as_ref())
            .map_err(|kind| SchemaError::new(path, kind))?;
    }

    for flag in &node.flags {
        check_default(&flag.name, flag.value_type, flag.default.as_ref())
            .map_err(|kind| SchemaError::new(path, kind))?;
    }

    if let Some(Action::Echo(Some(keys))) = &node.action {
        for key in keys {
            if key != INPUT_ARGS_KEY && !declared.contains(&key.as_str()) {
                return fail(SchemaErrorKind::UnknownEchoKey(key.clone()));
            }
        }
    }

    Ok(())
}

fn check_default(
    name: &str,
    value_type: ValueType,
    default: Option<&Value>,
) -> Result<(), SchemaErrorKind> {
    match default {
        Some(value) if !value.is_null() && !value_type.accepts(value) => {
            Err(SchemaErrorKind::DefaultTypeMismatch {
                name: to_kebab_case(name),
                expected: value_type.as_str(),
            })
        }
        _ => Ok(()),
    }
}

fn check_name(path: &str, name: &str) -> Result<(), SchemaError> {
    if NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::new(
            path,
            SchemaErrorKind::InvalidName(name.to_string()),
        ))
    }
}

fn check_entry_name(name: &str) -> Result<(), SchemaErrorKind> {
    if !NAME_RE.is_match(name) {
        return Err(SchemaErrorKind::InvalidName(name.to_string()));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(SchemaErrorKind::ReservedName(name.to_string()));
    }
    Ok(())
}
