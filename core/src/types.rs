//! Command tree type definitions.
//!
//! This module defines the normalized data model produced by the schema
//! normalizer and consumed by the resolver, the argument binder and the help
//! renderer. The types serialize with [`serde`] so a resolved tree can be
//! written to a build manifest and loaded back without re-validating it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic type of a flag or positional argument.
///
/// # Examples
///
/// ```
/// use command_tree_core::ValueType;
///
/// assert_eq!(ValueType::default(), ValueType::String);
/// assert_eq!(ValueType::Boolean.as_str(), "boolean");
/// assert!(ValueType::Array.accepts(&serde_json::json!(["a", false, 0])));
/// assert!(!ValueType::Number.accepts(&serde_json::json!("1")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Free-form text (the default).
    #[default]
    String,
    /// Integer or floating point number.
    Number,
    /// Switch; takes no value on the command line.
    Boolean,
    /// Ordered sequence; elements are not coerced.
    Array,
}

impl ValueType {
    /// Returns the name used in help annotations (`[string]`, `[array]`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }

    /// Checks whether a JSON value has this runtime type.
    ///
    /// Array element types are not inspected.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
        }
    }

    /// Value bound when a field is neither supplied nor defaulted.
    pub fn empty_value(self) -> Value {
        match self {
            Self::Boolean => Value::Bool(false),
            Self::Array => Value::Array(Vec::new()),
            Self::String | Self::Number => Value::Null,
        }
    }
}

/// Normalized schema for a flag.
///
/// The canonical `name` is camelCase and is the key under which the bound
/// value is stored. On the command line the flag is spelled in kebab-case
/// (`--string-arg`); aliases keep their declaration order.
///
/// # Examples
///
/// ```
/// use command_tree_core::{FlagSpec, ValueType};
///
/// let flag = FlagSpec::new("stream", ValueType::String).with_alias("s");
/// assert_eq!(flag.switches(), vec!["--stream", "-s"]);
/// assert!(flag.matches("s"));
/// assert!(flag.matches("stream"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Canonical camelCase name
    pub name: String,
    /// Aliases in declaration order, camelCase
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Declared type
    pub value_type: ValueType,
    /// Default value, already checked against `value_type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Must be supplied (or defaulted)
    #[serde(default)]
    pub required: bool,
    /// Description shown in help
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FlagSpec {
    /// Creates a flag with no aliases, default or description.
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            value_type,
            default: None,
            required: false,
            description: None,
        }
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Checks if a bare switch name (without dashes) refers to this flag.
    ///
    /// Names are compared in kebab-case, so every spelling that folds to
    /// the displayed `--kebab-name` matches (`api-url`, `apiUrl`, `apiURL`).
    pub fn matches(&self, switch: &str) -> bool {
        let wanted = crate::naming::to_kebab_case(switch);
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .any(|name| crate::naming::to_kebab_case(name) == wanted)
    }

    /// Returns the command-line spellings: canonical first, then aliases.
    pub fn switches(&self) -> Vec<String> {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .map(|name| crate::naming::switch(name))
            .collect()
    }
}

/// Normalized schema for a positional argument.
///
/// # Examples
///
/// ```
/// use command_tree_core::{PositionalSpec, ValueType};
///
/// let message = PositionalSpec::new("message", ValueType::String).required();
/// assert!(message.required);
///
/// let rest = PositionalSpec::rest("restMessages");
/// assert!(rest.rest);
/// assert_eq!(rest.value_type, ValueType::Array);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionalSpec {
    /// Canonical camelCase name
    pub name: String,
    /// Aliases in declaration order, camelCase
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Declared type; always `Array` for a rest positional
    pub value_type: ValueType,
    /// Must be supplied (or defaulted)
    #[serde(default)]
    pub required: bool,
    /// Captures all remaining tokens
    #[serde(default)]
    pub rest: bool,
    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Description shown in help
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PositionalSpec {
    /// Creates an optional positional argument.
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            value_type,
            required: false,
            rest: false,
            default: None,
            description: None,
        }
    }

    /// Creates a rest positional capturing trailing tokens.
    pub fn rest(name: &str) -> Self {
        Self {
            rest: true,
            ..Self::new(name, ValueType::Array)
        }
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Marks the positional as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Declarative behavior attached to a runnable command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Writes fixed text; `{key}` placeholders are replaced by bound values.
    Print(String),
    /// Writes `key: value` lines for the listed keys, or for every declared
    /// positional and flag when no list is given.
    Echo(Option<Vec<String>>),
}

/// One addressable unit in the command hierarchy.
///
/// A node is either a runnable command (it has an [`Action`]) or a group
/// created for a directory without an index file. Directories with an index
/// file are runnable and have children at the same time.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Action, CommandNode};
///
/// let tree = CommandNode::group("cli")
///     .with_child(CommandNode::command("a", Action::Print("Command A".into())))
///     .with_child(CommandNode::group("without-index")
///         .with_child(CommandNode::command("d", Action::Print("Command D".into()))));
///
/// assert!(!tree.is_runnable());
/// assert_eq!(tree.find_child("withoutIndex").unwrap().name, "without-index");
/// assert_eq!(tree.child_names(), vec!["a", "without-index"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandNode {
    /// kebab-case display name
    pub name: String,
    /// camelCase internal address
    pub key: String,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Positional arguments in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positionals: Vec<PositionalSpec>,
    /// Flags in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagSpec>,
    /// Nested sub-commands
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CommandNode>,
    /// Schema came from a directory's index file
    #[serde(default)]
    pub is_index: bool,
    /// Behavior when invoked; `None` for groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl CommandNode {
    /// Creates a non-runnable group node.
    pub fn group(name: &str) -> Self {
        Self {
            name: crate::naming::to_kebab_case(name),
            key: crate::naming::to_camel_case(name),
            description: None,
            positionals: Vec::new(),
            flags: Vec::new(),
            children: Vec::new(),
            is_index: false,
            action: None,
        }
    }

    /// Creates a runnable leaf node.
    pub fn command(name: &str, action: Action) -> Self {
        Self {
            action: Some(action),
            ..Self::group(name)
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds a flag.
    pub fn with_flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Adds a positional argument.
    pub fn with_positional(mut self, positional: PositionalSpec) -> Self {
        self.positionals.push(positional);
        self
    }

    /// Adds a nested sub-command.
    pub fn with_child(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns `true` if invoking this node runs something.
    pub fn is_runnable(&self) -> bool {
        self.action.is_some()
    }

    /// Finds a direct child by kebab-case or camelCase name.
    pub fn find_child(&self, token: &str) -> Option<&CommandNode> {
        let wanted = crate::naming::to_kebab_case(token);
        self.children
            .iter()
            .find(|child| crate::naming::to_kebab_case(&child.key) == wanted)
    }

    /// Finds a flag by bare switch name (canonical or alias).
    pub fn find_flag(&self, switch: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|flag| flag.matches(switch))
    }

    /// Gets all child names.
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the rest positional, if one is declared.
    pub fn rest_positional(&self) -> Option<&PositionalSpec> {
        self.positionals.iter().find(|p| p.rest)
    }

    /// Canonical names of every declared positional, then every flag.
    pub fn declared_keys(&self) -> Vec<&str> {
        self.positionals
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.flags.iter().map(|f| f.name.as_str()))
            .collect()
    }

    /// Counts this node and all of its descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(CommandNode::count).sum::<usize>()
    }
}
