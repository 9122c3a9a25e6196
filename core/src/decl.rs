//! Raw command declarations as written in command files.
//!
//! These types mirror the on-disk YAML/JSON shape one-to-one and are
//! deliberately loose (optional types, alias as string or list). They only
//! become usable after [`normalize_command`](crate::normalize_command) turns
//! them into a [`CommandNode`](crate::CommandNode).
//!
//! ```yaml
//! description: Aliases command
//! flags:
//!   - name: stream
//!     alias: s
//!     description: Stream arg
//! positionals:
//!   - name: positional
//!     alias: other-name
//!     description: Positional arg
//! action:
//!   echo: [stream, newArg]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValueType;

/// Declaration of a single command file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDecl {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flags: Vec<FlagDecl>,
    #[serde(default)]
    pub positionals: Vec<PositionalDecl>,
    #[serde(default)]
    pub action: Option<ActionDecl>,
}

/// One alias or a list of aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasDecl {
    One(String),
    Many(Vec<String>),
}

impl AliasDecl {
    /// Flattens to a list, keeping declaration order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(alias) => vec![alias.clone()],
            Self::Many(aliases) => aliases.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagDecl {
    pub name: String,
    #[serde(default, rename = "type")]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub alias: Option<AliasDecl>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionalDecl {
    pub name: String,
    #[serde(default, rename = "type")]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub alias: Option<AliasDecl>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub rest: bool,
}

/// Declared action; exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionDecl {
    #[serde(default)]
    pub print: Option<String>,
    #[serde(default)]
    pub echo: Option<EchoDecl>,
}

/// Keys for an echo action: an explicit list or the keyword `all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EchoDecl {
    Keys(Vec<String>),
    Keyword(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_forms_deserialize() {
        let one: FlagDecl = serde_json::from_str(r#"{"name": "stream", "alias": "s"}"#).unwrap();
        assert_eq!(one.alias.unwrap().to_vec(), vec!["s"]);

        let many: FlagDecl =
            serde_json::from_str(r#"{"name": "newArg", "alias": ["oldArg", "n"]}"#).unwrap();
        assert_eq!(many.alias.unwrap().to_vec(), vec!["oldArg", "n"]);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<FlagDecl, _> =
            serde_json::from_str(r#"{"name": "x", "aliases": ["y"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_heterogeneous_default_kept_verbatim() {
        let flag: FlagDecl = serde_json::from_str(
            r#"{"name": "arrayArg", "type": "array", "default": ["a", "b", false, 0]}"#,
        )
        .unwrap();
        assert_eq!(flag.value_type, Some(ValueType::Array));
        assert_eq!(flag.default, Some(serde_json::json!(["a", "b", false, 0])));
    }
}
