//! Argument binding.
//!
//! [`bind`] is a pure function from a node's schema and the invocation tokens
//! (after sub-command resolution) to [`BoundOptions`]. It owns no parser
//! state, so the same tree can bind any number of invocations.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::*;
//! use serde_json::json;
//!
//! let node = CommandNode::command("cli", Action::Echo(None))
//!     .with_flag(FlagSpec::new("stream", ValueType::String).with_alias("s"))
//!     .with_flag(FlagSpec::new("arrayArg", ValueType::Array).with_default(json!(["a", 0])));
//!
//! let bound = bind(&node, &["-s", "yes"]).unwrap();
//! assert_eq!(bound.get("stream"), Some(&json!("yes")));
//! assert_eq!(bound.get("arrayArg"), Some(&json!(["a", 0])));
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::naming::{switch, to_kebab_case};
use crate::normalize::INPUT_ARGS_KEY;
use crate::{CommandNode, FlagSpec, PositionalSpec, ValueType};

/// A per-invocation failure.
///
/// The `Display` text is what ends up on the error stream below the usage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A required flag or positional was neither supplied nor defaulted.
    #[error("Missing required argument: {0}")]
    MissingRequired(String),
    /// A `--flag` or `-a` that the command does not declare.
    #[error("Unknown argument: {0}")]
    UnknownFlag(String),
    /// A value-taking flag at the end of the token list.
    #[error("Not enough arguments following: {0}")]
    MissingValue(String),
    /// A number flag or positional given a non-numeric value.
    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: String, value: String },
    /// A boolean given something other than `true` or `false`.
    #[error("Invalid boolean for {name}: {value}")]
    InvalidBoolean { name: String, value: String },
    /// A sub-command token that matches no child.
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    /// A group invoked without a sub-command.
    #[error("Missing command")]
    MissingCommand,
}

/// Result of binding one invocation.
///
/// Every declared canonical name is present: supplied values first take
/// precedence, then declared defaults, then the type's empty value
/// (`false`, `[]` or `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundOptions {
    values: IndexMap<String, Value>,
    input_args: Vec<String>,
}

impl BoundOptions {
    /// Looks up a bound value by canonical name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value for `key`, including the synthetic `inputArgs`.
    pub fn value(&self, key: &str) -> Option<Value> {
        if key == INPUT_ARGS_KEY {
            return Some(Value::Array(
                self.input_args.iter().cloned().map(Value::String).collect(),
            ));
        }
        self.values.get(key).cloned()
    }

    /// Tokens no positional consumed.
    pub fn input_args(&self) -> &[String] {
        &self.input_args
    }

    /// Iterates over bound values: positionals first, then flags, each in
    /// declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound names (not counting `inputArgs`).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the command declares nothing.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Binds invocation tokens against a node's schema.
///
/// `--help` and `--version` are handled by the caller and must not be
/// passed in.
///
/// # Errors
///
/// Returns a [`BindingError`] for unknown flags, missing values, unparsable
/// numbers or booleans, and missing required fields. At a node with
/// sub-commands and no positionals, a leftover positional token is reported
/// as [`BindingError::CommandNotFound`] before any required check.
pub fn bind<S: AsRef<str>>(
    node: &CommandNode,
    tokens: &[S],
) -> Result<BoundOptions, BindingError> {
    let mut supplied: IndexMap<&str, Value> = IndexMap::new();
    let mut positional_tokens: Vec<&str> = Vec::new();

    let mut iter = tokens.iter().map(|t| t.as_ref());
    while let Some(token) = iter.next() {
        if token == "--" {
            positional_tokens.extend(iter.by_ref());
            break;
        }

        let Some(raw) = flag_body(token) else {
            positional_tokens.push(token);
            continue;
        };

        let (switch_name, inline) = match raw.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (raw, None),
        };

        if let Some(flag) = node.find_flag(switch_name) {
            match flag.value_type {
                ValueType::Boolean => {
                    let value = match inline {
                        Some(text) => parse_bool(flag, text)?,
                        None => match iter.clone().next() {
                            Some(next @ ("true" | "false")) => {
                                iter.next();
                                next == "true"
                            }
                            _ => true,
                        },
                    };
                    supplied.insert(&flag.name, Value::Bool(value));
                }
                ValueType::Array => {
                    let text = take_value(flag, inline, &mut iter)?;
                    let entry = supplied
                        .entry(&flag.name)
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if let Value::Array(items) = entry {
                        items.push(Value::String(text.to_string()));
                    }
                }
                ValueType::Number => {
                    let text = take_value(flag, inline, &mut iter)?;
                    let number = parse_number(&flag.name, text)?;
                    supplied.insert(&flag.name, number);
                }
                ValueType::String => {
                    let text = take_value(flag, inline, &mut iter)?;
                    supplied.insert(&flag.name, Value::String(text.to_string()));
                }
            }
            continue;
        }

        // `--no-foo` negates a boolean `foo`.
        let negated = switch_name
            .strip_prefix("no-")
            .and_then(|name| node.find_flag(name))
            .filter(|flag| flag.value_type == ValueType::Boolean && inline.is_none());
        match negated {
            Some(flag) => {
                supplied.insert(&flag.name, Value::Bool(false));
            }
            None => return Err(BindingError::UnknownFlag(token.to_string())),
        }
    }

    if !node.children.is_empty() && node.positionals.is_empty() {
        if let Some(token) = positional_tokens.first() {
            return Err(BindingError::CommandNotFound(token.to_string()));
        }
    }

    let mut values = IndexMap::new();
    let mut remaining = positional_tokens.into_iter();

    for positional in &node.positionals {
        let value = if positional.rest {
            let items: Vec<Value> = remaining
                .by_ref()
                .map(|t| Value::String(t.to_string()))
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(Value::Array(items))
            }
        } else {
            remaining
                .next()
                .map(|text| parse_positional(positional, text))
                .transpose()?
        };
        let value = resolve(
            positional.required,
            positional.value_type,
            value,
            positional.default.as_ref(),
        )
        .ok_or_else(|| BindingError::MissingRequired(to_kebab_case(&positional.name)))?;
        values.insert(positional.name.clone(), value);
    }

    for flag in &node.flags {
        let value = resolve(
            flag.required,
            flag.value_type,
            supplied.shift_remove(flag.name.as_str()),
            flag.default.as_ref(),
        )
        .ok_or_else(|| BindingError::MissingRequired(switch(&flag.name)))?;
        values.insert(flag.name.clone(), value);
    }

    Ok(BoundOptions {
        values,
        input_args: remaining.map(str::to_string).collect(),
    })
}

/// Supplied value, else default, else the empty value; `None` when a
/// required field has neither.
fn resolve(
    required: bool,
    value_type: ValueType,
    supplied: Option<Value>,
    default: Option<&Value>,
) -> Option<Value> {
    match (supplied, default) {
        (Some(value), _) => Some(value),
        (None, Some(default)) => Some(default.clone()),
        (None, None) if required => None,
        (None, None) => Some(value_type.empty_value()),
    }
}

/// Strips the leading dashes of a flag token. Bare `-` and negative numbers
/// are positional.
fn flag_body(token: &str) -> Option<&str> {
    if let Some(body) = token.strip_prefix("--") {
        return (!body.is_empty()).then_some(body);
    }
    let body = token.strip_prefix('-')?;
    let first = body.chars().next()?;
    if first.is_ascii_digit() || first == '.' {
        return None;
    }
    Some(body)
}

fn take_value<'a>(
    flag: &FlagSpec,
    inline: Option<&'a str>,
    iter: &mut impl Iterator<Item = &'a str>,
) -> Result<&'a str, BindingError> {
    inline
        .or_else(|| iter.next())
        .ok_or_else(|| BindingError::MissingValue(switch(&flag.name)))
}

fn parse_bool(flag: &FlagSpec, text: &str) -> Result<bool, BindingError> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(BindingError::InvalidBoolean {
            name: switch(&flag.name),
            value: text.to_string(),
        }),
    }
}

fn parse_number(name: &str, text: &str) -> Result<Value, BindingError> {
    let invalid = || BindingError::InvalidNumber {
        name: to_kebab_case(name),
        value: text.to_string(),
    };

    if let Ok(int) = text.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(invalid)
}

fn parse_positional(positional: &PositionalSpec, text: &str) -> Result<Value, BindingError> {
    match positional.value_type {
        ValueType::Number => parse_number(&positional.name, text),
        ValueType::Boolean => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(BindingError::InvalidBoolean {
                name: to_kebab_case(&positional.name),
                value: text.to_string(),
            }),
        },
        ValueType::String | ValueType::Array => Ok(Value::String(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Action;

    fn flags_command() -> CommandNode {
        CommandNode::command("cli", Action::Echo(None))
            .with_flag(
                FlagSpec::new("stringArg", ValueType::String)
                    .with_default(json!("string"))
                    .required(),
            )
            .with_flag(FlagSpec::new("booleanArg", ValueType::Boolean).with_default(json!(false)))
            .with_flag(FlagSpec::new("numberArg", ValueType::Number).with_default(json!(0)))
            .with_flag(
                FlagSpec::new("arrayArg", ValueType::Array)
                    .with_default(json!(["a", "b", false, 0])),
            )
    }

    fn positional_command() -> CommandNode {
        CommandNode::command("cli", Action::Echo(None))
            .with_positional(PositionalSpec::new("message", ValueType::String).required())
            .with_positional(PositionalSpec::new("otherMessage", ValueType::String))
            .with_positional(PositionalSpec::rest("restMessages"))
    }

    fn bound_pairs(bound: &BoundOptions) -> Vec<(String, Value)> {
        bound.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_supplied_flags_override_defaults() {
        let bound = bind(
            &flags_command(),
            &[
                "--string-arg", "hello", "--boolean-arg", "--number-arg", "1", "--array-arg", "a",
                "--array-arg", "b",
            ],
        )
        .unwrap();

        assert_eq!(
            bound_pairs(&bound),
            vec![
                ("stringArg".to_string(), json!("hello")),
                ("booleanArg".to_string(), json!(true)),
                ("numberArg".to_string(), json!(1)),
                ("arrayArg".to_string(), json!(["a", "b"])),
            ]
        );
    }

    #[test]
    fn test_defaults_are_type_preserved() {
        let empty: [&str; 0] = [];
        let bound = bind(&flags_command(), &empty).unwrap();

        assert_eq!(bound.get("stringArg"), Some(&json!("string")));
        assert_eq!(bound.get("booleanArg"), Some(&json!(false)));
        assert_eq!(bound.get("numberArg"), Some(&json!(0)));
        assert_eq!(bound.get("arrayArg"), Some(&json!(["a", "b", false, 0])));
    }

    #[test]
    fn test_alias_binds_like_canonical() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_flag(FlagSpec::new("stream", ValueType::String).with_alias("s"))
            .with_flag(FlagSpec::new("newArg", ValueType::String).with_alias("oldArg"));

        let canonical = bind(&node, &["--stream", "yes", "--new-arg", "no"]).unwrap();
        let aliased = bind(&node, &["-s", "yes", "--old-arg", "no"]).unwrap();

        assert_eq!(canonical, aliased);
        assert_eq!(aliased.get("newArg"), Some(&json!("no")));
    }

    #[test]
    fn test_positionals_and_rest() {
        let bound = bind(&positional_command(), &["hello", "world", "something", "else"]).unwrap();

        assert_eq!(bound.get("message"), Some(&json!("hello")));
        assert_eq!(bound.get("otherMessage"), Some(&json!("world")));
        assert_eq!(bound.get("restMessages"), Some(&json!(["something", "else"])));
        assert!(bound.input_args().is_empty());
    }

    #[test]
    fn test_rest_is_empty_array_when_nothing_remains() {
        let bound = bind(&positional_command(), &["hello"]).unwrap();

        assert_eq!(bound.get("otherMessage"), Some(&Value::Null));
        assert_eq!(bound.get("restMessages"), Some(&json!([])));
    }

    #[test]
    fn test_missing_required_positional() {
        let empty: [&str; 0] = [];
        let err = bind(&positional_command(), &empty).unwrap_err();
        assert_eq!(err, BindingError::MissingRequired("message".into()));
    }

    #[test]
    fn test_missing_required_flag_without_default() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_flag(FlagSpec::new("token", ValueType::String).required());
        let empty: [&str; 0] = [];

        let err = bind(&node, &empty).unwrap_err();
        assert_eq!(err, BindingError::MissingRequired("--token".into()));
        assert_eq!(err.to_string(), "Missing required argument: --token");
    }

    #[test]
    fn test_extra_tokens_become_input_args() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_positional(PositionalSpec::new("first", ValueType::String));

        let bound = bind(&node, &["one", "two", "three"]).unwrap();
        assert_eq!(bound.input_args(), ["two", "three"]);
        assert_eq!(bound.value("inputArgs"), Some(json!(["two", "three"])));
    }

    #[test]
    fn test_double_dash_ends_flags() {
        let bound = bind(&positional_command(), &["--", "--not-a-flag", "x"]).unwrap();
        assert_eq!(bound.get("message"), Some(&json!("--not-a-flag")));
        assert_eq!(bound.get("otherMessage"), Some(&json!("x")));
    }

    #[test]
    fn test_inline_values_and_negation() {
        let bound = bind(
            &flags_command(),
            &["--string-arg=inline", "--no-boolean-arg", "--number-arg=-2.5"],
        )
        .unwrap();

        assert_eq!(bound.get("stringArg"), Some(&json!("inline")));
        assert_eq!(bound.get("booleanArg"), Some(&json!(false)));
        assert_eq!(bound.get("numberArg"), Some(&json!(-2.5)));
    }

    #[test]
    fn test_boolean_consumes_explicit_literal() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_flag(FlagSpec::new("force", ValueType::Boolean))
            .with_positional(PositionalSpec::new("target", ValueType::String));

        let bound = bind(&node, &["--force", "false", "prod"]).unwrap();
        assert_eq!(bound.get("force"), Some(&json!(false)));
        assert_eq!(bound.get("target"), Some(&json!("prod")));
    }

    #[test]
    fn test_value_flag_takes_dash_prefixed_value() {
        let bound = bind(&flags_command(), &["--number-arg", "-1"]).unwrap();
        assert_eq!(bound.get("numberArg"), Some(&json!(-1)));
    }

    #[test]
    fn test_binding_errors() {
        assert_eq!(
            bind(&flags_command(), &["--unknown"]).unwrap_err(),
            BindingError::UnknownFlag("--unknown".into())
        );
        assert_eq!(
            bind(&flags_command(), &["--string-arg"]).unwrap_err(),
            BindingError::MissingValue("--string-arg".into())
        );
        assert_eq!(
            bind(&flags_command(), &["--number-arg", "one"]).unwrap_err(),
            BindingError::InvalidNumber {
                name: "number-arg".into(),
                value: "one".into()
            }
        );
        assert_eq!(
            bind(&flags_command(), &["--boolean-arg=maybe"]).unwrap_err(),
            BindingError::InvalidBoolean {
                name: "--boolean-arg".into(),
                value: "maybe".into()
            }
        );
    }

    #[test]
    fn test_unknown_sub_command_wins_over_missing_required() {
        let node = CommandNode::command("with-index", Action::Echo(None))
            .with_flag(FlagSpec::new("token", ValueType::String).required())
            .with_child(CommandNode::command("c", Action::Echo(None)));

        assert_eq!(
            bind(&node, &["z"]).unwrap_err(),
            BindingError::CommandNotFound("z".into())
        );
        assert_eq!(
            bind(&node, &["--token", "t", "z"]).unwrap_err(),
            BindingError::CommandNotFound("z".into())
        );
        let empty: [&str; 0] = [];
        assert_eq!(
            bind(&node, &empty).unwrap_err(),
            BindingError::MissingRequired("--token".into())
        );
    }

    #[test]
    fn test_switch_matches_displayed_kebab_form() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_flag(FlagSpec::new("apiURL", ValueType::String));

        let kebab = bind(&node, &["--api-url", "x"]).unwrap();
        assert_eq!(kebab.get("apiURL"), Some(&json!("x")));
        assert_eq!(bind(&node, &["--apiURL", "x"]).unwrap(), kebab);
    }

    #[test]
    fn test_numeric_positional_and_negative_token() {
        let node = CommandNode::command("cli", Action::Echo(None))
            .with_positional(PositionalSpec::new("offset", ValueType::Number));

        let bound = bind(&node, &["-3"]).unwrap();
        assert_eq!(bound.get("offset"), Some(&json!(-3)));
    }
}
