//! Name conversions between file names, command-line spellings and keys.
//!
//! Commands and flags are addressed internally by camelCase keys
//! (`stringArg`) and displayed in kebab-case (`--string-arg`).

/// Converts a name to kebab-case.
///
/// # Examples
///
/// ```
/// use command_tree_core::naming::to_kebab_case;
///
/// assert_eq!(to_kebab_case("stringArg"), "string-arg");
/// assert_eq!(to_kebab_case("without-index"), "without-index");
/// assert_eq!(to_kebab_case("with_index"), "with-index");
/// ```
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Converts a name to camelCase.
///
/// # Examples
///
/// ```
/// use command_tree_core::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("string-arg"), "stringArg");
/// assert_eq!(to_camel_case("otherMessage"), "otherMessage");
/// assert_eq!(to_camel_case("s"), "s");
/// ```
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Returns the command-line switch for a flag key: `-s` for single
/// characters, `--kebab-name` otherwise.
pub fn switch(key: &str) -> String {
    let kebab = to_kebab_case(key);
    if kebab.chars().count() == 1 {
        format!("-{kebab}")
    } else {
        format!("--{kebab}")
    }
}
