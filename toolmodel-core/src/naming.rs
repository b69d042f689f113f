//! Deterministic identifier derivation.
//!
//! Enum members, field identifiers and nested model names are all derived
//! from source text. Two sources that derive the same identifier within one
//! scope are a [`BuildError::NamingCollision`], never a silent overwrite.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::errors::{BuildError, BuildResult};

/// Convert `read_file` / `user-name` / `userName` to `ReadFile` / `UserName`.
///
/// Letters and digits of any script are kept; text without any yields `""`.
#[must_use]
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for part in s.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Convert `userName` / `user-name` / `User Name` to `user_name`.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    if !s.is_empty() && !s.chars().any(char::is_alphanumeric) {
        return escape_symbols(s);
    }
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = c.is_lowercase() || c.is_numeric();
            out.extend(c.to_lowercase());
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    let trimmed = out.trim_end_matches('_');
    fix_leading_digit(trimmed)
}

/// Identifier of an enum member, derived from the string form of its value.
///
/// Strings contribute their text; other scalars their JSON text, so `1` and
/// `"1"` derive the same identifier. Text made only of symbols is escaped
/// code point by code point (`"+"` becomes `_u2b`).
#[must_use]
pub fn enum_member_ident(value: &JsonValue) -> String {
    let text = match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    if !text.is_empty() && !text.chars().any(char::is_alphanumeric) {
        return escape_symbols(&text);
    }
    let sanitized: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    fix_leading_digit(&sanitized)
}

fn escape_symbols(s: &str) -> String {
    s.chars().map(|c| format!("_u{:x}", u32::from(c))).collect()
}

fn fix_leading_digit(s: &str) -> String {
    match s.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{s}"),
        Some(_) => s.to_string(),
    }
}

/// Claims identifiers within one scope and reports clashes.
#[derive(Debug, Clone)]
pub struct IdentifierScope {
    scope: String,
    claimed: IndexMap<String, String>,
}

impl IdentifierScope {
    /// Create an empty scope; `scope` appears in collision errors.
    #[must_use]
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            claimed: IndexMap::new(),
        }
    }

    /// Claim `ident` for `source`.
    pub fn claim(&mut self, ident: &str, source: &str) -> BuildResult<()> {
        if let Some(existing) = self.claimed.get(ident) {
            return Err(BuildError::collision(
                &self.scope,
                ident,
                existing.as_str(),
                source,
            ));
        }
        self.claimed.insert(ident.to_string(), source.to_string());
        Ok(())
    }

    /// Number of claimed identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Check if nothing has been claimed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("read_file", "ReadFile")]
    #[case("user-name", "UserName")]
    #[case("userName", "UserName")]
    #[case("Address", "Address")]
    #[case("__x__", "X")]
    #[case("住所", "住所")]
    #[case("straße_name", "StraßeName")]
    #[case("--", "")]
    fn test_pascal_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_pascal_case(input), expected);
    }

    #[rstest]
    #[case("userName", "user_name")]
    #[case("user_name", "user_name")]
    #[case("User Name", "user_name")]
    #[case("HTTPServer", "httpserver")]
    #[case("2fa", "_2fa")]
    #[case("--", "_u2d_u2d")]
    #[case("名前", "名前")]
    #[case("ÄrgerLevel", "ärger_level")]
    fn test_snake_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_snake_case(input), expected);
    }

    #[rstest]
    #[case(json!("red"), "red")]
    #[case(json!("a-b"), "a_b")]
    #[case(json!(1), "_1")]
    #[case(json!("1"), "_1")]
    #[case(json!(true), "true")]
    #[case(json!(null), "null")]
    #[case(json!(""), "_")]
    #[case(json!("日本"), "日本")]
    #[case(json!("+"), "_u2b")]
    #[case(json!("-"), "_u2d")]
    fn test_enum_member_ident(#[case] value: JsonValue, #[case] expected: &str) {
        assert_eq!(enum_member_ident(&value), expected);
    }

    #[test]
    fn test_scope_reports_collision() {
        let mut scope = IdentifierScope::new("enum Color");
        scope.claim("a_b", "\"a-b\"").unwrap();
        let err = scope.claim("a_b", "\"a_b\"").unwrap_err();
        match err {
            BuildError::NamingCollision {
                scope,
                identifier,
                existing,
                incoming,
            } => {
                assert_eq!(scope, "enum Color");
                assert_eq!(identifier, "a_b");
                assert_eq!(existing, "\"a-b\"");
                assert_eq!(incoming, "\"a_b\"");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(scope.len(), 1);
    }
}
