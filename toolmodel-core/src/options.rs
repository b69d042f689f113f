//! Compilation options.
//!
//! This module provides the `CompileOptions` type for tuning how schemas are
//! turned into model definitions and how strictly instances are checked.

use serde::{Deserialize, Serialize};

/// Placeholder model name for referenced fragments that carry no title.
pub const DEFAULT_PLACEHOLDER_NAME: &str = "UntitledModel";

/// How a record treats keys it does not declare when the schema says nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeclaredFields {
    /// Drop undeclared keys from the constructed instance.
    #[default]
    Ignore,
    /// Keep undeclared keys untouched.
    Allow,
    /// Report undeclared keys as validation errors.
    Forbid,
}

/// Options for schema compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Name used for `$ref` targets that have neither a title nor a
    /// definitions key.
    pub placeholder_name: String,

    /// Build every record in `$defs` / `definitions` before the root.
    pub eager_definitions: bool,

    /// Policy for undeclared keys when `additionalProperties` is absent.
    pub default_extra: UndeclaredFields,

    /// Accept integral floats such as `1.0` where an integer is expected.
    pub lax_integers: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            placeholder_name: DEFAULT_PLACEHOLDER_NAME.to_string(),
            eager_definitions: true,
            default_extra: UndeclaredFields::Ignore,
            lax_integers: true,
        }
    }
}

impl CompileOptions {
    /// Create options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder model name.
    #[must_use]
    pub fn placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = name.into();
        self
    }

    /// Enable or disable eager building of definitions.
    #[must_use]
    pub fn eager_definitions(mut self, eager: bool) -> Self {
        self.eager_definitions = eager;
        self
    }

    /// Set the policy for undeclared keys.
    #[must_use]
    pub fn default_extra(mut self, policy: UndeclaredFields) -> Self {
        self.default_extra = policy;
        self
    }

    /// Enable or disable lax integer checks.
    #[must_use]
    pub fn lax_integers(mut self, lax: bool) -> Self {
        self.lax_integers = lax;
        self
    }

    /// Build options from a JSON value, filling gaps with defaults.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
