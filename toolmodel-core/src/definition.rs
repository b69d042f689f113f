//! Compiled model definitions.
//!
//! A [`ModelDefinition`] is the named record type produced for one object
//! schema. Its fields carry concrete [`FieldType`]s; references to other
//! models are by name and resolve through the registry that built them.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::node::FieldSpec;
use crate::types::FieldType;

/// What a record does with keys it does not declare.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraPolicy {
    /// Drop them.
    Ignore,
    /// Keep them after checking them against the type.
    Allow(FieldType),
    /// Reject them.
    Forbid,
}

/// One field of a compiled model.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name as it appears on the wire.
    pub name: String,
    /// snake_case identifier derived from the name.
    pub ident: String,
    /// Semantic type, already widened to nullable where the policy says so.
    pub ty: FieldType,
    /// Whether the property was listed in `required`.
    pub required: bool,
    /// Value used when the property is absent.
    pub default: Option<JsonValue>,
    /// Property description, empty when absent.
    pub description: String,
}

impl Field {
    /// Apply the optionality policy to a mapped property.
    ///
    /// - explicit `default`: declared type, declared default
    /// - required without default: declared type, no default
    /// - optional without default: nullable type, `null` default
    pub(crate) fn from_spec(
        name: &str,
        ident: String,
        ty: FieldType,
        spec: &FieldSpec<'_>,
    ) -> Self {
        let (ty, default) = match (spec.required, spec.default) {
            (_, Some(default)) => (ty, Some(default.clone())),
            (true, None) => (ty, None),
            (false, None) => (ty.nullable(), Some(JsonValue::Null)),
        };
        Self {
            name: name.to_string(),
            ident,
            ty,
            required: spec.required,
            default,
            description: spec.description.to_string(),
        }
    }

    /// Whether construction fails when this field is absent.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.default.is_none()
    }

    /// Whether `null` is an acceptable value.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.ty.is_nullable()
    }
}

/// A compiled, named record type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    /// Model name; part of the model's identity.
    pub name: String,
    /// Schema description.
    pub description: Option<String>,
    /// Fields in source order.
    pub fields: IndexMap<String, Field>,
    /// Treatment of undeclared keys.
    pub extra: ExtraPolicy,
    /// The schema fragment this model was compiled from.
    pub schema: JsonValue,
    /// JSON pointer of the fragment within its document.
    pub origin: String,
}

impl ModelDefinition {
    /// A model with no declared fields that keeps every key it is given.
    #[must_use]
    pub fn open(name: impl Into<String>, schema: JsonValue) -> Self {
        Self {
            name: name.into(),
            description: schema
                .get("description")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            fields: IndexMap::new(),
            extra: ExtraPolicy::Allow(FieldType::Any),
            schema,
            origin: "#".to_string(),
        }
    }

    /// Look up a field by wire name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Field names in source order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields that must be supplied at construction time.
    pub fn mandatory_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().filter(|f| f.is_mandatory())
    }

    /// Names of every model referenced by this model's fields.
    #[must_use]
    pub fn referenced_models(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let extra = match &self.extra {
            ExtraPolicy::Allow(ty) => Some(ty),
            _ => None,
        };
        for ty in self.fields.values().map(|f| &f.ty).chain(extra) {
            for name in ty.referenced_models() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the model declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
