//! Value checking against compiled field types.
//!
//! The walk never stops at the first problem: every violation is recorded
//! with its path and the walk continues, so one pass reports everything.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use crate::definition::{ExtraPolicy, ModelDefinition};
use crate::errors::ValidationError;
use crate::node::PrimitiveKind;
use crate::types::FieldType;

pub(crate) struct Validator<'m> {
    models: &'m IndexMap<String, Arc<ModelDefinition>>,
    lax_integers: bool,
    errors: Vec<ValidationError>,
}

impl<'m> Validator<'m> {
    pub(crate) fn new(
        models: &'m IndexMap<String, Arc<ModelDefinition>>,
        lax_integers: bool,
    ) -> Self {
        Self {
            models,
            lax_integers,
            errors: Vec::new(),
        }
    }

    pub(crate) fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Check a record, returning it with defaults applied and ignored keys
    /// dropped.
    pub(crate) fn check_record(
        &mut self,
        def: &ModelDefinition,
        values: &Map<String, JsonValue>,
        path: &str,
    ) -> Map<String, JsonValue> {
        let mut out = Map::new();

        for field in def.fields.values() {
            let field_path = child_path(path, &field.name);
            match values.get(&field.name) {
                Some(value) => {
                    let checked = self.check(&field.ty, value, &field_path);
                    out.insert(field.name.clone(), checked);
                }
                None => match &field.default {
                    Some(default) => {
                        out.insert(field.name.clone(), default.clone());
                    }
                    None => self
                        .errors
                        .push(ValidationError::MissingRequiredField { path: field_path }),
                },
            }
        }

        for (key, value) in values {
            if def.fields.contains_key(key) {
                continue;
            }
            match &def.extra {
                ExtraPolicy::Ignore => {
                    tracing::debug!(model = %def.name, field = %key, "Dropping undeclared field");
                }
                ExtraPolicy::Allow(ty) => {
                    let checked = self.check(ty, value, &child_path(path, key));
                    out.insert(key.clone(), checked);
                }
                ExtraPolicy::Forbid => self.errors.push(ValidationError::UnexpectedField {
                    path: child_path(path, key),
                }),
            }
        }

        out
    }

    /// Check one value, returning it normalized (nested defaults applied).
    pub(crate) fn check(&mut self, ty: &FieldType, value: &JsonValue, path: &str) -> JsonValue {
        match ty {
            FieldType::Any => value.clone(),
            FieldType::Primitive(kind) => {
                if !self.primitive_matches(*kind, value) {
                    self.mismatch(path, kind.as_str(), value);
                }
                value.clone()
            }
            FieldType::Nullable(inner) => {
                if value.is_null() {
                    JsonValue::Null
                } else {
                    self.check(inner, value, path)
                }
            }
            FieldType::List(item) => match value.as_array() {
                Some(items) => JsonValue::Array(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, v)| self.check(item, v, &format!("{path}[{i}]")))
                        .collect(),
                ),
                None => {
                    self.mismatch(path, &ty.to_string(), value);
                    value.clone()
                }
            },
            FieldType::Map(inner) => match value.as_object() {
                Some(map) => JsonValue::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), self.check(inner, v, &child_path(path, k))))
                        .collect(),
                ),
                None => {
                    self.mismatch(path, &ty.to_string(), value);
                    value.clone()
                }
            },
            FieldType::MapOfAny => {
                if !value.is_object() {
                    self.mismatch(path, &ty.to_string(), value);
                }
                value.clone()
            }
            FieldType::MapOfNothing => {
                match value.as_object() {
                    Some(map) => {
                        for key in map.keys() {
                            self.errors.push(ValidationError::UnexpectedField {
                                path: child_path(path, key),
                            });
                        }
                    }
                    None => self.mismatch(path, &ty.to_string(), value),
                }
                value.clone()
            }
            FieldType::Enum(e) => {
                if !e.contains(value) {
                    self.errors.push(ValidationError::TypeMismatch {
                        path: display_path(path),
                        expected: e.to_string(),
                        actual: value.to_string(),
                    });
                }
                value.clone()
            }
            FieldType::Model(name) => {
                let Some(def) = self.models.get(name) else {
                    self.mismatch(path, &format!("model {name}"), value);
                    return value.clone();
                };
                match value.as_object() {
                    Some(map) => JsonValue::Object(self.check_record(def, map, path)),
                    None => {
                        self.mismatch(path, name, value);
                        value.clone()
                    }
                }
            }
            FieldType::Union(variants) => {
                for variant in variants {
                    let mut trial = Validator::new(self.models, self.lax_integers);
                    let checked = trial.check(variant, value, path);
                    if trial.errors.is_empty() {
                        return checked;
                    }
                }
                self.errors.push(ValidationError::UnionNoVariantMatched {
                    path: display_path(path),
                    expected: variants.iter().map(ToString::to_string).collect(),
                });
                value.clone()
            }
        }
    }

    fn primitive_matches(&self, kind: PrimitiveKind, value: &JsonValue) -> bool {
        match kind {
            PrimitiveKind::String => value.is_string(),
            PrimitiveKind::Number => value.is_number(),
            PrimitiveKind::Boolean => value.is_boolean(),
            PrimitiveKind::Null => value.is_null(),
            PrimitiveKind::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || (self.lax_integers
                        && value
                            .as_f64()
                            .is_some_and(|f| f.is_finite() && f.fract() == 0.0))
            }
        }
    }

    fn mismatch(&mut self, path: &str, expected: &str, value: &JsonValue) {
        self.errors.push(ValidationError::TypeMismatch {
            path: display_path(path),
            expected: expected.to_string(),
            actual: json_type_name(value).to_string(),
        });
    }
}

/// JSON type name of a value, distinguishing integers from other numbers.
pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}
