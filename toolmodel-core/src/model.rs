//! The compiled, externally usable model.
//!
//! A [`ValidatingModel`] pairs the enforced side (the root
//! [`ModelDefinition`] plus every model it references) with the advertised
//! side (the JSON Schema shown to callers). The two usually agree, but they
//! are kept apart: a passthrough model enforces nothing while still
//! advertising its full schema.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use crate::definition::ModelDefinition;
use crate::errors::{ValidationError, ValidationErrors};
use crate::render;
use crate::validate::{json_type_name, Validator};

/// A compiled model that validates input and reports its schema.
///
/// Cheap to clone; definitions are shared.
#[derive(Debug, Clone)]
pub struct ValidatingModel {
    root: Arc<ModelDefinition>,
    models: Arc<IndexMap<String, Arc<ModelDefinition>>>,
    advertised: JsonValue,
    lax_integers: bool,
}

impl ValidatingModel {
    pub(crate) fn new(
        root: Arc<ModelDefinition>,
        models: IndexMap<String, Arc<ModelDefinition>>,
        lax_integers: bool,
    ) -> Self {
        Self {
            advertised: root.schema.clone(),
            root,
            models: Arc::new(models),
            lax_integers,
        }
    }

    /// A model that accepts any object and keeps every key, while still
    /// advertising `schema`.
    #[must_use]
    pub fn passthrough(name: impl Into<String>, schema: JsonValue) -> Self {
        let root = Arc::new(ModelDefinition::open(name, schema));
        let mut models = IndexMap::new();
        models.insert(root.name.clone(), Arc::clone(&root));
        Self::new(root, models, true)
    }

    /// Replace the advertised schema. The enforced fields are unchanged.
    #[must_use]
    pub fn with_advertised_schema(mut self, schema: JsonValue) -> Self {
        self.advertised = schema;
        self
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.root.name
    }

    /// The root definition.
    #[must_use]
    pub fn definition(&self) -> &ModelDefinition {
        &self.root
    }

    /// Look up any model compiled alongside the root.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.get(name).map(AsRef::as_ref)
    }

    /// Every compiled model, root included, in reservation order.
    pub fn models(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.values().map(AsRef::as_ref)
    }

    /// The advertised schema.
    #[must_use]
    pub fn schema(&self) -> &JsonValue {
        &self.advertised
    }

    /// A JSON Schema rebuilt from what is actually enforced.
    #[must_use]
    pub fn enforced_schema(&self) -> JsonValue {
        render::render(&self.root, &self.models)
    }

    /// Validate `values` and build an instance.
    ///
    /// Every violation is reported, not only the first one.
    pub fn construct(&self, values: &Map<String, JsonValue>) -> Result<Instance, ValidationErrors> {
        let mut validator = Validator::new(&self.models, self.lax_integers);
        let checked = validator.check_record(&self.root, values, "");
        let errors = validator.into_errors();
        if !errors.is_empty() {
            tracing::debug!(model = %self.root.name, errors = errors.len(), "Validation failed");
            return Err(ValidationErrors::new(self.root.name.clone(), errors));
        }
        Ok(Instance {
            model: self.root.name.clone(),
            values: checked,
            supplied: values.keys().cloned().collect(),
        })
    }

    /// Validate an arbitrary value; anything but an object is a type mismatch.
    pub fn validate(&self, value: &JsonValue) -> Result<Instance, ValidationErrors> {
        match value {
            JsonValue::Object(map) => self.construct(map),
            other => Err(ValidationErrors::new(
                self.root.name.clone(),
                vec![ValidationError::TypeMismatch {
                    path: "$".to_string(),
                    expected: "object".to_string(),
                    actual: json_type_name(other).to_string(),
                }],
            )),
        }
    }
}

/// A validated value of a [`ValidatingModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    model: String,
    values: Map<String, JsonValue>,
    supplied: Vec<String>,
}

impl Instance {
    /// Name of the model this instance was built from.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Get a field value (defaults applied).
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.values.get(field)
    }

    /// All values with defaults applied.
    #[must_use]
    pub fn values(&self) -> &Map<String, JsonValue> {
        &self.values
    }

    /// Consume into a JSON object.
    #[must_use]
    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.values)
    }

    /// The keys the caller actually supplied, checked and normalized.
    ///
    /// Defaults filled in for absent fields are left out, as are undeclared
    /// keys the model drops.
    #[must_use]
    pub fn into_arguments(self) -> Map<String, JsonValue> {
        let supplied = self.supplied;
        self.values
            .into_iter()
            .filter(|(key, _)| supplied.contains(key))
            .collect()
    }

    /// Deserialize into a concrete type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(JsonValue::Object(self.values.clone()))
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationErrorKind;
    use crate::{compile, compile_with, CompileOptions, UndeclaredFields};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    fn object(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_required_and_optional_policy() {
        let schema = json!({
            "type": "object",
            "properties": {"x": {"type": "string"}, "y": {"type": "integer"}},
            "required": ["x"]
        });
        let model = compile(&schema, "Point").unwrap();

        let instance = model.construct(&object(json!({"x": "a"}))).unwrap();
        assert_eq!(instance.get("x"), Some(&json!("a")));
        assert_eq!(instance.get("y"), Some(&JsonValue::Null));

        let errors = model.construct(&Map::new()).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ValidationError::MissingRequiredField { path: "x".into() }]
        );
    }

    #[test]
    fn test_enum_field() {
        let schema = json!({
            "type": "object",
            "properties": {"letter": {"enum": ["a", "b", "c"]}},
            "required": ["letter"]
        });
        let model = compile(&schema, "Pick").unwrap();
        assert!(model.construct(&object(json!({"letter": "b"}))).is_ok());

        let errors = model.construct(&object(json!({"letter": "z"}))).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.count(ValidationErrorKind::TypeMismatch), 1);
    }

    #[test]
    fn test_map_and_record_fields() {
        let schema = json!({
            "type": "object",
            "properties": {
                "counts": {"type": "object", "additionalProperties": {"type": "integer"}},
                "inner": {
                    "type": "object",
                    "properties": {"n": {"type": "integer"}},
                    "additionalProperties": false
                }
            }
        });
        let model = compile(&schema, "Stats").unwrap();

        let ok = json!({"counts": {"a": 1, "b": 2}, "inner": {"n": 3}});
        assert!(model.construct(&object(ok)).is_ok());

        let bad = json!({"counts": {"a": "one"}, "inner": {"n": 3, "m": 4}});
        let errors = model.construct(&object(bad)).unwrap_err();
        let paths: Vec<_> = errors.iter().map(ValidationError::path).collect();
        assert_eq!(paths, vec!["counts.a", "inner.m"]);
        assert_eq!(errors.count(ValidationErrorKind::UnexpectedField), 1);
    }

    #[test]
    fn test_fail_slow_collects_nested_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "tags": {"type": "array", "items": {"type": "string"}},
                "owner": {"$ref": "#/$defs/User"}
            },
            "required": ["name", "owner"],
            "$defs": {
                "User": {
                    "type": "object",
                    "properties": {"id": {"type": "integer"}},
                    "required": ["id"]
                }
            }
        });
        let model = compile(&schema, "Repo").unwrap();
        let errors = model
            .construct(&object(json!({"tags": ["ok", 7], "owner": {}})))
            .unwrap_err();

        assert_eq!(
            errors.errors(),
            &[
                ValidationError::MissingRequiredField { path: "name".into() },
                ValidationError::TypeMismatch {
                    path: "tags[1]".into(),
                    expected: "string".into(),
                    actual: "integer".into(),
                },
                ValidationError::MissingRequiredField {
                    path: "owner.id".into()
                },
            ]
        );
        assert!(errors.to_string().starts_with("3 validation errors for Repo"));
    }

    #[test]
    fn test_nested_defaults_are_applied() {
        let schema = json!({
            "type": "object",
            "properties": {
                "config": {
                    "type": "object",
                    "properties": {"depth": {"type": "integer", "default": 2}}
                }
            }
        });
        let model = compile(&schema, "Job").unwrap();
        let instance = model.construct(&object(json!({"config": {}}))).unwrap();
        assert_eq!(instance.get("config"), Some(&json!({"depth": 2})));
    }

    #[test]
    fn test_validate_rejects_non_objects() {
        let model = compile(&json!({"type": "object"}), "Empty").unwrap();
        let errors = model.validate(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ValidationError::TypeMismatch {
                path: "$".into(),
                expected: "object".into(),
                actual: "array".into(),
            }]
        );
    }

    #[test]
    fn test_undeclared_keys_follow_policy() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "string"}}});
        let input = object(json!({"a": "x", "b": 1}));

        let ignoring = compile(&schema, "M").unwrap();
        let instance = ignoring.construct(&input).unwrap();
        assert_eq!(instance.get("b"), None);

        let options = CompileOptions::new().default_extra(UndeclaredFields::Allow);
        let allowing = compile_with(&schema, "M", &options).unwrap();
        assert_eq!(allowing.construct(&input).unwrap().get("b"), Some(&json!(1)));

        let options = CompileOptions::new().default_extra(UndeclaredFields::Forbid);
        let forbidding = compile_with(&schema, "M", &options).unwrap();
        let errors = forbidding.construct(&input).unwrap_err();
        assert_eq!(errors.errors(), &[ValidationError::UnexpectedField { path: "b".into() }]);
    }

    #[test]
    fn test_into_arguments_skips_filled_defaults() {
        let schema = json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "limit": {"type": "integer", "default": 10},
                "cursor": {"type": "string"}
            },
            "required": ["query"]
        });
        let model = compile(&schema, "Search").unwrap();
        let instance = model.construct(&object(json!({"query": "rust"}))).unwrap();

        assert_eq!(instance.values().len(), 3);
        assert_eq!(instance.into_arguments(), object(json!({"query": "rust"})));
    }

    #[test]
    fn test_deserialize_into_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Search {
            query: String,
            limit: i64,
        }

        let schema = json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "limit": {"type": "integer", "default": 10}
            },
            "required": ["query"]
        });
        let model = compile(&schema, "Search").unwrap();
        let instance = model.construct(&object(json!({"query": "rust"}))).unwrap();
        assert_eq!(
            instance.deserialize::<Search>().unwrap(),
            Search {
                query: "rust".into(),
                limit: 10
            }
        );
        assert_eq!(serde_json::to_value(&instance).unwrap(), json!({"query": "rust", "limit": 10}));
    }

    #[test]
    fn test_passthrough_enforces_nothing() {
        let advertised = json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"]
        });
        let model = ValidatingModel::passthrough("read_file", advertised.clone());

        assert_eq!(model.schema(), &advertised);
        assert!(model.definition().is_empty());
        let instance = model.construct(&object(json!({"anything": [1]}))).unwrap();
        assert_eq!(instance.into_arguments(), object(json!({"anything": [1]})));
    }

    #[test]
    fn test_advertised_schema_can_diverge() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        let model = compile(&schema, "M")
            .unwrap()
            .with_advertised_schema(json!({"type": "object"}));
        assert_eq!(model.schema(), &json!({"type": "object"}));
        assert_eq!(model.definition().len(), 1);
    }

    #[test]
    fn test_model_lookup() {
        let schema = json!({
            "type": "object",
            "properties": {"b": {"$ref": "#/$defs/B"}},
            "$defs": {"B": {"type": "object", "properties": {"v": {"type": "number"}}}}
        });
        let model = compile(&schema, "A").unwrap();
        assert_eq!(model.name(), "A");
        assert!(model.model("B").is_some());
        let names: Vec<_> = model.models().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
