//! JSON Schema reconstruction from compiled models.
//!
//! The output describes what validation enforces, which may be narrower or
//! wider than the schema the model advertises. Every model other than the
//! root lands under `$defs`, keyed and titled by its name, so compiling the
//! rendered schema again yields the same models.

use indexmap::IndexMap;
use serde_json::{json, Map, Value as JsonValue};
use std::sync::Arc;

use crate::definition::{ExtraPolicy, Field, ModelDefinition};
use crate::resolver::join_pointer;
use crate::types::FieldType;

pub(crate) fn render(
    root: &ModelDefinition,
    models: &IndexMap<String, Arc<ModelDefinition>>,
) -> JsonValue {
    let renderer = Renderer { root: &root.name };
    let mut schema = renderer.record(root);

    let defs: Map<String, JsonValue> = models
        .values()
        .filter(|def| def.name != root.name)
        .map(|def| (def.name.clone(), JsonValue::Object(renderer.record(def))))
        .collect();
    if !defs.is_empty() {
        schema.insert("$defs".to_string(), JsonValue::Object(defs));
    }
    JsonValue::Object(schema)
}

struct Renderer<'r> {
    root: &'r str,
}

impl Renderer<'_> {
    fn record(&self, def: &ModelDefinition) -> Map<String, JsonValue> {
        let mut out = Map::new();
        out.insert("type".into(), json!("object"));
        out.insert("title".into(), json!(def.name));
        if let Some(description) = &def.description {
            out.insert("description".into(), json!(description));
        }

        let properties: Map<String, JsonValue> = def
            .fields
            .values()
            .map(|field| (field.name.clone(), self.field(field)))
            .collect();
        out.insert("properties".into(), JsonValue::Object(properties));

        let required: Vec<&str> = def
            .fields
            .values()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();
        if !required.is_empty() {
            out.insert("required".into(), json!(required));
        }

        match &def.extra {
            ExtraPolicy::Ignore => {}
            ExtraPolicy::Allow(FieldType::Any) => {
                out.insert("additionalProperties".into(), JsonValue::Bool(true));
            }
            ExtraPolicy::Allow(ty) => {
                out.insert("additionalProperties".into(), self.ty(ty));
            }
            ExtraPolicy::Forbid => {
                out.insert("additionalProperties".into(), JsonValue::Bool(false));
            }
        }
        out
    }

    fn field(&self, field: &Field) -> JsonValue {
        let mut out = match self.ty(&field.ty) {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        if !field.description.is_empty() {
            out.insert("description".into(), json!(field.description));
        }
        if let Some(default) = &field.default {
            out.insert("default".into(), default.clone());
        }
        JsonValue::Object(out)
    }

    fn ty(&self, ty: &FieldType) -> JsonValue {
        match ty {
            FieldType::Primitive(kind) => json!({"type": kind.as_str()}),
            FieldType::List(item) => json!({"type": "array", "items": self.ty(item)}),
            FieldType::Map(value) => {
                json!({"type": "object", "additionalProperties": self.ty(value)})
            }
            FieldType::MapOfAny => json!({"type": "object"}),
            FieldType::MapOfNothing => json!({"type": "object", "additionalProperties": false}),
            FieldType::Model(name) if name == self.root => json!({"$ref": "#"}),
            FieldType::Model(name) => json!({"$ref": join_pointer("#/$defs", name)}),
            FieldType::Enum(e) => json!({
                "title": e.name,
                "enum": e.values().cloned().collect::<Vec<_>>(),
            }),
            FieldType::Union(variants) => {
                json!({"anyOf": variants.iter().map(|v| self.ty(v)).collect::<Vec<_>>()})
            }
            FieldType::Nullable(inner) => {
                let mut variants = match inner.as_ref() {
                    FieldType::Union(variants) => variants.iter().map(|v| self.ty(v)).collect(),
                    other => vec![self.ty(other)],
                };
                variants.push(json!({"type": "null"}));
                json!({"anyOf": variants})
            }
            FieldType::Any => json!({}),
        }
    }
}
