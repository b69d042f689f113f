//! Mapping of schema nodes to field types.
//!
//! The mapper never builds nested models itself. Whenever a node needs its
//! own model (an inline record or a `$ref` to one) it returns
//! [`FieldType::Model`] with the model's name and records a
//! [`PendingModel`] for the builder to materialize.

use serde_json::Value as JsonValue;

use crate::errors::{BuildError, BuildResult};
use crate::naming::{enum_member_ident, IdentifierScope};
use crate::node::{ObjectNode, PrimitiveKind, SchemaNode};
use crate::options::CompileOptions;
use crate::resolver::{definition_key, resolve};
use crate::types::{EnumMember, EnumType, FieldType};

/// A record the mapper referenced but did not build.
#[derive(Debug, Clone)]
pub struct PendingModel<'a> {
    /// Name the model will be registered under.
    pub name: String,
    /// The record to build.
    pub node: ObjectNode<'a>,
    /// JSON pointer of the record, for diagnostics.
    pub origin: String,
}

/// Maps [`SchemaNode`]s to [`FieldType`]s.
#[derive(Debug)]
pub struct TypeMapper<'a, 'o> {
    document: &'a JsonValue,
    options: &'o CompileOptions,
    root_name: Option<String>,
    root_schema: Option<&'a JsonValue>,
    pending: Vec<PendingModel<'a>>,
    aliases: Vec<String>,
}

impl<'a, 'o> TypeMapper<'a, 'o> {
    /// Create a mapper over `document`.
    #[must_use]
    pub fn new(document: &'a JsonValue, options: &'o CompileOptions) -> Self {
        Self {
            document,
            options,
            root_name: None,
            root_schema: None,
            pending: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Name `$ref: "#"` pointers resolve to.
    #[must_use]
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    /// Record the root's schema, so that other records sharing the root's
    /// name can be told apart from it.
    #[must_use]
    pub fn with_root_schema(mut self, schema: &'a JsonValue) -> Self {
        self.root_schema = Some(schema);
        self
    }

    /// Map a node. `hint` names inline models and enums that carry no title.
    pub fn map(&mut self, node: &SchemaNode<'a>, hint: &str) -> BuildResult<FieldType> {
        match node {
            SchemaNode::Ref { pointer } => self.map_ref(pointer, hint),
            SchemaNode::Enum { values, title } => {
                map_enum(values, title.map_or(hint, |t| t)).map(FieldType::Enum)
            }
            SchemaNode::Union { variants } => self.map_union(variants, hint),
            SchemaNode::Unknown => Ok(FieldType::Any),
            SchemaNode::Array { items } => {
                let item = match items {
                    Some(items) => self.map(items, &format!("{hint}Item"))?,
                    None => FieldType::Any,
                };
                Ok(FieldType::List(Box::new(item)))
            }
            SchemaNode::Map { value } => Ok(FieldType::Map(Box::new(
                self.map(value, &format!("{hint}Value"))?,
            ))),
            SchemaNode::OpenMap => Ok(FieldType::MapOfAny),
            SchemaNode::ClosedMap => Ok(FieldType::MapOfNothing),
            SchemaNode::Object(obj) => {
                let name = self.scoped(obj.title.unwrap_or(hint).to_string(), obj.raw);
                self.defer(name.clone(), obj.clone(), format!("<inline {name}>"));
                Ok(FieldType::Model(name))
            }
            SchemaNode::Primitive(kind) => Ok(FieldType::Primitive(*kind)),
        }
    }

    /// Take the models recorded since the last call.
    pub fn take_pending(&mut self) -> Vec<PendingModel<'a>> {
        std::mem::take(&mut self.pending)
    }

    fn defer(&mut self, name: String, node: ObjectNode<'a>, origin: String) {
        self.pending.push(PendingModel { name, node, origin });
    }

    fn map_ref(&mut self, pointer: &str, hint: &str) -> BuildResult<FieldType> {
        if pointer == "#" {
            if let Some(root) = &self.root_name {
                return Ok(FieldType::Model(root.clone()));
            }
        }

        let fragment = resolve(self.document, pointer)?;
        let target = SchemaNode::parse(fragment, pointer)?;

        if let SchemaNode::Object(obj) = target {
            let name = self.scoped(self.ref_model_name(pointer, obj.title), obj.raw);
            self.defer(name.clone(), obj, pointer.to_string());
            return Ok(FieldType::Model(name));
        }

        // Alias to a non-record fragment: inline its type.
        if self.aliases.iter().any(|p| p == pointer) {
            return Err(BuildError::unsupported(
                pointer,
                "reference cycle through non-object schemas",
            ));
        }
        let alias_hint = fragment
            .get("title")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .or_else(|| definition_key(pointer))
            .unwrap_or_else(|| hint.to_string());
        self.aliases.push(pointer.to_string());
        let mapped = self.map(&target, &alias_hint);
        self.aliases.pop();
        mapped
    }

    fn ref_model_name(&self, pointer: &str, title: Option<&str>) -> String {
        title
            .map(str::to_string)
            .or_else(|| definition_key(pointer))
            .unwrap_or_else(|| self.options.placeholder_name.clone())
    }

    fn scoped(&self, name: String, fragment: &JsonValue) -> String {
        let root = self.root_name.as_deref().zip(self.root_schema);
        non_root_name(name, fragment, root)
    }

    fn map_union(&mut self, variants: &[SchemaNode<'a>], hint: &str) -> BuildResult<FieldType> {
        let mut nullable = false;
        let mut members = Vec::with_capacity(variants.len());

        for (i, variant) in variants.iter().enumerate() {
            match self.map(variant, &format!("{hint}Variant{i}"))? {
                FieldType::Primitive(PrimitiveKind::Null) => nullable = true,
                FieldType::Nullable(inner) => {
                    nullable = true;
                    members.push(*inner);
                }
                other => members.push(other),
            }
        }

        let ty = match members.len() {
            0 => return Ok(FieldType::Primitive(PrimitiveKind::Null)),
            1 => members.remove(0),
            _ => FieldType::Union(members),
        };
        Ok(if nullable { ty.nullable() } else { ty })
    }
}

/// Name for a record other than the root.
///
/// A record whose derived name equals the root's but whose schema differs is
/// renamed `{name}Def`.
pub(crate) fn non_root_name(
    name: String,
    fragment: &JsonValue,
    root: Option<(&str, &JsonValue)>,
) -> String {
    match root {
        Some((root_name, root_schema)) if name == root_name && fragment != root_schema => {
            format!("{name}Def")
        }
        _ => name,
    }
}

fn map_enum(values: &[JsonValue], name: &str) -> BuildResult<EnumType> {
    let mut scope = IdentifierScope::new(format!("enum {name}"));
    let mut members = Vec::with_capacity(values.len());
    for value in values {
        let ident = enum_member_ident(value);
        scope.claim(&ident, &value.to_string())?;
        members.push(EnumMember {
            ident,
            value: value.clone(),
        });
    }
    Ok(EnumType {
        name: name.to_string(),
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map_with(document: &JsonValue, fragment: &JsonValue) -> BuildResult<(FieldType, Vec<String>)> {
        let options = CompileOptions::default();
        let mut mapper = TypeMapper::new(document, &options);
        let node = SchemaNode::parse(fragment, "#/properties/field")?;
        let ty = mapper.map(&node, "ModelField")?;
        let pending = mapper.take_pending().into_iter().map(|p| p.name).collect();
        Ok((ty, pending))
    }

    fn map(fragment: JsonValue) -> FieldType {
        map_with(&json!({}), &fragment).unwrap().0
    }

    fn prim(kind: PrimitiveKind) -> FieldType {
        FieldType::Primitive(kind)
    }

    #[test]
    fn test_primitives() {
        assert_eq!(map(json!({"type": "string"})), prim(PrimitiveKind::String));
        assert_eq!(map(json!({"type": "integer"})), prim(PrimitiveKind::Integer));
        assert_eq!(map(json!({"type": "number"})), prim(PrimitiveKind::Number));
        assert_eq!(map(json!({"type": "boolean"})), prim(PrimitiveKind::Boolean));
        assert_eq!(map(json!({"type": "null"})), prim(PrimitiveKind::Null));
        assert_eq!(map(json!({"type": "date"})), FieldType::Any);
        assert_eq!(map(json!({})), FieldType::Any);
    }

    #[test]
    fn test_any_of_null_flattening() {
        let ty = map(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}));
        assert_eq!(ty, FieldType::Nullable(Box::new(prim(PrimitiveKind::String))));
    }

    #[test]
    fn test_any_of_preserves_order() {
        let ty = map(json!({"anyOf": [
            {"type": "integer"},
            {"type": "null"},
            {"type": "string"}
        ]}));
        assert_eq!(
            ty,
            FieldType::Nullable(Box::new(FieldType::Union(vec![
                prim(PrimitiveKind::Integer),
                prim(PrimitiveKind::String),
            ])))
        );
    }

    #[test]
    fn test_any_of_only_null() {
        assert_eq!(map(json!({"anyOf": [{"type": "null"}]})), prim(PrimitiveKind::Null));
    }

    #[test]
    fn test_enum_members_in_source_order() {
        let FieldType::Enum(e) = map(json!({"enum": ["a", "b", "c"]})) else {
            panic!("expected enum");
        };
        assert_eq!(e.name, "ModelField");
        let idents: Vec<_> = e.members.iter().map(|m| m.ident.as_str()).collect();
        assert_eq!(idents, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_enum_collision_is_an_error() {
        let err = map_with(&json!({}), &json!({"enum": ["a-b", "a_b"]})).unwrap_err();
        assert!(err.is_naming_collision());
        let err = map_with(&json!({}), &json!({"enum": [1, "1"]})).unwrap_err();
        assert!(err.is_naming_collision());
    }

    #[test]
    fn test_arrays_and_maps() {
        assert_eq!(
            map(json!({"type": "array", "items": {"type": "string"}})),
            FieldType::List(Box::new(prim(PrimitiveKind::String)))
        );
        assert_eq!(
            map(json!({"type": "array"})),
            FieldType::List(Box::new(FieldType::Any))
        );
        assert_eq!(
            map(json!({"type": "object", "additionalProperties": {"type": "integer"}})),
            FieldType::Map(Box::new(prim(PrimitiveKind::Integer)))
        );
        assert_eq!(map(json!({"type": "object"})), FieldType::MapOfAny);
        assert_eq!(
            map(json!({"type": "object", "additionalProperties": false})),
            FieldType::MapOfNothing
        );
    }

    #[test]
    fn test_inline_record_is_deferred() {
        let fragment = json!({
            "type": "object",
            "properties": {"city": {"type": "string"}}
        });
        let (ty, pending) = map_with(&json!({}), &fragment).unwrap();
        assert_eq!(ty, FieldType::Model("ModelField".to_string()));
        assert_eq!(pending, vec!["ModelField".to_string()]);
    }

    #[test]
    fn test_ref_to_record_uses_title_then_key() {
        let doc = json!({"$defs": {
            "Addr": {"title": "Address", "type": "object", "properties": {}},
            "Point": {"type": "object", "properties": {"x": {"type": "number"}}}
        }});
        let (ty, pending) = map_with(&doc, &json!({"$ref": "#/$defs/Addr"})).unwrap();
        assert_eq!(ty, FieldType::Model("Address".to_string()));
        assert_eq!(pending, vec!["Address".to_string()]);

        let (ty, _) = map_with(&doc, &json!({"$ref": "#/$defs/Point"})).unwrap();
        assert_eq!(ty, FieldType::Model("Point".to_string()));
    }

    #[test]
    fn test_ref_without_title_or_key_uses_placeholder() {
        let doc = json!({"properties": {"inner": {"type": "object", "properties": {}}}});
        let (ty, _) = map_with(&doc, &json!({"$ref": "#/properties/inner"})).unwrap();
        assert_eq!(ty, FieldType::Model("UntitledModel".to_string()));
    }

    #[test]
    fn test_ref_to_enum_is_inlined() {
        let doc = json!({"$defs": {"Color": {"enum": ["red", "green"]}}});
        let (ty, pending) = map_with(&doc, &json!({"$ref": "#/$defs/Color"})).unwrap();
        let FieldType::Enum(e) = ty else {
            panic!("expected enum");
        };
        assert_eq!(e.name, "Color");
        assert!(pending.is_empty());
    }

    #[test]
    fn test_any_of_with_ref_yields_forward_reference() {
        let doc = json!({"$defs": {"Node": {"type": "object", "properties": {}}}});
        let (ty, pending) = map_with(
            &doc,
            &json!({"anyOf": [{"$ref": "#/$defs/Node"}, {"type": "null"}]}),
        )
        .unwrap();
        assert_eq!(
            ty,
            FieldType::Nullable(Box::new(FieldType::Model("Node".to_string())))
        );
        assert_eq!(pending, vec!["Node".to_string()]);
    }

    #[test]
    fn test_alias_cycle_is_rejected() {
        let doc = json!({"$defs": {"A": {"$ref": "#/$defs/B"}, "B": {"$ref": "#/$defs/A"}}});
        let err = map_with(&doc, &json!({"$ref": "#/$defs/A"})).unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedSchemaConstruct { .. }));
    }

    #[test]
    fn test_unresolved_ref() {
        let err = map_with(&json!({}), &json!({"$ref": "#/$defs/Missing"})).unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnresolvedReference { segment: Some(ref s), .. } if s == "$defs"
        ));
    }
}
