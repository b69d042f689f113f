//! Typed view of raw JSON Schema fragments.
//!
//! A [`SchemaNode`] borrows from the document it was parsed from, so parsing
//! never copies schema text. Exactly one variant is active per node, chosen by
//! keyword precedence: `$ref`, then `enum`, then `anyOf`, then `type`.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;

use crate::errors::{BuildError, BuildResult};
use crate::resolver::join_pointer;

/// Primitive JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `"string"`
    String,
    /// `"integer"`
    Integer,
    /// `"number"`
    Number,
    /// `"boolean"`
    Boolean,
    /// `"null"`
    Null,
}

impl PrimitiveKind {
    /// Look up a primitive by its JSON Schema type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// The JSON Schema type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `additionalProperties` keyword of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties<'a> {
    /// Keyword not present.
    Absent,
    /// `true`
    Allowed,
    /// `false`
    Forbidden,
    /// A schema every undeclared value must satisfy.
    Schema(Box<SchemaNode<'a>>),
}

/// One entry of an object's `properties`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec<'a> {
    /// Parsed schema of the property.
    pub node: SchemaNode<'a>,
    /// Raw schema of the property.
    pub raw: &'a JsonValue,
    /// Whether the property is listed in `required`.
    pub required: bool,
    /// The explicit `default`, if any.
    pub default: Option<&'a JsonValue>,
    /// The `description`, empty when absent.
    pub description: &'a str,
}

/// An object schema that declares `properties`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode<'a> {
    /// Raw fragment this node was parsed from.
    pub raw: &'a JsonValue,
    /// The `title` keyword.
    pub title: Option<&'a str>,
    /// The `description` keyword.
    pub description: Option<&'a str>,
    /// Properties in source order.
    pub properties: IndexMap<&'a str, FieldSpec<'a>>,
    /// The `additionalProperties` keyword.
    pub additional: AdditionalProperties<'a>,
}

/// A recognized schema shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode<'a> {
    /// `{"$ref": pointer}`
    Ref {
        /// The pointer, resolved against the document root.
        pointer: &'a str,
    },
    /// `{"enum": [...]}`
    Enum {
        /// Enumerated values in source order.
        values: &'a [JsonValue],
        /// The `title` keyword.
        title: Option<&'a str>,
    },
    /// `{"anyOf": [...]}` or a `type` array.
    Union {
        /// Variants in source order.
        variants: Vec<SchemaNode<'a>>,
    },
    /// `{"type": "array"}`
    Array {
        /// The `items` schema, `None` when absent.
        items: Option<Box<SchemaNode<'a>>>,
    },
    /// Object without properties whose `additionalProperties` is a schema.
    Map {
        /// Schema of every value.
        value: Box<SchemaNode<'a>>,
    },
    /// Object without properties accepting any values.
    OpenMap,
    /// Object without properties and `additionalProperties: false`.
    ClosedMap,
    /// Object with declared properties.
    Object(ObjectNode<'a>),
    /// A primitive type.
    Primitive(PrimitiveKind),
    /// No recognized keyword.
    Unknown,
}

impl<'a> SchemaNode<'a> {
    /// Parse a raw fragment located at `path` (a JSON pointer used for
    /// diagnostics only).
    pub fn parse(value: &'a JsonValue, path: &str) -> BuildResult<Self> {
        let Some(obj) = value.as_object() else {
            // Boolean schemas and other non-objects accept anything.
            return Ok(Self::Unknown);
        };

        if let Some(pointer) = obj.get("$ref") {
            let pointer = pointer.as_str().ok_or_else(|| {
                BuildError::unsupported(join_pointer(path, "$ref"), "$ref must be a string")
            })?;
            return Ok(Self::Ref { pointer });
        }

        if let Some(values) = obj.get("enum") {
            let values = values.as_array().ok_or_else(|| {
                BuildError::unsupported(join_pointer(path, "enum"), "enum must be an array")
            })?;
            return Ok(Self::Enum {
                values: values.as_slice(),
                title: obj.get("title").and_then(JsonValue::as_str),
            });
        }

        if let Some(variants) = obj.get("anyOf") {
            let any_of = join_pointer(path, "anyOf");
            let variants = variants
                .as_array()
                .ok_or_else(|| BuildError::unsupported(&any_of, "anyOf must be an array"))?
                .iter()
                .enumerate()
                .map(|(i, v)| Self::parse(v, &join_pointer(&any_of, &i.to_string())))
                .collect::<BuildResult<Vec<_>>>()?;
            return Ok(Self::Union { variants });
        }

        match obj.get("type") {
            None => Ok(Self::Unknown),
            Some(JsonValue::String(name)) => Self::parse_typed(value, name, path),
            Some(JsonValue::Array(names)) => {
                let mut variants = Vec::with_capacity(names.len());
                for name in names {
                    let name = name.as_str().ok_or_else(|| {
                        BuildError::unsupported(
                            join_pointer(path, "type"),
                            "type array must contain only strings",
                        )
                    })?;
                    variants.push(Self::parse_typed(value, name, path)?);
                }
                if variants.len() == 1 {
                    Ok(variants.remove(0))
                } else {
                    Ok(Self::Union { variants })
                }
            }
            Some(_) => Err(BuildError::unsupported(
                join_pointer(path, "type"),
                "type must be a string or an array of strings",
            )),
        }
    }

    fn parse_typed(value: &'a JsonValue, type_name: &str, path: &str) -> BuildResult<Self> {
        match type_name {
            "array" => {
                let items = match value.get("items") {
                    Some(items) => Some(Box::new(Self::parse(
                        items,
                        &join_pointer(path, "items"),
                    )?)),
                    None => None,
                };
                Ok(Self::Array { items })
            }
            "object" => Self::parse_object(value, path),
            other => match PrimitiveKind::from_name(other) {
                Some(kind) => Ok(Self::Primitive(kind)),
                None => {
                    tracing::warn!(path = %path, type_name = %other, "Unrecognized schema type, accepting any value");
                    Ok(Self::Unknown)
                }
            },
        }
    }

    fn parse_object(value: &'a JsonValue, path: &str) -> BuildResult<Self> {
        let additional = parse_additional(value, path)?;

        let Some(properties) = value.get("properties") else {
            return Ok(match additional {
                AdditionalProperties::Absent | AdditionalProperties::Allowed => Self::OpenMap,
                AdditionalProperties::Forbidden => Self::ClosedMap,
                AdditionalProperties::Schema(value) => Self::Map { value },
            });
        };

        Ok(Self::Object(ObjectNode::parse_with(
            value, properties, additional, path,
        )?))
    }

    /// Whether this node compiles to its own named model.
    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Short name of the active variant, for diagnostics.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Ref { .. } => "ref",
            Self::Enum { .. } => "enum",
            Self::Union { .. } => "union",
            Self::Array { .. } => "array",
            Self::Map { .. } => "map",
            Self::OpenMap => "open map",
            Self::ClosedMap => "closed map",
            Self::Object(_) => "object",
            Self::Primitive(_) => "primitive",
            Self::Unknown => "unknown",
        }
    }
}

impl<'a> ObjectNode<'a> {
    /// Parse a fragment as a record, whatever its `type` says.
    ///
    /// Used for the root of a tool schema, which is always a record even when
    /// it omits `type` or `properties`.
    pub fn parse(value: &'a JsonValue, path: &str) -> BuildResult<Self> {
        let additional = parse_additional(value, path)?;
        match value.get("properties") {
            Some(properties) => Self::parse_with(value, properties, additional, path),
            None => Ok(Self {
                raw: value,
                title: value.get("title").and_then(JsonValue::as_str),
                description: value.get("description").and_then(JsonValue::as_str),
                properties: IndexMap::new(),
                additional,
            }),
        }
    }

    fn parse_with(
        value: &'a JsonValue,
        properties: &'a JsonValue,
        additional: AdditionalProperties<'a>,
        path: &str,
    ) -> BuildResult<Self> {
        let props_path = join_pointer(path, "properties");
        let properties = properties.as_object().ok_or_else(|| {
            BuildError::unsupported(&props_path, "properties must be an object")
        })?;

        let required: Vec<&str> = match value.get("required") {
            None => Vec::new(),
            Some(JsonValue::Array(names)) => names.iter().filter_map(JsonValue::as_str).collect(),
            Some(_) => {
                return Err(BuildError::unsupported(
                    join_pointer(path, "required"),
                    "required must be an array of property names",
                ))
            }
        };

        let mut fields = IndexMap::with_capacity(properties.len());
        for (name, raw) in properties {
            let node = SchemaNode::parse(raw, &join_pointer(&props_path, name))?;
            fields.insert(
                name.as_str(),
                FieldSpec {
                    node,
                    raw,
                    required: required.contains(&name.as_str()),
                    default: raw.get("default"),
                    description: raw
                        .get("description")
                        .and_then(JsonValue::as_str)
                        .unwrap_or(""),
                },
            );
        }

        Ok(Self {
            raw: value,
            title: value.get("title").and_then(JsonValue::as_str),
            description: value.get("description").and_then(JsonValue::as_str),
            properties: fields,
            additional,
        })
    }
}

fn parse_additional<'a>(
    value: &'a JsonValue,
    path: &str,
) -> BuildResult<AdditionalProperties<'a>> {
    let path = join_pointer(path, "additionalProperties");
    match value.get("additionalProperties") {
        None => Ok(AdditionalProperties::Absent),
        Some(JsonValue::Bool(true)) => Ok(AdditionalProperties::Allowed),
        Some(JsonValue::Bool(false)) => Ok(AdditionalProperties::Forbidden),
        Some(schema @ JsonValue::Object(_)) => Ok(AdditionalProperties::Schema(Box::new(
            SchemaNode::parse(schema, &path)?,
        ))),
        Some(_) => Err(BuildError::unsupported(
            path,
            "additionalProperties must be a boolean or a schema",
        )),
    }
}
