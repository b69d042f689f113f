//! Semantic field types.

use serde_json::Value as JsonValue;
use std::fmt;

use crate::node::PrimitiveKind;

/// The compiler's semantic type for one model field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A primitive JSON type.
    Primitive(PrimitiveKind),
    /// Array of the inner type.
    List(Box<FieldType>),
    /// String-keyed map whose values have the inner type.
    Map(Box<FieldType>),
    /// String-keyed map with arbitrary values.
    MapOfAny,
    /// Object that admits no keys at all.
    MapOfNothing,
    /// Reference to a named model in the same registry.
    Model(String),
    /// Closed set of literal values.
    Enum(EnumType),
    /// Any of the listed types, tried in order.
    Union(Vec<FieldType>),
    /// The inner type or `null`.
    Nullable(Box<FieldType>),
    /// Any value.
    Any,
}

impl FieldType {
    /// Wrap in [`FieldType::Nullable`] unless the type already admits `null`.
    #[must_use]
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) | Self::Any | Self::Primitive(PrimitiveKind::Null) => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Whether `null` is accepted.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Nullable(_) | Self::Any | Self::Primitive(PrimitiveKind::Null) => true,
            Self::Union(variants) => variants.iter().any(Self::is_nullable),
            _ => false,
        }
    }

    /// The type without a top-level `Nullable` wrapper.
    #[must_use]
    pub fn non_null(&self) -> &Self {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Names of every model referenced by this type, in order of appearance.
    pub fn referenced_models(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_models(&mut names);
        names
    }

    fn collect_models<'s>(&'s self, names: &mut Vec<&'s str>) {
        match self {
            Self::Model(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::List(inner) | Self::Map(inner) | Self::Nullable(inner) => {
                inner.collect_models(names)
            }
            Self::Union(variants) => {
                for variant in variants {
                    variant.collect_models(names);
                }
            }
            Self::Primitive(_) | Self::MapOfAny | Self::MapOfNothing | Self::Enum(_) | Self::Any => {}
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Map(inner) => write!(f, "map[string, {inner}]"),
            Self::MapOfAny => f.write_str("map[string, any]"),
            Self::MapOfNothing => f.write_str("empty object"),
            Self::Model(name) => f.write_str(name),
            Self::Enum(e) => write!(f, "{e}"),
            Self::Union(variants) => {
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{variant}")?;
                }
                Ok(())
            }
            Self::Nullable(inner) => write!(f, "{inner} | null"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// One member of an enum.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    /// Identifier derived from the value's string form.
    pub ident: String,
    /// The literal value.
    pub value: JsonValue,
}

/// A named, closed set of literal values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    /// Enum name (schema title or a name derived from the field).
    pub name: String,
    /// Members in source order.
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// Whether `value` is one of the members.
    ///
    /// Numbers compare numerically, so `1` matches `1.0`.
    #[must_use]
    pub fn contains(&self, value: &JsonValue) -> bool {
        self.members.iter().any(|m| literal_eq(&m.value, value))
    }

    /// Look up a member by identifier.
    #[must_use]
    pub fn member(&self, ident: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.ident == ident)
    }

    /// Member values in source order.
    pub fn values(&self) -> impl Iterator<Item = &JsonValue> {
        self.members.iter().map(|m| &m.value)
    }
}

impl fmt::Display for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("one of ")?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", member.value)?;
        }
        Ok(())
    }
}

fn literal_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn color() -> EnumType {
        EnumType {
            name: "Color".to_string(),
            members: ["red", "green"]
                .iter()
                .map(|v| EnumMember {
                    ident: v.to_string(),
                    value: json!(v),
                })
                .collect(),
        }
    }

    #[test]
    fn test_nullable_is_idempotent() {
        let ty = FieldType::Primitive(PrimitiveKind::String).nullable().nullable();
        assert_eq!(
            ty,
            FieldType::Nullable(Box::new(FieldType::Primitive(PrimitiveKind::String)))
        );
        assert_eq!(FieldType::Any.nullable(), FieldType::Any);
        assert!(ty.is_nullable());
        assert_eq!(ty.non_null(), &FieldType::Primitive(PrimitiveKind::String));
    }

    #[test]
    fn test_display() {
        let ty = FieldType::Union(vec![
            FieldType::List(Box::new(FieldType::Primitive(PrimitiveKind::Integer))),
            FieldType::Map(Box::new(FieldType::Model("Address".to_string()))),
        ])
        .nullable();
        assert_eq!(ty.to_string(), "list[integer] | map[string, Address] | null");
        assert_eq!(
            FieldType::Enum(color()).to_string(),
            "one of \"red\", \"green\""
        );
    }

    #[test]
    fn test_referenced_models_deduplicates() {
        let ty = FieldType::Union(vec![
            FieldType::Model("A".to_string()),
            FieldType::List(Box::new(FieldType::Model("B".to_string()))),
            FieldType::Model("A".to_string()),
        ]);
        assert_eq!(ty.referenced_models(), vec!["A", "B"]);
    }

    #[test]
    fn test_enum_contains_compares_numbers_numerically() {
        let e = EnumType {
            name: "Level".to_string(),
            members: vec![EnumMember {
                ident: "_1".to_string(),
                value: json!(1),
            }],
        };
        assert!(e.contains(&json!(1.0)));
        assert!(!e.contains(&json!("1")));
        assert!(color().contains(&json!("green")));
        assert!(color().member("red").is_some());
    }
}
