//! # toolmodel-core
//!
//! Compiles JSON Schema documents into validating record models.
//!
//! A tool's input schema goes in; a [`ValidatingModel`] comes out. The model
//! checks argument maps against the schema's fields (presence, types,
//! defaults, nested records), reports every violation with its path, and
//! keeps the source schema around for advertising.
//!
//! ## Core Concepts
//!
//! - **[`SchemaNode`]**: a parsed view over one schema fragment
//! - **[`resolver`]**: local JSON pointer resolution for `$ref`
//! - **[`TypeMapper`]**: schema fragment to [`FieldType`]
//! - **[`ModelRegistry`]**: session-scoped, name-indexed model table that
//!   memoizes builds and terminates reference cycles
//! - **[`ModelBuilder`]**: record schema to [`ModelDefinition`]
//! - **[`ValidatingModel`]**: construct-and-validate plus advertised schema
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use toolmodel_core::compile;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "path": {"type": "string"},
//!         "lines": {"type": "integer", "default": 100}
//!     },
//!     "required": ["path"]
//! });
//!
//! let model = compile(&schema, "read_file").unwrap();
//!
//! let args = json!({"path": "/tmp/notes.txt"});
//! let instance = model.validate(&args).unwrap();
//! assert_eq!(instance.get("lines"), Some(&json!(100)));
//!
//! let err = model.validate(&json!({"lines": "ten"})).unwrap_err();
//! assert_eq!(err.len(), 2);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod definition;
pub mod errors;
pub mod mapper;
pub mod model;
pub mod naming;
pub mod node;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod types;

mod render;
mod validate;

use serde_json::Value as JsonValue;

pub use builder::ModelBuilder;
pub use definition::{ExtraPolicy, Field, ModelDefinition};
pub use errors::{
    BuildError, BuildResult, ValidationError, ValidationErrorKind, ValidationErrors,
};
pub use mapper::TypeMapper;
pub use model::{Instance, ValidatingModel};
pub use node::{PrimitiveKind, SchemaNode};
pub use options::{CompileOptions, UndeclaredFields, DEFAULT_PLACEHOLDER_NAME};
pub use registry::{ModelRegistry, Reservation};
pub use types::{EnumMember, EnumType, FieldType};

/// Compile `schema` into a validating model named `name`, with default
/// options.
pub fn compile(schema: &JsonValue, name: &str) -> BuildResult<ValidatingModel> {
    compile_with(schema, name, &CompileOptions::default())
}

/// Compile `schema` into a validating model named `name`.
///
/// Each call is its own build session with a fresh registry.
pub fn compile_with(
    schema: &JsonValue,
    name: &str,
    options: &CompileOptions,
) -> BuildResult<ValidatingModel> {
    let mut registry = ModelRegistry::new();
    let root = ModelBuilder::new(schema, &mut registry)
        .with_options(options.clone())
        .build_root(name)?;
    tracing::debug!(model = %name, models = registry.len(), "Compiled schema");
    Ok(ValidatingModel::new(
        root,
        registry.into_models(),
        options.lax_integers,
    ))
}

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        compile, compile_with, BuildError, BuildResult, CompileOptions, FieldType, Instance,
        ModelDefinition, UndeclaredFields, ValidatingModel, ValidationError, ValidationErrors,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let model: ValidatingModel = compile(&json!({"type": "object"}), "Empty").unwrap();
        assert_eq!(model.name(), "Empty");
    }

    #[test]
    fn test_unresolved_reference_names_segment() {
        let schema = json!({
            "type": "object",
            "properties": {"x": {"$ref": "#/$defs/Missing"}}
        });
        match compile(&schema, "Root").unwrap_err() {
            BuildError::UnresolvedReference { pointer, segment, .. } => {
                assert_eq!(pointer, "#/$defs/Missing");
                assert_eq!(segment.as_deref(), Some("$defs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_root_level_missing_reference() {
        let schema = json!({"$ref": "#/$defs/Missing"});
        let err = compile(&schema, "Root").unwrap_err();
        assert!(err.is_unresolved_reference());
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_non_ascii_names_compile() {
        let schema = json!({
            "type": "object",
            "properties": {
                "名前": {"type": "string"},
                "年齢": {"type": "integer"},
                "lang": {"enum": ["日本", "中国"]},
                "住所": {
                    "type": "object",
                    "properties": {"市": {"type": "string"}},
                    "required": ["市"]
                }
            },
            "required": ["名前"]
        });
        let model = compile(&schema, "T").unwrap();

        let lang = model.definition().field("lang").unwrap();
        match lang.ty.non_null() {
            FieldType::Enum(e) => {
                let idents: Vec<&str> = e.members.iter().map(|m| m.ident.as_str()).collect();
                assert_eq!(idents, vec!["日本", "中国"]);
            }
            other => panic!("unexpected type: {other:?}"),
        }

        let args = json!({"名前": "太郎", "lang": "中国", "住所": {"市": "東京"}});
        let instance = model.validate(&args).unwrap();
        assert_eq!(instance.get("年齢"), Some(&json!(null)));

        let err = model.validate(&json!({"名前": "太郎", "住所": {}})).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.iter().next().unwrap().path(), "住所.市");
    }

    #[test]
    fn test_compiled_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidatingModel>();
        assert_send_sync::<Instance>();
    }

    #[test]
    fn test_compile_with_strict_integers() {
        let schema = json!({"type": "object", "properties": {"n": {"type": "integer"}}});
        let options = CompileOptions::new().lax_integers(false);
        let model = compile_with(&schema, "Count", &options).unwrap();
        assert!(model.validate(&json!({"n": 1.0})).is_err());
        assert!(compile(&schema, "Count").unwrap().validate(&json!({"n": 1.0})).is_ok());
    }
}
