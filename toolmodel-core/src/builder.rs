//! Model construction.
//!
//! [`ModelBuilder`] turns one record schema into one [`ModelDefinition`],
//! building every model it references first. All models of a session go
//! through one [`ModelRegistry`], which memoizes them by name and turns
//! reference cycles into forward references.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::definition::{ExtraPolicy, Field, ModelDefinition};
use crate::errors::{BuildError, BuildResult};
use crate::mapper::{non_root_name, TypeMapper};
use crate::naming::{to_pascal_case, to_snake_case, IdentifierScope};
use crate::node::{AdditionalProperties, ObjectNode, SchemaNode};
use crate::options::{CompileOptions, UndeclaredFields};
use crate::registry::{ModelRegistry, Reservation};
use crate::resolver::{join_pointer, resolve};
use crate::types::FieldType;

/// Sections eagerly scanned for shared definitions, in order.
const DEFINITION_SECTIONS: [&str; 2] = ["$defs", "definitions"];

/// Builds model definitions from one schema document.
///
/// # Example
///
/// ```rust
/// use toolmodel_core::{ModelBuilder, ModelRegistry};
///
/// let schema = serde_json::json!({
///     "type": "object",
///     "properties": {"query": {"type": "string"}},
///     "required": ["query"]
/// });
///
/// let mut registry = ModelRegistry::new();
/// let model = ModelBuilder::new(&schema, &mut registry)
///     .build_root("read_query")
///     .unwrap();
/// assert_eq!(model.name, "read_query");
/// assert!(model.field("query").unwrap().required);
/// ```
#[derive(Debug)]
pub struct ModelBuilder<'a, 'r> {
    document: &'a JsonValue,
    registry: &'r mut ModelRegistry,
    options: CompileOptions,
    root_name: Option<String>,
    root_schema: Option<&'a JsonValue>,
    definitions_loaded: bool,
}

impl<'a, 'r> ModelBuilder<'a, 'r> {
    /// Create a builder over `document`, recording models in `registry`.
    pub fn new(document: &'a JsonValue, registry: &'r mut ModelRegistry) -> Self {
        Self {
            document,
            registry,
            options: CompileOptions::default(),
            root_name: None,
            root_schema: None,
            definitions_loaded: false,
        }
    }

    /// Set compilation options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the document itself as the model `name`.
    ///
    /// A document that is itself a `$ref` builds the record it points to.
    /// Other records whose derived name equals `name` are registered with a
    /// `Def` suffix.
    pub fn build_root(&mut self, name: &str) -> BuildResult<Arc<ModelDefinition>> {
        self.root_name = Some(name.to_string());
        let fragment = self.root_fragment()?;
        self.root_schema = Some(fragment);
        self.build(fragment, name)
    }

    fn root_fragment(&self) -> BuildResult<&'a JsonValue> {
        let document = self.document;
        let mut fragment = document;
        let mut followed: Vec<&'a str> = Vec::new();
        while let Some(pointer) = fragment.get("$ref").and_then(JsonValue::as_str) {
            if followed.contains(&pointer) {
                return Err(BuildError::unsupported(
                    pointer,
                    "reference cycle at the document root",
                ));
            }
            followed.push(pointer);
            fragment = resolve(document, pointer)?;
        }
        Ok(fragment)
    }

    /// Build `fragment` (which must live inside the document) as the model
    /// `name`. The fragment is always treated as a record.
    pub fn build(&mut self, fragment: &'a JsonValue, name: &str) -> BuildResult<Arc<ModelDefinition>> {
        let origin = if std::ptr::eq(fragment, self.document) {
            "#".to_string()
        } else {
            format!("<{name}>")
        };
        let node = ObjectNode::parse(fragment, &origin)?;
        self.ensure(name, &node, &origin)?.ok_or_else(|| {
            BuildError::unsupported(origin, format!("model '{name}' is already being built"))
        })
    }

    /// Build `name` unless it is built or in progress.
    ///
    /// Returns `None` for an in-progress name: the caller holds a forward
    /// reference that the registry will satisfy once the cycle unwinds.
    fn ensure(
        &mut self,
        name: &str,
        node: &ObjectNode<'a>,
        origin: &str,
    ) -> BuildResult<Option<Arc<ModelDefinition>>> {
        match self.registry.get_or_reserve(name, node.raw, origin)? {
            Reservation::Built(def) => return Ok(Some(def)),
            Reservation::Reserved => return Ok(None),
            Reservation::Absent => {}
        }

        match self.construct(name, node, origin) {
            Ok(def) => Ok(Some(def)),
            Err(err) => {
                self.registry.release(name);
                Err(err)
            }
        }
    }

    fn construct(
        &mut self,
        name: &str,
        node: &ObjectNode<'a>,
        origin: &str,
    ) -> BuildResult<Arc<ModelDefinition>> {
        self.load_definitions()?;

        let (fields, extra, pending) = {
            let mut mapper = TypeMapper::new(self.document, &self.options);
            if let Some(root) = &self.root_name {
                mapper = mapper.with_root_name(root.clone());
            }
            if let Some(schema) = self.root_schema {
                mapper = mapper.with_root_schema(schema);
            }

            let mut idents = IdentifierScope::new(format!("fields of {name}"));
            let mut fields = IndexMap::with_capacity(node.properties.len());
            for (i, (field_name, spec)) in node.properties.iter().enumerate() {
                let ident = to_snake_case(field_name);
                idents.claim(&ident, field_name)?;
                let hint = match to_pascal_case(field_name) {
                    suffix if suffix.is_empty() => format!("{name}Field{i}"),
                    suffix => format!("{name}{suffix}"),
                };
                let ty = mapper.map(&spec.node, &hint)?;
                fields.insert(
                    field_name.to_string(),
                    Field::from_spec(field_name, ident, ty, spec),
                );
            }

            let extra = match &node.additional {
                AdditionalProperties::Absent => match self.options.default_extra {
                    UndeclaredFields::Ignore => ExtraPolicy::Ignore,
                    UndeclaredFields::Allow => ExtraPolicy::Allow(FieldType::Any),
                    UndeclaredFields::Forbid => ExtraPolicy::Forbid,
                },
                AdditionalProperties::Allowed => ExtraPolicy::Allow(FieldType::Any),
                AdditionalProperties::Forbidden => ExtraPolicy::Forbid,
                AdditionalProperties::Schema(schema) => {
                    ExtraPolicy::Allow(mapper.map(schema, &format!("{name}Extra"))?)
                }
            };

            (fields, extra, mapper.take_pending())
        };

        for pending in pending {
            self.ensure(&pending.name, &pending.node, &pending.origin)?;
        }

        let def = Arc::new(ModelDefinition {
            name: name.to_string(),
            description: node.description.map(str::to_string),
            fields,
            extra,
            schema: node.raw.clone(),
            origin: origin.to_string(),
        });
        self.registry.commit(name, Arc::clone(&def))?;
        Ok(def)
    }

    /// Build every record in the definition sections, once per builder.
    fn load_definitions(&mut self) -> BuildResult<()> {
        if self.definitions_loaded || !self.options.eager_definitions {
            return Ok(());
        }
        self.definitions_loaded = true;

        let document = self.document;
        let mut names = IdentifierScope::new("definitions");
        let mut records = Vec::new();
        for section in DEFINITION_SECTIONS {
            let Some(defs) = document.get(section).and_then(JsonValue::as_object) else {
                continue;
            };
            let section_pointer = join_pointer("#", section);
            for (key, raw) in defs {
                let pointer = join_pointer(&section_pointer, key);
                if let SchemaNode::Object(obj) = SchemaNode::parse(raw, &pointer)? {
                    let name = obj.title.map_or_else(|| key.clone(), str::to_string);
                    let name = self.scoped_name(name, raw);
                    names.claim(&name, &pointer)?;
                    records.push((name, obj, pointer));
                }
            }
        }

        tracing::debug!(count = records.len(), "Building shared definitions");
        for (name, obj, pointer) in records {
            self.ensure(&name, &obj, &pointer)?;
        }
        Ok(())
    }

    fn scoped_name(&self, name: String, fragment: &JsonValue) -> String {
        let root = self.root_name.as_deref().zip(self.root_schema);
        non_root_name(name, fragment, root)
    }
}
