//! Session-scoped registry of compiled models.
//!
//! Every name moves from absent to in-progress to built (or back to absent
//! when its build fails). A lookup of a name that is still in progress is a
//! reference cycle; the caller gets [`Reservation::Reserved`] and wires up a
//! forward reference by name instead of recursing.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::definition::ModelDefinition;
use crate::errors::{BuildError, BuildResult};

/// Outcome of [`ModelRegistry::get_or_reserve`].
#[derive(Debug, Clone)]
pub enum Reservation {
    /// Already compiled in this session.
    Built(Arc<ModelDefinition>),
    /// Being compiled further up the call tree.
    Reserved,
    /// Was absent; now reserved for the caller to build.
    Absent,
}

#[derive(Debug, Clone)]
enum Slot {
    InProgress { schema: JsonValue, origin: String },
    Built(Arc<ModelDefinition>),
}

/// Models compiled during one build session, indexed by name.
///
/// Not synchronized: each session owns its registry.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    slots: IndexMap<String, Slot>,
}

impl ModelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `name`, reserving it when absent.
    ///
    /// A name that is already taken by a different schema fragment is a
    /// naming collision.
    pub fn get_or_reserve(
        &mut self,
        name: &str,
        schema: &JsonValue,
        origin: &str,
    ) -> BuildResult<Reservation> {
        match self.slots.get(name) {
            Some(Slot::Built(def)) => {
                if def.schema != *schema {
                    return Err(BuildError::collision("models", name, &def.origin, origin));
                }
                tracing::debug!(model = %name, "Reusing compiled model");
                Ok(Reservation::Built(Arc::clone(def)))
            }
            Some(Slot::InProgress {
                schema: existing,
                origin: existing_origin,
            }) => {
                if existing != schema {
                    return Err(BuildError::collision(
                        "models",
                        name,
                        existing_origin.as_str(),
                        origin,
                    ));
                }
                tracing::debug!(model = %name, "Model already in progress, using forward reference");
                Ok(Reservation::Reserved)
            }
            None => {
                self.slots.insert(
                    name.to_string(),
                    Slot::InProgress {
                        schema: schema.clone(),
                        origin: origin.to_string(),
                    },
                );
                Ok(Reservation::Absent)
            }
        }
    }

    /// Store the finished definition for a reserved name.
    ///
    /// Committing a name twice is a naming collision: a model is compiled at
    /// most once per session.
    pub fn commit(&mut self, name: &str, def: Arc<ModelDefinition>) -> BuildResult<()> {
        if let Some(Slot::Built(existing)) = self.slots.get(name) {
            return Err(BuildError::collision(
                "models",
                name,
                existing.origin.as_str(),
                def.origin.as_str(),
            ));
        }
        tracing::debug!(model = %name, fields = def.fields.len(), "Committed model");
        self.slots.insert(name.to_string(), Slot::Built(def));
        Ok(())
    }

    /// Drop the reservation for a name whose build failed.
    ///
    /// Built models are never removed.
    pub fn release(&mut self, name: &str) {
        if matches!(self.slots.get(name), Some(Slot::InProgress { .. })) {
            self.slots.shift_remove(name);
        }
    }

    /// Whether `name` is reserved but not yet built.
    #[must_use]
    pub fn is_in_progress(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::InProgress { .. }))
    }

    /// Whether `name` has been built.
    #[must_use]
    pub fn is_built(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Slot::Built(_)))
    }

    /// Get a built model.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ModelDefinition>> {
        match self.slots.get(name) {
            Some(Slot::Built(def)) => Some(Arc::clone(def)),
            _ => None,
        }
    }

    /// Names of built models, in reservation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|(name, slot)| match slot {
            Slot::Built(_) => Some(name.as_str()),
            Slot::InProgress { .. } => None,
        })
    }

    /// Number of built models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names().count()
    }

    /// Check if no model has been built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every built model, in reservation order.
    #[must_use]
    pub fn into_models(self) -> IndexMap<String, Arc<ModelDefinition>> {
        self.slots
            .into_iter()
            .filter_map(|(name, slot)| match slot {
                Slot::Built(def) => Some((name, def)),
                Slot::InProgress { .. } => None,
            })
            .collect()
    }
}
