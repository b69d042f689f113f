//! Tools bound to a session.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use toolmodel_core::ValidatingModel;

use crate::error::{McpError, McpResult};
use crate::session::ToolSession;

/// Description of a tool as handed to a language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters_json_schema: JsonValue,
}

/// A server tool with a compiled argument model.
///
/// Arguments are validated locally before anything is sent; the server only
/// ever sees argument maps that passed the model.
#[derive(Clone)]
pub struct BoundTool {
    session: Arc<dyn ToolSession>,
    name: String,
    description: String,
    args_model: ValidatingModel,
}

impl BoundTool {
    /// Bind a tool to a session.
    pub fn new(
        session: Arc<dyn ToolSession>,
        name: impl Into<String>,
        description: impl Into<String>,
        args_model: ValidatingModel,
    ) -> Self {
        Self {
            session,
            name: name.into(),
            description: description.into(),
            args_model,
        }
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool description, empty when the server gave none.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The compiled argument model.
    #[must_use]
    pub fn args_model(&self) -> &ValidatingModel {
        &self.args_model
    }

    /// Definition advertising the tool's own input schema.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters_json_schema: self.args_model.schema().clone(),
        }
    }

    /// Validate `args` and call the tool.
    ///
    /// Returns the result content serialized as a JSON array. A result the
    /// server flags as an error becomes [`McpError::ToolReturnedError`]
    /// carrying the same text.
    pub async fn call(&self, args: &Map<String, JsonValue>) -> McpResult<String> {
        let instance = self.args_model.construct(args)?;

        tracing::debug!(tool = %self.name, "Calling tool");
        let result = self
            .session
            .call_tool(&self.name, instance.into_arguments())
            .await?;
        let content = result.content_json()?;

        if result.is_error {
            tracing::warn!(tool = %self.name, "Tool returned an error");
            return Err(McpError::ToolReturnedError(content));
        }
        Ok(content)
    }

    /// Like [`call`](Self::call), for an arbitrary JSON value.
    pub async fn call_value(&self, args: &JsonValue) -> McpResult<String> {
        match args {
            JsonValue::Object(map) => self.call(map).await,
            other => Err(self.args_model.validate(other).map_or_else(
                McpError::InvalidArguments,
                |_| McpError::from_err("arguments must be a JSON object"),
            )),
        }
    }
}

impl fmt::Debug for BoundTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args_model", &self.args_model.name())
            .finish_non_exhaustive()
    }
}
