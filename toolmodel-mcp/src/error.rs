//! Toolkit error types.

use thiserror::Error;
use toolmodel_core::{BuildError, ValidationErrors};

/// Errors raised by the toolkit and its tools.
#[derive(Debug, Error)]
pub enum McpError {
    /// Transport error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol error reported by the server.
    #[error("Protocol error {code}: {message}")]
    Protocol {
        /// Error code.
        code: i32,
        /// Error message.
        message: String,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The toolkit was used before `initialize`.
    #[error("Toolkit not initialized")]
    NotInitialized,

    /// Tool not found.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool's input schema could not be compiled.
    #[error("Invalid tool schema: {0}")]
    Schema(#[from] BuildError),

    /// Arguments failed validation; the server was not called.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] ValidationErrors),

    /// The tool ran and reported an error. Holds the serialized content.
    #[error("Tool returned an error: {0}")]
    ToolReturnedError(String),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl McpError {
    /// Create from any displayable error.
    pub fn from_err<E: std::fmt::Display>(err: E) -> Self {
        Self::Other(anyhow::anyhow!("{err}"))
    }

    /// Check if retrying the same call might succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type for toolkit operations.
pub type McpResult<T> = Result<T, McpError>;
