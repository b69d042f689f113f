//! # toolmodel - JSON Schema Tool Models for Rust
//!
//! toolmodel compiles the JSON Schema that describes a tool's input into a
//! validating record model, and wraps Model Context Protocol sessions so that
//! every tool call is checked locally before it is sent.
//!
//! ## Quick Start
//!
//! ```rust
//! use toolmodel::prelude::*;
//!
//! let schema = serde_json::json!({
//!     "type": "object",
//!     "properties": {
//!         "city": {"type": "string"},
//!         "units": {"enum": ["metric", "imperial"], "default": "metric"}
//!     },
//!     "required": ["city"]
//! });
//!
//! let model = compile(&schema, "get_weather").unwrap();
//! let args = model.validate(&serde_json::json!({"city": "Oslo"})).unwrap();
//! assert_eq!(args.get("units"), Some(&serde_json::json!("metric")));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `mcp` | MCP toolkit | ✅ |
//!
//! ## Architecture
//!
//! - [`toolmodel_core`] - schema compiler, registry, validation
//! - [`toolmodel_mcp`] - MCP toolkit (optional)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Schema compiler and validating models.
pub use toolmodel_core as core;

/// Model Context Protocol toolkit.
#[cfg(feature = "mcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "mcp")))]
pub use toolmodel_mcp as mcp;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use toolmodel_core::{
    compile, compile_with, BuildError, BuildResult, CompileOptions, FieldType, Instance,
    ModelBuilder, ModelDefinition, ModelRegistry, UndeclaredFields, ValidatingModel,
    ValidationError, ValidationErrorKind, ValidationErrors,
};

#[cfg(feature = "mcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "mcp")))]
pub use toolmodel_mcp::{BoundTool, McpError, McpResult, McpTool, McpToolkit, ToolSession};

/// Prelude for common imports.
pub mod prelude {
    pub use toolmodel_core::prelude::*;

    #[cfg(feature = "mcp")]
    pub use toolmodel_mcp::prelude::*;
}

/// Returns the current version of toolmodel.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
        assert_eq!(version().split('.').count(), 3);
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let model: ValidatingModel =
            compile(&serde_json::json!({"type": "object"}), "Empty").unwrap();
        assert!(model.definition().is_empty());
    }

    #[cfg(feature = "mcp")]
    #[test]
    fn test_mcp_prelude() {
        use crate::prelude::*;

        let tool = McpTool::new("echo", serde_json::json!({"type": "object"}));
        assert_eq!(tool.name, "echo");
    }
}
