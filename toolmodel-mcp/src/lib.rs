//! # toolmodel-mcp
//!
//! Exposes the tools of a Model Context Protocol session with validated
//! arguments.
//!
//! Every tool's input schema is compiled into a
//! [`ValidatingModel`](toolmodel_core::ValidatingModel). Arguments are checked
//! locally, so a malformed call is rejected with the full list of problems
//! before it reaches the server.
//!
//! ## Core Concepts
//!
//! - **[`ToolSession`]**: the connection to a tool server (bring your own
//!   transport)
//! - **[`McpToolkit`]**: initializes the session and caches its tool list
//! - **[`BoundTool`]**: one tool with its compiled argument model
//!
//! ## Example
//!
//! ```ignore
//! use toolmodel_mcp::McpToolkit;
//!
//! let toolkit = McpToolkit::new(session);
//! toolkit.initialize().await?;
//!
//! let read_file = toolkit.get_tool("read_file")?;
//! let args = serde_json::json!({"path": "LICENSE"});
//! let content = read_file.call_value(&args).await?;
//! println!("{content}");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod session;
pub mod tool;
pub mod toolkit;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports
pub use error::{McpError, McpResult};
pub use session::ToolSession;
pub use tool::{BoundTool, ToolDefinition};
pub use toolkit::McpToolkit;
pub use types::{CallToolResult, ListToolsResult, McpTool, ResourceContent, ToolResultContent};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        BoundTool, CallToolResult, McpError, McpResult, McpTool, McpToolkit, ToolDefinition,
        ToolSession,
    };
}
