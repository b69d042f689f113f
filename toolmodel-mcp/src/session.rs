//! The session abstraction the toolkit talks through.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::error::McpResult;
use crate::types::{CallToolResult, ListToolsResult};

/// A connected tool server.
///
/// Implementations own the transport; the toolkit only needs these three
/// requests. Sessions are shared between tools, so methods take `&self`.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Perform the protocol handshake.
    async fn initialize(&self) -> McpResult<()>;

    /// List the tools the server offers.
    async fn list_tools(&self) -> McpResult<ListToolsResult>;

    /// Call a tool with already validated arguments.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, JsonValue>,
    ) -> McpResult<CallToolResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSession;
    use crate::types::McpTool;
    use std::sync::Arc;

    #[test]
    fn test_session_as_trait_object() {
        let fake = FakeSession::new().with_tools(vec![McpTool::new("echo", serde_json::json!({}))]);
        let session: Arc<dyn ToolSession> = Arc::new(fake);

        let listed = tokio_test::block_on(session.list_tools()).unwrap();
        assert_eq!(listed.tools.len(), 1);

        let result = tokio_test::block_on(session.call_tool("echo", Map::new())).unwrap();
        assert!(!result.is_error);
    }
}
