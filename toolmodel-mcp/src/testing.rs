//! In-memory session for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value as JsonValue};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::McpResult;
use crate::session::ToolSession;
use crate::types::{CallToolResult, ListToolsResult, McpTool};

pub(crate) type RecordedCall = (String, Map<String, JsonValue>);

#[derive(Debug, Default)]
pub(crate) struct FakeSession {
    tools: Mutex<Vec<McpTool>>,
    result: Option<CallToolResult>,
    calls: Mutex<Vec<RecordedCall>>,
    initialized: AtomicUsize,
    listed: AtomicUsize,
}

impl FakeSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_tools(self, tools: Vec<McpTool>) -> Self {
        *self.tools.lock() = tools;
        self
    }

    pub(crate) fn with_result(mut self, result: CallToolResult) -> Self {
        self.result = Some(result);
        self
    }

    pub(crate) fn set_tools(&self, tools: Vec<McpTool>) {
        *self.tools.lock() = tools;
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn initialize_count(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    pub(crate) fn list_count(&self) -> usize {
        self.listed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolSession for FakeSession {
    async fn initialize(&self) -> McpResult<()> {
        self.initialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_tools(&self) -> McpResult<ListToolsResult> {
        self.listed.fetch_add(1, Ordering::SeqCst);
        Ok(ListToolsResult::new(self.tools.lock().clone()))
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, JsonValue>,
    ) -> McpResult<CallToolResult> {
        self.calls.lock().push((name.to_string(), arguments));
        Ok(self
            .result
            .clone()
            .unwrap_or_else(|| CallToolResult::text("ok")))
    }
}

/// Route `tracing` output to the test harness.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
