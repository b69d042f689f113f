//! Toolkit exposing a session's tools with compiled argument models.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use toolmodel_core::{compile_with, CompileOptions};

use crate::error::{McpError, McpResult};
use crate::session::ToolSession;
use crate::tool::BoundTool;
use crate::types::McpTool;

/// All tools of one session.
///
/// # Example
///
/// ```ignore
/// use toolmodel_mcp::McpToolkit;
///
/// let toolkit = McpToolkit::new(session);
/// toolkit.initialize().await?;
///
/// for tool in toolkit.get_tools()? {
///     println!("{}: {}", tool.name(), tool.description());
/// }
/// ```
pub struct McpToolkit {
    session: Arc<dyn ToolSession>,
    options: CompileOptions,
    tools_cache: RwLock<Option<Vec<McpTool>>>,
    init: Mutex<()>,
}

impl McpToolkit {
    /// Create a toolkit over a session.
    pub fn new<S: ToolSession + 'static>(session: S) -> Self {
        Self::from_shared(Arc::new(session))
    }

    /// Create a toolkit over a session that is shared elsewhere.
    pub fn from_shared(session: Arc<dyn ToolSession>) -> Self {
        Self {
            session,
            options: CompileOptions::default(),
            tools_cache: RwLock::new(None),
            init: Mutex::new(()),
        }
    }

    /// Set the options used to compile tool input schemas.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Initialize the session and fetch its tool list.
    ///
    /// Only the first call talks to the session; later calls return at once.
    pub async fn initialize(&self) -> McpResult<()> {
        let _guard = self.init.lock().await;
        if self.is_initialized() {
            return Ok(());
        }

        self.session.initialize().await?;
        let listed = self.session.list_tools().await?;
        tracing::debug!(tools = listed.tools.len(), "Toolkit initialized");
        *self.tools_cache.write() = Some(listed.tools);
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.tools_cache.read().is_some()
    }

    /// Re-fetch the tool list.
    pub async fn refresh(&self) -> McpResult<()> {
        if !self.is_initialized() {
            return Err(McpError::NotInitialized);
        }
        let listed = self.session.list_tools().await?;
        tracing::debug!(tools = listed.tools.len(), "Tool list refreshed");
        *self.tools_cache.write() = Some(listed.tools);
        Ok(())
    }

    /// The cached tool list.
    #[must_use]
    pub fn cached_tools(&self) -> Option<Vec<McpTool>> {
        self.tools_cache.read().clone()
    }

    /// Every tool, each with its input schema compiled.
    ///
    /// A tool whose schema does not compile fails the whole call.
    pub fn get_tools(&self) -> McpResult<Vec<BoundTool>> {
        let tools = self.cached_tools().ok_or(McpError::NotInitialized)?;
        tools.iter().map(|tool| self.bind(tool)).collect()
    }

    /// One tool by name.
    pub fn get_tool(&self, name: &str) -> McpResult<BoundTool> {
        let cache = self.tools_cache.read();
        let tools = cache.as_ref().ok_or(McpError::NotInitialized)?;
        let tool = tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;
        self.bind(tool)
    }

    fn bind(&self, tool: &McpTool) -> McpResult<BoundTool> {
        let model = compile_with(&tool.input_schema, &tool.name, &self.options).map_err(|err| {
            tracing::warn!(tool = %tool.name, error = %err, "Could not compile tool schema");
            McpError::Schema(err)
        })?;
        Ok(BoundTool::new(
            Arc::clone(&self.session),
            tool.name.clone(),
            tool.description.clone().unwrap_or_default(),
            model,
        ))
    }
}

impl std::fmt::Debug for McpToolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolkit")
            .field("options", &self.options)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
