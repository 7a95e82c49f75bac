use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

/// Name → tool map, exposed to the loop as a [`ToolSource`].
///
/// Built once at setup, then shared read-only (typically behind an `Arc` or a `Box` owned by
/// ActNode). Registering a second tool with the same name replaces the first.
///
/// # Examples
///
/// ```
/// use shuttle::tools::{arithmetic_registry, ToolRegistry};
///
/// let registry = arithmetic_registry();
/// let names: Vec<String> = registry.list().into_iter().map(|s| s.name).collect();
/// assert_eq!(names, ["add", "multiply", "subtract"]);
/// assert!(ToolRegistry::new().is_empty());
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under `tool.name()`.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, tool: Box<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Specs of all registered tools, sorted by name.
    pub fn list(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|tool| tool.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Calls a tool by name.
    ///
    /// # Errors
    ///
    /// `ToolSourceError::NotFound` when no tool has that name; otherwise whatever the tool returns.
    pub async fn call(&self, name: &str, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))?;
        trace!(tool = %name, "registry dispatch");
        tool.call(args).await
    }
}

#[async_trait]
impl ToolSource for ToolRegistry {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.list())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.call(name, arguments).await
    }
}
