//! Mock ToolSource for tests and examples: fixed tool list, fixed call result.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Mock tool source: `list_tools()` returns the configured specs, `call_tool()` returns the
/// configured text for any name (or fails with `NotFound` for names in `missing`).
///
/// Every call is recorded as `(name, arguments)`.
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    call_result: String,
    missing: Vec<String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    pub fn new(tools: Vec<ToolSpec>, call_result: String) -> Self {
        Self {
            tools,
            call_result,
            missing: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// One `add` tool that answers "3" whatever the operands.
    pub fn add_example() -> Self {
        Self::new(
            vec![ToolSpec {
                name: "add".to_string(),
                description: Some("Add two integers.".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "a": { "type": "integer" },
                        "b": { "type": "integer" }
                    },
                    "required": ["a", "b"]
                }),
            }],
            "3".to_string(),
        )
    }

    /// Replace the result text (builder).
    pub fn with_call_result(mut self, text: String) -> Self {
        self.call_result = text;
        self
    }

    /// Calls to `name` fail with `ToolSourceError::NotFound` (builder).
    pub fn with_missing(mut self, name: impl Into<String>) -> Self {
        self.missing.push(name.into());
        self
    }

    /// `(name, arguments)` of every call, in call order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }
        if self.missing.iter().any(|m| m == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        Ok(ToolCallContent::text(self.call_result.clone()))
    }
}
