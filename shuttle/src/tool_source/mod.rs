//! Tool source abstraction: list tools and call a tool.
//!
//! The loop depends on `ToolSource` instead of a concrete tool registry; implementations are
//! [`ToolRegistry`](crate::tools::ToolRegistry) (name → tool map) and [`MockToolSource`] (tests).

mod mock;

pub use mock::MockToolSource;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification sent to the model: name, description and JSON Schema of the arguments.
///
/// **Interaction**: Returned by `ToolSource::list_tools()`; bound to the client with
/// `ChatOpenAI::with_tools`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    /// Tool name the model uses in its tool calls.
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// Result of a single successful tool call.
///
/// **Interaction**: Returned by `ToolSource::call_tool()`; ActNode maps it to a `ToolResult`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    /// Result text appended to the history as a tool message.
    pub text: String,
    /// Explicit stop signal: the loop terminates after this dispatch round.
    pub finish: bool,
}

impl ToolCallContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish: false,
        }
    }

    /// Result text that also asks the loop to stop.
    pub fn finished(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish: true,
        }
    }
}

/// Errors from listing or calling tools.
///
/// **Interaction**: ActNode converts every variant into tool result text; none of them
/// aborts the loop.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tool timed out after {0:?}")]
    Timeout(Duration),
}

/// Tool source: list tools and call a tool.
///
/// **Interaction**: `list_tools()` feeds the model's tool binding; ActNode uses `call_tool()`.
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// List available tools.
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Call a tool by name with JSON arguments.
    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each ToolSourceError variant contains expected keywords.
    #[test]
    fn tool_source_error_display_all_variants() {
        let s = ToolSourceError::NotFound("x".into()).to_string();
        assert!(s.contains("not found"), "{}", s);
        let s = ToolSourceError::InvalidInput("bad".into()).to_string();
        assert!(s.contains("invalid"), "{}", s);
        let s = ToolSourceError::Execution("overflow".into()).to_string();
        assert!(s.contains("overflow"), "{}", s);
        let s = ToolSourceError::from(std::io::Error::other("disk")).to_string();
        assert!(s.contains("io error") && s.contains("disk"), "{}", s);
        let s = ToolSourceError::Timeout(Duration::from_secs(2)).to_string();
        assert!(s.contains("timed out"), "{}", s);
    }

    #[test]
    fn tool_call_content_constructors_set_finish() {
        assert!(!ToolCallContent::text("a").finish);
        let done = ToolCallContent::finished("saved");
        assert!(done.finish);
        assert_eq!(done.text, "saved");
    }
}
