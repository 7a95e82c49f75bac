use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};

/// A single tool the model can call.
///
/// Each tool has a unique name, a specification (description and JSON schema) and the call
/// logic. Tools are registered with [`ToolRegistry`](crate::tools::ToolRegistry), which exposes
/// them as a `ToolSource`.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use shuttle::tools::Tool;
/// use shuttle::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn spec(&self) -> ToolSpec {
///         ToolSpec {
///             name: "echo".to_string(),
///             description: Some("Echo the arguments.".to_string()),
///             input_schema: serde_json::json!({ "type": "object" }),
///         }
///     }
///
///     async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
///         Ok(ToolCallContent::text(args.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of this tool within a registry.
    fn name(&self) -> &str;

    /// Specification sent to the model. `spec().name` equals `name()`.
    fn spec(&self) -> ToolSpec;

    /// Executes the tool.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for missing or mistyped arguments, `Execution`/`Io` for failures while
    /// running. The loop turns either into result text for the model.
    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError>;
}
