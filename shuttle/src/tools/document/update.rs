use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

use super::DocumentSession;

/// Tool name for replacing the document content.
pub const TOOL_UPDATE: &str = "update";

/// Replaces the whole document with the given content.
pub struct UpdateTool {
    session: Arc<DocumentSession>,
}

impl UpdateTool {
    pub fn new(session: Arc<DocumentSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for UpdateTool {
    fn name(&self) -> &str {
        TOOL_UPDATE
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_UPDATE.to_string(),
            description: Some("Updates the document with the provided content.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "The complete updated document content."
                    }
                },
                "required": ["content"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let content = args
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing content".to_string()))?;
        self.session.replace(content);
        Ok(ToolCallContent::text(format!(
            "Document has been updated successfully! The current content is:\n{}",
            content
        )))
    }
}
