use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::Tool;

use super::DocumentSession;

/// Tool name for saving the document and finishing.
pub const TOOL_SAVE: &str = "save";

/// Writes the document to `<filename>.txt` under the session's output directory and asks the
/// loop to stop.
///
/// Write failures come back as ordinary result text (`Failed to save the document: ...`) so
/// the model can react; only a missing `filename` argument is an error.
pub struct SaveTool {
    session: Arc<DocumentSession>,
}

impl SaveTool {
    pub fn new(session: Arc<DocumentSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for SaveTool {
    fn name(&self) -> &str {
        TOOL_SAVE
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_SAVE.to_string(),
            description: Some(
                "Save the current document to a text file and finish the process.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": {
                        "type": "string",
                        "description": "Name for the text file."
                    }
                },
                "required": ["filename"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let filename = args
            .get("filename")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing filename".to_string()))?;
        match self.session.save_as(filename).await {
            Ok(saved) => {
                info!(file = %saved, dir = %self.session.output_dir().display(), "document saved");
                Ok(ToolCallContent::finished(format!(
                    "Document has been saved successfully as '{}'!",
                    saved
                )))
            }
            Err(e) => {
                warn!(error = %e, filename = %filename, "document save failed");
                Ok(ToolCallContent::text(format!(
                    "Failed to save the document: {}",
                    e
                )))
            }
        }
    }
}
