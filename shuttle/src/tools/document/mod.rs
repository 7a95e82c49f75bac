//! Document drafting tools: `update` replaces the content, `save` writes it to a text file.
//!
//! Both tools share one [`DocumentSession`] by `Arc`; the drafter reads the same session to
//! show the current content in its system prompt.

mod save;
mod session;
mod update;

pub use save::{SaveTool, TOOL_SAVE};
pub use session::DocumentSession;
pub use update::{UpdateTool, TOOL_UPDATE};

use std::sync::Arc;

use crate::tools::ToolRegistry;

/// Registry holding `update` and `save` over `session`.
pub fn document_registry(session: Arc<DocumentSession>) -> ToolRegistry {
    ToolRegistry::new()
        .with(Box::new(UpdateTool::new(Arc::clone(&session))))
        .with(Box::new(SaveTool::new(session)))
}
