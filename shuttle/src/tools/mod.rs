//! Tools exposed to the model and the registry that dispatches them.

mod arithmetic;
pub mod document;
mod registry;
mod r#trait;

pub use arithmetic::{arithmetic_registry, ArithmeticTool, TOOL_ADD, TOOL_MULTIPLY, TOOL_SUBTRACT};
pub use document::{
    document_registry, DocumentSession, SaveTool, UpdateTool, TOOL_SAVE, TOOL_UPDATE,
};
pub use r#trait::Tool;
pub use registry::ToolRegistry;
