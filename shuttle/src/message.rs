//! Message types for the conversation history.
//!
//! Message roles: System (usually first in the list), User, Assistant (with the tool calls it
//! requested) and Tool (the result of one of those calls). The set is closed; consumers match
//! exhaustively instead of inspecting types at runtime.

use serde::{Deserialize, Serialize};

use crate::state::{ToolCall, ToolResult};

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// System prompt; typically placed first in the message list.
    System(String),
    /// User input.
    User(String),
    /// Model reply. `tool_calls` is empty when the model asked for no tools.
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool call, correlated by `ToolResult::call_id`.
    Tool(ToolResult),
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Creates an assistant message without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: vec![],
        }
    }

    /// Creates an assistant message that requests the given tool calls.
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Text content of the message, whatever its role.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) => s,
            Message::Assistant { content, .. } => content,
            Message::Tool(r) => &r.content,
        }
    }

    /// Short role label, used for display and logs.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool(_) => "tool",
        }
    }
}
