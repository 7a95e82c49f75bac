//! LLM client abstraction for the Think node.
//!
//! ThinkNode depends on a callable that returns assistant text and optional tool calls; this
//! module defines the trait, a scripted mock and an OpenAI-compatible implementation.
//!
//! # Streaming Support
//!
//! `invoke_stream()` accepts an optional `Sender<MessageChunk>` for emitting tokens as they
//! arrive. Whatever the transport, the returned [`LlmResponse`] is always the complete,
//! buffered message: the loop only ever appends whole assistant turns.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use async_openai::config::OpenAIConfig;
pub use openai::{ChatOpenAI, GEMINI_OPENAI_BASE};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;
use crate::stream::MessageChunk;

/// Tool choice mode for chat completions: when tools are present, controls whether
/// the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    /// Model can pick between message or tool calls. Default when tools are present.
    #[default]
    Auto,
    /// Model will not call any tool.
    None,
    /// Model must call one or more tools.
    Required,
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Token usage for one LLM call (prompt + completion).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    /// Tokens in the prompt (input).
    pub prompt_tokens: u32,
    /// Tokens in the completion (output).
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Field-wise sum, saturating.
    pub fn add(&self, other: &LlmUsage) -> LlmUsage {
        LlmUsage {
            prompt_tokens: self.prompt_tokens.saturating_add(other.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(other.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(other.total_tokens),
        }
    }
}

/// Response from an LLM completion: assistant message text and tool calls.
///
/// **Interaction**: Returned by `LlmClient::invoke()`; ThinkNode appends it to the history as
/// one [`Message::Assistant`].
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls from this turn, in the order the model produced them. Empty ends the loop.
    pub tool_calls: Vec<ToolCall>,
    /// Token usage for this call, when available.
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    /// Text-only response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
            usage: None,
        }
    }

    /// Response requesting tools.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
            usage: None,
        }
    }
}

/// LLM client: given messages, returns assistant text and optional tool calls.
///
/// Tools are bound to the client once at setup (see [`ChatOpenAI::with_tools`]), so `invoke`
/// only receives the history.
///
/// **Interaction**: Used by ThinkNode.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content and tool calls.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// Streaming variant: when `chunk_tx` is `Some`, send text chunks as they arrive and
    /// still return the complete response at the end.
    ///
    /// Default implementation calls `invoke()` and sends the full content as one chunk.
    async fn invoke_stream(
        &self,
        messages: &[Message],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<LlmResponse, AgentError> {
        let response = self.invoke(messages).await?;

        if let Some(tx) = chunk_tx {
            if !response.content.is_empty() {
                let _ = tx
                    .send(MessageChunk {
                        content: response.content.clone(),
                    })
                    .await;
            }
        }

        Ok(response)
    }
}
