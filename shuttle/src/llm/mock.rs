//! Mock LLM for tests and examples.
//!
//! Replays a script of responses in order, then keeps returning a fallback response. Every
//! request is recorded so tests can assert what the model was shown (system prompt placement,
//! tool results, history growth).
//!
//! # Streaming Support
//!
//! - Default: sends content as a single chunk.
//! - Character-by-character: splits content into individual character chunks (for stream testing).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage};
use crate::message::Message;
use crate::state::ToolCall;
use crate::stream::MessageChunk;

enum Step {
    Reply(LlmResponse),
    Fail(String),
}

/// Mock LLM: scripted assistant turns.
///
/// **Interaction**: Implements `LlmClient`; used by ThinkNode in tests and examples.
pub struct MockLlm {
    script: Mutex<VecDeque<Step>>,
    /// Returned once the script is exhausted.
    fallback: LlmResponse,
    /// Attached to every response that has no usage of its own.
    usage: Option<LlmUsage>,
    requests: Mutex<Vec<Vec<Message>>>,
    stream_by_char: AtomicBool,
}

impl MockLlm {
    fn from_parts(script: VecDeque<Step>, fallback: LlmResponse) -> Self {
        Self {
            script: Mutex::new(script),
            fallback,
            usage: None,
            requests: Mutex::new(Vec::new()),
            stream_by_char: AtomicBool::new(false),
        }
    }

    /// Always returns the given content and tool calls.
    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::from_parts(
            VecDeque::new(),
            LlmResponse::with_tool_calls(content, tool_calls),
        )
    }

    /// Always returns assistant text and no tool calls (END path).
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::from_parts(VecDeque::new(), LlmResponse::text(content))
    }

    /// Returns the responses in order; afterwards repeats a text-only "Done." reply.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self::from_parts(
            responses.into_iter().map(Step::Reply).collect(),
            LlmResponse::text("Done."),
        )
    }

    /// First call requests `tool_calls`, every later call answers `final_text` without tools.
    pub fn first_tools_then_end(tool_calls: Vec<ToolCall>, final_text: impl Into<String>) -> Self {
        Self::from_parts(
            VecDeque::from([Step::Reply(LlmResponse::with_tool_calls("", tool_calls))]),
            LlmResponse::text(final_text),
        )
    }

    /// Every call fails with `AgentError::ModelInvocation(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        let mock = Self::from_parts(VecDeque::new(), LlmResponse::default());
        mock.push_failure(message);
        mock
    }

    /// Queues a failure after the currently scripted responses.
    pub fn push_failure(&self, message: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Step::Fail(message.into()));
        }
    }

    /// Attach usage to responses that carry none (builder).
    pub fn with_usage(mut self, usage: LlmUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Enable character-by-character streaming for `invoke_stream()`.
    pub fn with_stream_by_char(self) -> Self {
        self.stream_by_char.store(true, Ordering::SeqCst);
        self
    }

    /// Messages received by each `invoke` call, in call order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn next_step(&self) -> Step {
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted.unwrap_or_else(|| Step::Reply(self.fallback.clone()))
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        match self.next_step() {
            Step::Reply(mut response) => {
                if response.usage.is_none() {
                    response.usage = self.usage.clone();
                }
                Ok(response)
            }
            Step::Fail(message) => {
                // Failures repeat on every later call.
                self.push_failure(message.clone());
                Err(AgentError::ModelInvocation(message))
            }
        }
    }

    async fn invoke_stream(
        &self,
        messages: &[Message],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<LlmResponse, AgentError> {
        let response = self.invoke(messages).await?;

        if let Some(tx) = chunk_tx {
            if !response.content.is_empty() {
                if self.stream_by_char.load(Ordering::SeqCst) {
                    for c in response.content.chars() {
                        let _ = tx
                            .send(MessageChunk {
                                content: c.to_string(),
                            })
                            .await;
                    }
                } else {
                    let _ = tx
                        .send(MessageChunk {
                            content: response.content.clone(),
                        })
                        .await;
                }
            }
        }

        Ok(response)
    }
}
