//! Think node: send the history to the model, append one assistant message.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage};
use crate::message::Message;
use crate::state::{ensure_unique_call_ids, LoopState};
use crate::stream::{LoopEvent, MessageChunk, RunContext};

use super::LoopNode;

/// Replaces an empty reply that also requested no tools.
pub const EMPTY_REPLY_FALLBACK: &str =
    "No text response from the model. Please try again or check the API.";

/// System prompt prepended to each model call.
#[derive(Clone)]
pub enum SystemPrompt {
    Static(String),
    /// Evaluated on every call (e.g. to show the current document).
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl SystemPrompt {
    pub fn render(&self) -> String {
        match self {
            SystemPrompt::Static(s) => s.clone(),
            SystemPrompt::Dynamic(f) => f(),
        }
    }
}

impl fmt::Debug for SystemPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(s) => write!(f, "SystemPrompt::Static({:?})", s),
            Self::Dynamic(_) => write!(f, "SystemPrompt::Dynamic(<fn>)"),
        }
    }
}

/// Model-invocation step.
///
/// Never retries: a model error or timeout propagates and ends the run.
pub struct ThinkNode {
    llm: Arc<dyn LlmClient>,
    system_prompt: Option<SystemPrompt>,
    timeout: Option<Duration>,
}

impl ThinkNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: None,
            timeout: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(SystemPrompt::Static(prompt.into()));
        self
    }

    pub fn with_dynamic_system_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.system_prompt = Some(SystemPrompt::Dynamic(Arc::new(prompt)));
        self
    }

    /// Fails the step with `AgentError::Timeout` when the model takes longer than `limit`.
    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Messages sent to the model: the system prompt (unless the history already starts with
    /// one) followed by the full history.
    pub fn request_messages(&self, state: &LoopState) -> Vec<Message> {
        let history = state.history.as_slice();
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            if !matches!(history.first(), Some(Message::System(_))) {
                messages.push(Message::system(prompt.render()));
            }
        }
        messages.extend_from_slice(history);
        messages
    }

    async fn call_model(
        &self,
        messages: &[Message],
        ctx: &RunContext,
    ) -> Result<LlmResponse, AgentError> {
        let streaming = ctx.stream_tokens && ctx.event_tx.is_some();
        let invoke = async {
            if streaming {
                let (chunk_tx, mut chunk_rx) = mpsc::channel::<MessageChunk>(64);
                let forward = async {
                    while let Some(chunk) = chunk_rx.recv().await {
                        ctx.emit(LoopEvent::MessageChunk(chunk)).await;
                    }
                };
                let (result, ()) =
                    tokio::join!(self.llm.invoke_stream(messages, Some(chunk_tx)), forward);
                result
            } else {
                self.llm.invoke(messages).await
            }
        };
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, invoke)
                .await
                .map_err(|_| AgentError::Timeout(limit))?,
            None => invoke.await,
        }
    }
}

fn merge_usage(total: &Option<LlmUsage>, usage: &Option<LlmUsage>) -> Option<LlmUsage> {
    match (total, usage) {
        (Some(t), Some(u)) => Some(t.add(u)),
        (None, Some(u)) => Some(u.clone()),
        (Some(t), None) => Some(t.clone()),
        (None, None) => None,
    }
}

#[async_trait]
impl LoopNode for ThinkNode {
    fn id(&self) -> &str {
        "think"
    }

    async fn run(&self, mut state: LoopState, ctx: &RunContext) -> Result<LoopState, AgentError> {
        let messages = self.request_messages(&state);
        debug!(message_count = messages.len(), turn = state.turn_count, "think: invoking model");
        let response = self.call_model(&messages, ctx).await?;

        let content = if response.content.is_empty() && response.tool_calls.is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            response.content
        };
        let mut tool_calls = response.tool_calls;
        let replaced = ensure_unique_call_ids(&mut tool_calls);
        if replaced > 0 {
            warn!(replaced, "think: model returned empty or repeated tool call ids");
        }
        let tool_names: Vec<String> = tool_calls.iter().map(|tc| tc.name.clone()).collect();
        trace!(content = %content, tools = ?tool_names, "think: model reply");

        state.total_usage = merge_usage(&state.total_usage, &response.usage);
        state.usage = response.usage.clone();
        state
            .history
            .push(Message::assistant_with_tools(content.clone(), tool_calls));

        ctx.emit(LoopEvent::Assistant {
            content,
            tool_names,
        })
        .await;
        if let Some(usage) = response.usage {
            ctx.emit(LoopEvent::Usage(usage)).await;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::state::ToolCall;
    use serde_json::json;

    #[tokio::test]
    async fn appends_one_assistant_message_with_tool_calls() {
        let llm = Arc::new(MockLlm::new(
            "",
            vec![ToolCall::new("c1", "add", json!({"a": 1, "b": 2}))],
        ));
        let node = ThinkNode::new(llm);
        let state = LoopState::new(vec![Message::user("1+2")]);

        let out = node.run(state, &RunContext::default()).await.unwrap();

        assert_eq!(out.history.len(), 2);
        assert_eq!(out.history.pending_tool_calls().len(), 1);
    }

    #[tokio::test]
    async fn repeated_tool_call_ids_are_made_unique_within_the_turn() {
        let llm = Arc::new(MockLlm::new(
            "",
            vec![
                ToolCall::new("dup", "add", json!({"a": 1, "b": 1})),
                ToolCall::new("dup", "multiply", json!({"a": 5, "b": 5})),
            ],
        ));
        let node = ThinkNode::new(llm);

        let out = node
            .run(LoopState::new(vec![Message::user("go")]), &RunContext::default())
            .await
            .unwrap();

        let calls = out.history.pending_tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "dup");
        assert_ne!(calls[1].id, "dup");
        assert!(calls[1].id.starts_with("call_"));
    }

    #[tokio::test]
    async fn empty_reply_without_tools_uses_fallback_text() {
        let node = ThinkNode::new(Arc::new(MockLlm::with_no_tool_calls("")));
        let out = node
            .run(LoopState::new(vec![Message::user("hi")]), &RunContext::default())
            .await
            .unwrap();
        assert_eq!(out.last_assistant_reply(), Some(EMPTY_REPLY_FALLBACK));
    }

    /// **Scenario**: the system prompt is prepended to the request but not stored in history.
    #[tokio::test]
    async fn system_prompt_prepended_only_to_request() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("ok"));
        let node = ThinkNode::new(llm.clone()).with_system_prompt("be brief");
        let out = node
            .run(LoopState::new(vec![Message::user("hi")]), &RunContext::default())
            .await
            .unwrap();

        let sent = &llm.requests()[0];
        assert_eq!(sent[0], Message::system("be brief"));
        assert_eq!(sent[1], Message::user("hi"));
        assert!(!matches!(out.history.first(), Some(Message::System(_))));
    }

    #[test]
    fn system_prompt_not_duplicated_when_history_has_one() {
        let node = ThinkNode::new(Arc::new(MockLlm::with_no_tool_calls("ok")))
            .with_system_prompt("ignored");
        let state = LoopState::new(vec![Message::system("own"), Message::user("hi")]);
        let sent = node.request_messages(&state);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], Message::system("own"));
    }

    #[test]
    fn dynamic_system_prompt_is_evaluated_per_call() {
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let c = counter.clone();
        let node = ThinkNode::new(Arc::new(MockLlm::with_no_tool_calls("ok")))
            .with_dynamic_system_prompt(move || {
                let n = c.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                format!("call {}", n)
            });
        let state = LoopState::new(vec![Message::user("hi")]);
        assert_eq!(node.request_messages(&state)[0], Message::system("call 0"));
        assert_eq!(node.request_messages(&state)[0], Message::system("call 1"));
    }

    #[tokio::test]
    async fn usage_accumulates_into_total() {
        let usage = LlmUsage {
            prompt_tokens: 3,
            completion_tokens: 2,
            total_tokens: 5,
        };
        let node =
            ThinkNode::new(Arc::new(MockLlm::with_no_tool_calls("ok").with_usage(usage.clone())));
        let state = node
            .run(LoopState::new(vec![Message::user("a")]), &RunContext::default())
            .await
            .unwrap();
        let state = node.run(state, &RunContext::default()).await.unwrap();
        assert_eq!(state.usage, Some(usage));
        assert_eq!(state.total_usage.map(|u| u.total_tokens), Some(10));
    }

    #[tokio::test]
    async fn model_error_propagates() {
        let node = ThinkNode::new(Arc::new(MockLlm::failing("boom")));
        let err = node
            .run(LoopState::new(vec![Message::user("a")]), &RunContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ModelInvocation(m) if m == "boom"));
    }

    #[tokio::test]
    async fn streaming_forwards_chunks_as_events() {
        let node = ThinkNode::new(Arc::new(
            MockLlm::with_no_tool_calls("hey").with_stream_by_char(),
        ));
        let (tx, mut rx) = mpsc::channel(32);
        let ctx = RunContext::with_events(tx).streaming_tokens();
        node.run(LoopState::new(vec![Message::user("a")]), &ctx)
            .await
            .unwrap();
        drop(ctx);

        let mut chunks = String::new();
        while let Some(event) = rx.recv().await {
            if let LoopEvent::MessageChunk(c) = event {
                chunks.push_str(&c.content);
            }
        }
        assert_eq!(chunks, "hey");
    }
}
