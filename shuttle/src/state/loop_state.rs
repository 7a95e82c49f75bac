//! Loop state and tool types for the tool-use control loop.
//!
//! LoopState holds the conversation history plus the control-loop bookkeeping (phase, turn
//! count, stop signal, usage). ThinkNode and ActNode read and write it; ToolLoop decides the
//! next phase after each step.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::LlmUsage;
use crate::message::Message;

use super::ConversationHistory;

/// A single tool invocation produced by the LLM (Think node) and consumed by Act.
///
/// `id` is unique within one assistant turn and is echoed back by exactly one
/// [`ToolResult::call_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id (provider id, or a synthesized `call_<uuid>`).
    pub id: String,
    /// Tool name as registered in the ToolSource.
    pub name: String,
    /// Arguments object: parameter name to value.
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// New `call_<uuid>` id for a call the provider left without one.
    pub fn fresh_id() -> String {
        format!("call_{}", uuid::Uuid::new_v4().simple())
    }
}

/// Gives every call in one assistant turn a distinct, non-empty id. Empty ids and repeats of
/// an earlier id in the turn are replaced with [`ToolCall::fresh_id`]. Returns how many ids
/// were replaced.
pub fn ensure_unique_call_ids(calls: &mut [ToolCall]) -> usize {
    let mut seen = HashSet::with_capacity(calls.len());
    let mut replaced = 0;
    for call in calls.iter_mut() {
        if call.id.is_empty() || seen.contains(&call.id) {
            call.id = ToolCall::fresh_id();
            replaced += 1;
        }
        seen.insert(call.id.clone());
    }
    replaced
}

/// Result of executing one tool call (Act node output), appended as [`Message::Tool`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool call this result belongs to.
    pub call_id: String,
    /// Name of the tool that was requested.
    pub name: String,
    /// Result text, or the failure description when `is_error` is set.
    pub content: String,
    /// True when the tool was unknown or failed.
    #[serde(default)]
    pub is_error: bool,
}

/// Phase of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopPhase {
    /// Next step invokes the model.
    #[default]
    AwaitingModel,
    /// Next step dispatches the tool calls of the latest assistant message.
    DispatchingTools,
    /// No further model or tool invocations.
    Terminated,
}

/// Why the loop reached [`LoopPhase::Terminated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The latest assistant message requested no tools.
    NoToolCalls,
    /// A tool result reported that the document was saved.
    DocumentSaved,
    /// A tool returned an explicit stop signal.
    ToolRequestedStop,
    /// The configured maximum number of dispatch rounds was reached.
    MaxTurns,
}

/// State threaded through ThinkNode → ActNode → ThinkNode … until terminated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoopState {
    /// Append-only conversation history.
    pub history: ConversationHistory,
    /// Current phase; ToolLoop dispatches on it.
    #[serde(default)]
    pub phase: LoopPhase,
    /// Number of dispatch rounds completed in this state.
    #[serde(default)]
    pub turn_count: u32,
    /// Set by ActNode when a tool returned an explicit stop signal.
    #[serde(default)]
    pub stop_requested: bool,
    /// Set by ToolLoop when entering `Terminated`.
    #[serde(default)]
    pub termination: Option<TerminationReason>,
    /// Token usage of the last model call, when the provider reports it.
    #[serde(default)]
    pub usage: Option<LlmUsage>,
    /// Usage accumulated over every model call of this state.
    #[serde(default)]
    pub total_usage: Option<LlmUsage>,
}

impl LoopState {
    /// Fresh state in `AwaitingModel` over the given history.
    pub fn new(history: impl Into<ConversationHistory>) -> Self {
        Self {
            history: history.into(),
            ..Self::default()
        }
    }

    /// Appends a user message and re-arms the loop for another run.
    ///
    /// Used by interactive sessions after a run ended with [`TerminationReason::NoToolCalls`].
    pub fn resume_with_user(&mut self, input: impl Into<String>) {
        self.history.push(Message::user(input));
        self.phase = LoopPhase::AwaitingModel;
        self.termination = None;
        self.stop_requested = false;
    }

    /// Content of the chronologically last assistant message, if any.
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.history.last_assistant_reply()
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == LoopPhase::Terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_or_empty_call_ids_are_replaced() {
        let mut calls = vec![
            ToolCall::new("dup", "add", json!({"a": 1, "b": 1})),
            ToolCall::new("dup", "multiply", json!({"a": 5, "b": 5})),
            ToolCall::new("", "add", json!({"a": 0, "b": 0})),
            ToolCall::new("other", "add", json!({"a": 2, "b": 2})),
        ];

        assert_eq!(ensure_unique_call_ids(&mut calls), 2);

        assert_eq!(calls[0].id, "dup");
        assert!(calls[1].id.starts_with("call_"));
        assert!(calls[2].id.starts_with("call_"));
        assert_eq!(calls[3].id, "other");
        let ids: HashSet<&str> = calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn new_state_starts_awaiting_model() {
        let state = LoopState::new(vec![Message::user("hi")]);
        assert_eq!(state.phase, LoopPhase::AwaitingModel);
        assert_eq!(state.turn_count, 0);
        assert!(state.termination.is_none());
        assert_eq!(state.history.len(), 1);
    }

    /// **Scenario**: resume_with_user appends the input and clears the terminal markers.
    #[test]
    fn resume_with_user_rearms_terminated_state() {
        let mut state = LoopState::new(vec![Message::user("hi"), Message::assistant("hello")]);
        state.phase = LoopPhase::Terminated;
        state.termination = Some(TerminationReason::NoToolCalls);
        state.stop_requested = true;

        state.resume_with_user("next");

        assert_eq!(state.phase, LoopPhase::AwaitingModel);
        assert!(state.termination.is_none());
        assert!(!state.stop_requested);
        assert_eq!(state.history.last(), Some(&Message::user("next")));
    }

    #[test]
    fn tool_result_is_error_defaults_to_false_when_missing() {
        let r: ToolResult =
            serde_json::from_value(json!({ "call_id": "c", "name": "add", "content": "3" }))
                .unwrap();
        assert!(!r.is_error);
    }
}
