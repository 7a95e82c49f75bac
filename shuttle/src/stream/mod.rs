//! Loop events for observers (CLI display, logs, tests).
//!
//! Nodes emit [`LoopEvent`]s through the optional sender held by [`RunContext`]. Emission is
//! best-effort: a dropped receiver never affects the run.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::llm::LlmUsage;
use crate::state::{LoopPhase, TerminationReason, ToolResult};

/// One token chunk of a streamed assistant reply.
#[derive(Clone, Debug, Serialize)]
pub struct MessageChunk {
    pub content: String,
}

/// Event emitted while the loop runs.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopEvent {
    /// The loop entered a phase (`AwaitingModel` or `DispatchingTools`).
    PhaseEnter { phase: LoopPhase },
    /// Partial assistant text while the model streams.
    MessageChunk(MessageChunk),
    /// Complete assistant message appended to the history.
    Assistant {
        content: String,
        tool_names: Vec<String>,
    },
    /// A tool is about to be invoked.
    ToolCall {
        call_id: String,
        name: String,
        arguments: Value,
    },
    /// A tool result was appended to the history.
    ToolResult(ToolResult),
    /// Token usage of one model call.
    Usage(LlmUsage),
    /// The loop reached `Terminated`.
    Terminated { reason: TerminationReason },
}

/// Per-run context handed to each node.
#[derive(Clone, Debug, Default)]
pub struct RunContext {
    /// When set, nodes emit [`LoopEvent`]s here.
    pub event_tx: Option<mpsc::Sender<LoopEvent>>,
    /// When true (and `event_tx` is set), ThinkNode streams token chunks.
    pub stream_tokens: bool,
}

impl RunContext {
    /// Context that emits events (without token streaming).
    pub fn with_events(event_tx: mpsc::Sender<LoopEvent>) -> Self {
        Self {
            event_tx: Some(event_tx),
            stream_tokens: false,
        }
    }

    /// Enables token chunk forwarding from the model.
    pub fn streaming_tokens(mut self) -> Self {
        self.stream_tokens = true;
        self
    }

    /// Sends an event when a sender is configured; ignores a closed receiver.
    pub async fn emit(&self, event: LoopEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}
