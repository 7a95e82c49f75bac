//! Continuation predicate: decides after each step whether the loop terminates.

use crate::message::Message;
use crate::state::{ConversationHistory, LoopState, TerminationReason};

/// Which step just ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Think,
    Act,
}

/// Termination rules, checked in a fixed order after every step:
///
/// 1. `stop_on_saved_document` and any tool message reports a saved document
/// 2. a tool returned an explicit stop signal
/// 3. the latest assistant message requested no tools
/// 4. `max_turns` dispatch rounds completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopPolicy {
    pub stop_on_saved_document: bool,
    pub max_turns: Option<u32>,
}

impl StopPolicy {
    pub fn evaluate(&self, state: &LoopState, after: StepKind) -> Option<TerminationReason> {
        if self.stop_on_saved_document && saved_document_condition(&state.history) {
            return Some(TerminationReason::DocumentSaved);
        }
        if state.stop_requested {
            return Some(TerminationReason::ToolRequestedStop);
        }
        if state.history.pending_tool_calls().is_empty() {
            return Some(TerminationReason::NoToolCalls);
        }
        if after == StepKind::Act {
            if let Some(max) = self.max_turns {
                if state.turn_count >= max {
                    return Some(TerminationReason::MaxTurns);
                }
            }
        }
        None
    }
}

/// True when any tool message (scanning newest first) mentions both "saved" and "document",
/// case-insensitively.
pub fn saved_document_condition(history: &ConversationHistory) -> bool {
    history.iter().rev().any(|m| match m {
        Message::Tool(r) => {
            let text = r.content.to_lowercase();
            text.contains("saved") && text.contains("document")
        }
        _ => false,
    })
}
