//! Agents built on the tool-use loop: plain chat, the document drafter and the ReAct runner.

mod chat;
mod drafter;
pub mod react;

pub use chat::{ChatMode, ChatSession, CHAT_INPUT_PROMPT};
pub use drafter::{
    drafter_system_prompt, DraftOutcome, Drafter, DRAFTER_INPUT_PROMPT, DRAFTER_OPENING,
};

use thiserror::Error;

use crate::error::AgentError;
use crate::memory::TranscriptError;

/// Errors from interactive sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}
