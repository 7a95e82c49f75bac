//! State types for the tool-use control loop.
//!
//! # Main types
//!
//! - [`ConversationHistory`]: append-only message log.
//! - [`LoopState`]: history plus phase, turn count, stop signal and usage.
//! - [`ToolCall`]: one tool invocation requested by the model.
//! - [`ToolResult`]: outcome of one tool invocation, appended as a tool message.
//!
//! # Example
//!
//! ```rust
//! use shuttle::{LoopState, Message};
//!
//! let state = LoopState::new(vec![Message::user("What is 2+2?")]);
//! assert_eq!(state.history.len(), 1);
//! ```

mod history;
mod loop_state;

pub use history::ConversationHistory;
pub use loop_state::{
    ensure_unique_call_ids, LoopPhase, LoopState, TerminationReason, ToolCall, ToolResult,
};
