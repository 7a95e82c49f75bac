//! # Shuttle
//!
//! A tool-use control loop for LLM agents and the small conversational agents built on it.
//!
//! The loop alternates between a model step and a tool-dispatch step over one append-only
//! conversation history, until a stop policy terminates it:
//!
//! ```text
//! AwaitingModel --(model asked for tools)--> DispatchingTools --> AwaitingModel ...
//!       \--(no tools / document saved / stop signal / turn limit)--> Terminated
//! ```
//!
//! ## Main modules
//!
//! - [`agent`]: [`agent::react`] ([`ToolLoop`], [`ThinkNode`], [`ActNode`], [`StopPolicy`],
//!   [`run_react`]), plus [`ChatSession`] and [`Drafter`].
//! - [`state`]: [`LoopState`], [`ConversationHistory`], [`ToolCall`], [`ToolResult`].
//! - [`llm`]: [`LlmClient`] trait, [`MockLlm`], OpenAI-compatible [`ChatOpenAI`].
//! - [`tool_source`]: [`ToolSource`], [`ToolSpec`], [`ToolCallContent`], [`MockToolSource`].
//! - [`tools`]: [`Tool`], [`ToolRegistry`], arithmetic tools and the document tools.
//! - [`memory`]: [`TranscriptStore`] for the plain-text conversation log.
//! - [`input`]: [`InputSource`] for interactive sessions.
//! - [`stream`]: [`LoopEvent`] and [`RunContext`] for observers.

pub mod agent;
pub mod error;
pub mod input;
pub mod llm;
pub mod memory;
pub mod message;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use agent::react::{
    run_react, saved_document_condition, ActNode, HandleToolErrors, LoopNode, StepKind,
    StopPolicy, ThinkNode, ToolLoop, ToolLoopConfig, DEFAULT_REACT_QUERY, REACT_SYSTEM_PROMPT,
};
pub use agent::{ChatMode, ChatSession, DraftOutcome, Drafter, SessionError};
pub use error::AgentError;
pub use input::{InputSource, ScriptedInput, StdinInput};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ToolChoiceMode};
pub use memory::{TranscriptError, TranscriptStore};
pub use message::Message;
pub use state::{
    ensure_unique_call_ids, ConversationHistory, LoopPhase, LoopState, TerminationReason, ToolCall, ToolResult};
pub use stream::{LoopEvent, MessageChunk, RunContext};
pub use tool_source::{MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
pub use tools::{arithmetic_registry, document_registry, DocumentSession, Tool, ToolRegistry};
