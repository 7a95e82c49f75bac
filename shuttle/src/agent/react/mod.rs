//! Tool-use control loop (ReAct): Think → Act → Think … until the stop policy fires.
//!
//! - [`ThinkNode`]: one model call, appends one assistant message.
//! - [`ActNode`]: runs the requested tools, appends one tool message per call.
//! - [`StopPolicy`]: continuation predicate evaluated after every step.
//! - [`ToolLoop`]: the three-state runner (`AwaitingModel`, `DispatchingTools`, `Terminated`).
//!
//! [`run_react`] wires the loop to the arithmetic tools with [`REACT_SYSTEM_PROMPT`].

mod act_node;
mod runner;
mod stop;
mod think_node;

pub use act_node::{ActNode, ErrorHandlerFn, HandleToolErrors, DEFAULT_TOOL_ERROR_TEMPLATE};
pub use runner::{ToolLoop, ToolLoopConfig};
pub use stop::{saved_document_condition, StepKind, StopPolicy};
pub use think_node::{SystemPrompt, ThinkNode, EMPTY_REPLY_FALLBACK};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::state::LoopState;
use crate::stream::RunContext;
use crate::tools::arithmetic_registry;

/// System prompt of the arithmetic ReAct agent.
pub const REACT_SYSTEM_PROMPT: &str =
    "You are my AI assistant, please answer my query to the best of your ability.";

/// Query used when none is given.
pub const DEFAULT_REACT_QUERY: &str = "Add 14 + 22 and then multiply the result by 3.";

/// One step of the loop.
#[async_trait]
pub trait LoopNode: Send + Sync {
    fn id(&self) -> &str;

    async fn run(&self, state: LoopState, ctx: &RunContext) -> Result<LoopState, AgentError>;
}

/// Runs `query` through a loop over the arithmetic tools.
///
/// `llm` must already have the arithmetic tool specs bound (see
/// [`ChatOpenAI::with_tools`](crate::llm::ChatOpenAI::with_tools)).
pub async fn run_react(
    llm: Arc<dyn LlmClient>,
    query: &str,
    config: ToolLoopConfig,
    ctx: &RunContext,
) -> Result<LoopState, AgentError> {
    let tool_loop = ToolLoop::new(llm, Arc::new(arithmetic_registry()), config)
        .with_system_prompt(REACT_SYSTEM_PROMPT);
    let state = LoopState::new(vec![crate::message::Message::user(query)]);
    tool_loop.run_with_context(state, ctx).await
}
