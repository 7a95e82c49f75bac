//! ToolLoop: drives ThinkNode and ActNode through `AwaitingModel → DispatchingTools → …`
//! until the stop policy terminates the run.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::{LoopPhase, LoopState};
use crate::stream::{LoopEvent, RunContext};
use crate::tool_source::ToolSource;

use super::act_node::{ActNode, HandleToolErrors};
use super::stop::{StepKind, StopPolicy};
use super::think_node::ThinkNode;
use super::LoopNode;

/// Loop options. The default is the plain ReAct behaviour: stop when the model asks for no
/// tools, no turn limit, no timeouts, sequential dispatch.
#[derive(Debug, Clone, Default)]
pub struct ToolLoopConfig {
    /// Terminate once a tool message reports a saved document (drafting).
    pub stop_on_saved_document: bool,
    /// Terminate after this many dispatch rounds.
    pub max_turns: Option<u32>,
    pub model_timeout: Option<Duration>,
    pub tool_timeout: Option<Duration>,
    /// Dispatch one turn's tool calls concurrently.
    pub parallel_dispatch: bool,
}

impl ToolLoopConfig {
    pub fn stop_policy(&self) -> StopPolicy {
        StopPolicy {
            stop_on_saved_document: self.stop_on_saved_document,
            max_turns: self.max_turns,
        }
    }
}

/// The tool-use control loop.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use shuttle::{arithmetic_registry, MockLlm, ToolLoop, ToolLoopConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), shuttle::AgentError> {
/// let tool_loop = ToolLoop::new(
///     Arc::new(MockLlm::with_no_tool_calls("36")),
///     Arc::new(arithmetic_registry()),
///     ToolLoopConfig::default(),
/// );
/// let state = tool_loop.invoke("Add 14 + 22").await?;
/// assert_eq!(state.last_assistant_reply(), Some("36"));
/// # Ok(())
/// # }
/// ```
pub struct ToolLoop {
    think: ThinkNode,
    act: ActNode,
    policy: StopPolicy,
}

impl ToolLoop {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        config: ToolLoopConfig,
    ) -> Self {
        Self {
            think: ThinkNode::new(llm).with_timeout(config.model_timeout),
            act: ActNode::new(tools)
                .with_tool_timeout(config.tool_timeout)
                .with_parallel_dispatch(config.parallel_dispatch),
            policy: config.stop_policy(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.think = self.think.with_system_prompt(prompt);
        self
    }

    pub fn with_dynamic_system_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.think = self.think.with_dynamic_system_prompt(prompt);
        self
    }

    pub fn with_handle_tool_errors(mut self, handle_tool_errors: HandleToolErrors) -> Self {
        self.act = self.act.with_handle_tool_errors(handle_tool_errors);
        self
    }

    pub fn policy(&self) -> StopPolicy {
        self.policy
    }

    /// Runs a fresh state holding one user message.
    pub async fn invoke(&self, user_message: &str) -> Result<LoopState, AgentError> {
        self.run(LoopState::new(vec![Message::user(user_message)]))
            .await
    }

    pub async fn run(&self, state: LoopState) -> Result<LoopState, AgentError> {
        self.run_with_context(state, &RunContext::default()).await
    }

    /// Runs until terminated, emitting events through `ctx`.
    ///
    /// An already terminated state is returned unchanged.
    ///
    /// # Errors
    ///
    /// Only model failures (`ModelInvocation`, `Timeout`); tool failures become tool messages.
    pub async fn run_with_context(
        &self,
        mut state: LoopState,
        ctx: &RunContext,
    ) -> Result<LoopState, AgentError> {
        loop {
            let after = match state.phase {
                LoopPhase::AwaitingModel => {
                    ctx.emit(LoopEvent::PhaseEnter {
                        phase: LoopPhase::AwaitingModel,
                    })
                    .await;
                    state = self.step(&self.think, state, ctx).await?;
                    StepKind::Think
                }
                LoopPhase::DispatchingTools => {
                    ctx.emit(LoopEvent::PhaseEnter {
                        phase: LoopPhase::DispatchingTools,
                    })
                    .await;
                    state = self.step(&self.act, state, ctx).await?;
                    StepKind::Act
                }
                LoopPhase::Terminated => return Ok(state),
            };

            match self.policy.evaluate(&state, after) {
                Some(reason) => {
                    info!(
                        reason = ?reason,
                        turns = state.turn_count,
                        messages = state.history.len(),
                        "tool loop terminated"
                    );
                    state.phase = LoopPhase::Terminated;
                    state.termination = Some(reason);
                    ctx.emit(LoopEvent::Terminated { reason }).await;
                    return Ok(state);
                }
                None => {
                    state.phase = match after {
                        StepKind::Think => LoopPhase::DispatchingTools,
                        StepKind::Act => LoopPhase::AwaitingModel,
                    };
                }
            }
        }
    }

    async fn step(
        &self,
        node: &dyn LoopNode,
        state: LoopState,
        ctx: &RunContext,
    ) -> Result<LoopState, AgentError> {
        debug!(node = node.id(), turn = state.turn_count, "enter node");
        let out = node.run(state, ctx).await;
        if let Err(ref e) = out {
            debug!(node = node.id(), error = %e, "node failed");
        }
        out
    }
}
