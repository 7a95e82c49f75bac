//! Act node: run the tool calls of the latest assistant message, append one tool message each.
//!
//! # Error Handling
//!
//! Tool failures never abort the loop. Unknown tools, invalid arguments, execution errors and
//! timeouts are all turned into result text (with `is_error` set) so the model can react:
//!
//! - `HandleToolErrors::Always(None)` - `"Failed to run <tool>: <error>"` (default)
//! - `HandleToolErrors::Always(Some(template))` - template with `{tool_name}`, `{tool_kwargs}`
//!   and `{error}` placeholders
//! - `HandleToolErrors::Custom(handler)` - custom formatter

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::AgentError;
use crate::message::Message;
use crate::state::{LoopState, ToolCall, ToolResult};
use crate::stream::{LoopEvent, RunContext};
use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError};

use super::LoopNode;

/// Default message for a failed tool call.
pub const DEFAULT_TOOL_ERROR_TEMPLATE: &str = "Failed to run {tool_name}: {error}";

/// Error formatter: `(error, tool_name, arguments) -> result text`.
pub type ErrorHandlerFn =
    Arc<dyn Fn(&ToolSourceError, &str, &Value) -> String + Send + Sync + 'static>;

/// How ActNode renders tool failures into result text.
#[derive(Clone)]
pub enum HandleToolErrors {
    Always(Option<String>),
    Custom(ErrorHandlerFn),
}

impl Default for HandleToolErrors {
    fn default() -> Self {
        Self::Always(None)
    }
}

impl std::fmt::Debug for HandleToolErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always(msg) => write!(f, "HandleToolErrors::Always({:?})", msg),
            Self::Custom(_) => write!(f, "HandleToolErrors::Custom(<fn>)"),
        }
    }
}

impl HandleToolErrors {
    fn render(&self, error: &ToolSourceError, tool_name: &str, tool_args: &Value) -> String {
        match self {
            Self::Always(template) => template
                .as_deref()
                .unwrap_or(DEFAULT_TOOL_ERROR_TEMPLATE)
                .replace("{tool_name}", tool_name)
                .replace("{tool_kwargs}", &tool_args.to_string())
                .replace("{error}", &error.to_string()),
            Self::Custom(handler) => handler(error, tool_name, tool_args),
        }
    }
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Tool-dispatch step.
pub struct ActNode {
    tools: Arc<dyn ToolSource>,
    handle_tool_errors: HandleToolErrors,
    parallel: bool,
    tool_timeout: Option<Duration>,
}

impl ActNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self {
            tools,
            handle_tool_errors: HandleToolErrors::default(),
            parallel: false,
            tool_timeout: None,
        }
    }

    pub fn with_handle_tool_errors(mut self, handle_tool_errors: HandleToolErrors) -> Self {
        self.handle_tool_errors = handle_tool_errors;
        self
    }

    /// Runs one turn's calls concurrently. Results are still appended in request order.
    pub fn with_parallel_dispatch(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fails a single call with `ToolSourceError::Timeout` after `limit`.
    pub fn with_tool_timeout(mut self, limit: Option<Duration>) -> Self {
        self.tool_timeout = limit;
        self
    }

    async fn invoke(&self, tc: &ToolCall) -> Result<ToolCallContent, ToolSourceError> {
        let call = self.tools.call_tool(&tc.name, tc.arguments.clone());
        match self.tool_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ToolSourceError::Timeout(limit))?,
            None => call.await,
        }
    }

    /// Runs one call; returns its result and whether it asked the loop to stop.
    async fn dispatch(&self, tc: &ToolCall, ctx: &RunContext) -> (ToolResult, bool) {
        debug!(tool = %tc.name, call_id = %tc.id, "act: calling tool");
        ctx.emit(LoopEvent::ToolCall {
            call_id: tc.id.clone(),
            name: tc.name.clone(),
            arguments: tc.arguments.clone(),
        })
        .await;

        match self.invoke(tc).await {
            Ok(content) => {
                trace!(
                    tool = %tc.name,
                    result = %truncate_for_log(&content.text, 200),
                    finish = content.finish,
                    "act: tool result"
                );
                let result = ToolResult {
                    call_id: tc.id.clone(),
                    name: tc.name.clone(),
                    content: content.text,
                    is_error: false,
                };
                (result, content.finish)
            }
            Err(e) => {
                warn!(tool = %tc.name, call_id = %tc.id, error = %e, "act: tool failed");
                let text = self.handle_tool_errors.render(&e, &tc.name, &tc.arguments);
                let result = ToolResult {
                    call_id: tc.id.clone(),
                    name: tc.name.clone(),
                    content: text,
                    is_error: true,
                };
                (result, false)
            }
        }
    }
}

#[async_trait]
impl LoopNode for ActNode {
    fn id(&self) -> &str {
        "act"
    }

    async fn run(&self, mut state: LoopState, ctx: &RunContext) -> Result<LoopState, AgentError> {
        let calls: Vec<ToolCall> = state.history.pending_tool_calls().to_vec();
        debug!(count = calls.len(), parallel = self.parallel, "act: dispatching tool calls");

        let outcomes = if self.parallel {
            join_all(calls.iter().map(|tc| self.dispatch(tc, ctx))).await
        } else {
            let mut outcomes = Vec::with_capacity(calls.len());
            for tc in &calls {
                outcomes.push(self.dispatch(tc, ctx).await);
            }
            outcomes
        };

        for (result, finish) in outcomes {
            if finish {
                state.stop_requested = true;
            }
            ctx.emit(LoopEvent::ToolResult(result.clone())).await;
            state.history.push(Message::Tool(result));
        }
        state.turn_count += 1;
        Ok(state)
    }
}
