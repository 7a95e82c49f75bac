//! OpenAI-compatible Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Works with any endpoint that speaks the Chat Completions protocol, including Gemini's
//! OpenAI-compatible endpoint ([`GEMINI_OPENAI_BASE`]). Tools bound with
//! [`ChatOpenAI::with_tools`] are sent on every request; the history (assistant tool calls and
//! tool results included) is replayed in full each turn.
//!
//! # Streaming
//!
//! `invoke_stream()` uses `create_stream` and forwards `choices[0].delta.content` as
//! [`MessageChunk`]s. Tool-call deltas are accumulated by index and returned in request order
//! once the stream ends, so the caller always receives one complete message.
//!
//! **Interaction**: Implements `LlmClient`; used by ThinkNode like `MockLlm`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, trace, warn};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, ToolChoiceMode};
use crate::message::Message;
use crate::state::ToolCall;
use crate::stream::MessageChunk;
use crate::tool_source::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObject, ToolChoiceOptions,
    },
    Client,
};

/// Gemini's OpenAI-compatible API base.
pub const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// OpenAI Chat Completions client implementing `LlmClient`.
///
/// Uses `OPENAI_API_KEY` from the environment by default, or the config passed to
/// [`ChatOpenAI::with_config`].
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
    tool_choice: Option<ToolChoiceMode>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            tools: None,
            temperature: None,
            tool_choice: None,
        }
    }

    /// Set tools for this completion (enables tool_calls in response). An empty list binds nothing.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tool choice mode. When unset the API default (auto) applies.
    pub fn with_tool_choice(mut self, mode: ToolChoiceMode) -> Self {
        self.tool_choice = Some(mode);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chat completions URL for logging (base from OPENAI_BASE_URL or OPENAI_API_BASE env,
    /// else default). Does not append /v1 when base already ends with /v1.
    fn chat_completions_url() -> String {
        let base = std::env::var("OPENAI_BASE_URL")
            .or_else(|_| std::env::var("OPENAI_API_BASE"))
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let base = base.trim_end_matches('/');
        if base.ends_with("/v1") || base.ends_with("/openai") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    /// Convert the history to request messages, replaying tool calls and tool results.
    fn messages_to_request(
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => Ok(ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                )),
                Message::User(s) => Ok(ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                )),
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                    if !content.is_empty() || tool_calls.is_empty() {
                        args.content(content.as_str());
                    }
                    if !tool_calls.is_empty() {
                        let calls: Vec<ChatCompletionMessageToolCalls> = tool_calls
                            .iter()
                            .map(|tc| {
                                ChatCompletionMessageToolCalls::Function(
                                    ChatCompletionMessageToolCall {
                                        id: tc.id.clone(),
                                        function: FunctionCall {
                                            name: tc.name.clone(),
                                            arguments: tc.arguments.to_string(),
                                        },
                                    },
                                )
                            })
                            .collect();
                        args.tool_calls(calls);
                    }
                    let msg = args.build().map_err(|e| {
                        AgentError::ModelInvocation(format!("assistant message build failed: {}", e))
                    })?;
                    Ok(ChatCompletionRequestMessage::Assistant(msg))
                }
                Message::Tool(result) => {
                    let msg = ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(result.call_id.clone())
                        .content(result.content.as_str())
                        .build()
                        .map_err(|e| {
                            AgentError::ModelInvocation(format!("tool message build failed: {}", e))
                        })?;
                    Ok(ChatCompletionRequestMessage::Tool(msg))
                }
            })
            .collect()
    }

    fn build_request(
        &self,
        messages: &[Message],
        stream: bool,
    ) -> Result<CreateChatCompletionRequest, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages)?);
        if stream {
            args.stream(true);
        }

        if let Some(ref tools) = self.tools {
            let chat_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);

            if let Some(mode) = self.tool_choice {
                let opt = match mode {
                    ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                    ToolChoiceMode::None => ToolChoiceOptions::None,
                    ToolChoiceMode::Required => ToolChoiceOptions::Required,
                };
                args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
            }
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        args.build()
            .map_err(|e| AgentError::ModelInvocation(format!("request build failed: {}", e)))
    }
}

/// Parses the raw arguments string of a tool call into a JSON object.
///
/// Empty input yields `{}`; a JSON string holding JSON is unwrapped once; anything that does
/// not parse is logged and replaced by `{}` so the tool reports the missing parameters.
pub(crate) fn parse_tool_arguments(arguments: &str) -> Value {
    if arguments.trim().is_empty() {
        return serde_json::json!({});
    }
    let raw = match serde_json::from_str::<Value>(arguments) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, arguments = %arguments, "tool arguments JSON parse failed, using empty object");
            return serde_json::json!({});
        }
    };
    match raw.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or_else(|e| {
            warn!(error = %e, "nested tool arguments JSON parse failed");
            raw.clone()
        }),
        None => raw,
    }
}

fn call_id_or_new(id: Option<String>) -> String {
    match id {
        Some(id) if !id.is_empty() => id,
        _ => ToolCall::fresh_id(),
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let request = self.build_request(messages, false)?;
        let url = Self::chat_completions_url();
        debug!(
            url = %url,
            model = %self.model,
            message_count = messages.len(),
            tools_count = self.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            temperature = ?self.temperature,
            tool_choice = ?self.tool_choice,
            "chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(url = %url, request = %js, "chat request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ModelInvocation(format!("API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(url = %url, response = %js, "chat response body");
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ModelInvocation("API returned no choices".to_string()))?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    id: call_id_or_new(Some(f.id)),
                    name: f.function.name,
                    arguments: parse_tool_arguments(&f.function.arguments),
                }),
                _ => None,
            })
            .collect();

        let usage = response.usage.map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        Ok(LlmResponse {
            content,
            tool_calls,
            usage,
        })
    }

    async fn invoke_stream(
        &self,
        messages: &[Message],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<LlmResponse, AgentError> {
        let Some(chunk_tx) = chunk_tx else {
            return self.invoke(messages).await;
        };

        let request = self.build_request(messages, true)?;
        debug!(
            url = %Self::chat_completions_url(),
            model = %self.model,
            message_count = messages.len(),
            stream = true,
            "chat create_stream"
        );

        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| AgentError::ModelInvocation(format!("stream error: {}", e)))?;

        let mut full_content = String::new();
        // index -> (id, name, arguments)
        let mut tool_call_map: BTreeMap<u32, (String, String, String)> = BTreeMap::new();
        let mut stream_usage: Option<LlmUsage> = None;

        while let Some(result) = stream.next().await {
            let response =
                result.map_err(|e| AgentError::ModelInvocation(format!("stream error: {}", e)))?;

            if let Some(ref u) = response.usage {
                stream_usage = Some(LlmUsage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                });
            }

            for choice in response.choices {
                let delta = &choice.delta;

                if let Some(ref content) = delta.content {
                    if !content.is_empty() {
                        full_content.push_str(content);
                        let _ = chunk_tx
                            .send(MessageChunk {
                                content: content.clone(),
                            })
                            .await;
                    }
                }

                if let Some(ref tool_calls) = delta.tool_calls {
                    for tc in tool_calls {
                        let entry = tool_call_map
                            .entry(tc.index)
                            .or_insert_with(|| (String::new(), String::new(), String::new()));
                        if let Some(ref id) = tc.id {
                            if !id.is_empty() {
                                entry.0 = id.clone();
                            }
                        }
                        if let Some(ref func) = tc.function {
                            if let Some(ref name) = func.name {
                                entry.1.push_str(name);
                            }
                            if let Some(ref args) = func.arguments {
                                entry.2.push_str(args);
                            }
                        }
                    }
                }
            }
        }

        let tool_calls: Vec<ToolCall> = tool_call_map
            .into_values()
            .map(|(id, name, arguments)| ToolCall {
                id: call_id_or_new(Some(id)),
                name,
                arguments: parse_tool_arguments(&arguments),
            })
            .collect();

        trace!(
            content = %full_content,
            tool_calls = ?tool_calls,
            usage = ?stream_usage,
            "chat stream response"
        );

        Ok(LlmResponse {
            content: full_content,
            tool_calls,
            usage: stream_usage,
        })
    }
}
