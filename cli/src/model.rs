//! Builds the chat model and loop options from [`ModelSettings`] plus command-line overrides.

use std::time::Duration;

use config::{ModelSettings, Provider};
use shuttle::llm::{OpenAIConfig, GEMINI_OPENAI_BASE};
use shuttle::{ChatOpenAI, ToolChoiceMode, ToolLoopConfig, ToolSpec};

/// Values given on the command line; each one replaces the resolved setting.
#[derive(Debug, Clone, Default)]
pub struct ModelOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout: Option<Duration>,
    /// Sent as `tool_choice` when tools are bound.
    pub tool_choice: Option<ToolChoiceMode>,
}

impl ModelOverrides {
    pub fn apply(&self, mut settings: ModelSettings) -> ModelSettings {
        if let Some(model) = self.model.as_ref().filter(|m| !m.trim().is_empty()) {
            settings.model = model.clone();
        }
        if let Some(t) = self.temperature {
            settings.temperature = Some(t);
        }
        if let Some(t) = self.timeout {
            settings.timeout = Some(t);
        }
        settings
    }
}

/// API base the client will talk to; `None` keeps the OpenAI default.
pub fn api_base(settings: &ModelSettings) -> Option<String> {
    match (&settings.base_url, settings.provider) {
        (Some(base), _) => Some(base.trim_end_matches('/').to_string()),
        (None, Provider::Gemini) => Some(GEMINI_OPENAI_BASE.to_string()),
        (None, Provider::OpenAiCompatible) => None,
    }
}

/// Chat client for `settings` with `tools` bound (none for plain chat).
pub fn build_llm(
    settings: &ModelSettings,
    tools: Vec<ToolSpec>,
    tool_choice: Option<ToolChoiceMode>,
) -> ChatOpenAI {
    let mut openai_config = OpenAIConfig::new();
    if let Some(key) = &settings.api_key {
        openai_config = openai_config.with_api_key(key);
    }
    if let Some(base) = api_base(settings) {
        openai_config = openai_config.with_api_base(base);
    }
    let mut client = ChatOpenAI::with_config(openai_config, settings.model.clone()).with_tools(tools);
    if let Some(t) = settings.temperature {
        client = client.with_temperature(t);
    }
    if let Some(mode) = tool_choice {
        client = client.with_tool_choice(mode);
    }
    client
}

/// Loop options carrying the model timeout.
pub fn loop_config(settings: &ModelSettings) -> ToolLoopConfig {
    ToolLoopConfig {
        model_timeout: settings.timeout,
        ..ToolLoopConfig::default()
    }
}
