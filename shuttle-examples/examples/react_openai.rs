//! ReAct arithmetic loop against a real OpenAI-compatible endpoint.
//!
//! Reads `.env` / `$XDG_CONFIG_HOME/shuttle/config.toml` like the CLI, then needs
//! `OPENAI_API_KEY` (or `GOOGLE_API_KEY`).
//!
//! Run: `cargo run -p shuttle-examples --example react_openai -- "What is 7 times 6?"`

use std::sync::Arc;

use config::{ModelSettings, Provider};
use shuttle::llm::GEMINI_OPENAI_BASE;
use shuttle::{arithmetic_registry, run_react, ChatOpenAI, RunContext, ToolLoopConfig, DEFAULT_REACT_QUERY};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply("shuttle", None)?;
    let settings = ModelSettings::from_env()?;
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_REACT_QUERY.to_string());

    let mut openai_config = shuttle::llm::OpenAIConfig::new();
    if let Some(key) = &settings.api_key {
        openai_config = openai_config.with_api_key(key);
    }
    match (&settings.base_url, settings.provider) {
        (Some(base), _) => openai_config = openai_config.with_api_base(base),
        (None, Provider::Gemini) => openai_config = openai_config.with_api_base(GEMINI_OPENAI_BASE),
        (None, Provider::OpenAiCompatible) => {}
    }
    let llm = ChatOpenAI::with_config(openai_config, settings.model.clone())
        .with_tools(arithmetic_registry().list());

    let config = ToolLoopConfig {
        model_timeout: settings.timeout,
        ..ToolLoopConfig::default()
    };
    let state = run_react(Arc::new(llm), &query, config, &RunContext::default()).await?;
    println!("{}", state.last_assistant_reply().unwrap_or("(no reply)"));
    Ok(())
}
