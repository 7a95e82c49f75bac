//! ReAct arithmetic loop with a scripted model: add 14 + 22, multiply by 3, answer.
//!
//! Run: `cargo run -p shuttle-examples --example react_scripted`

use std::sync::Arc;

use serde_json::json;
use shuttle::{
    run_react, LlmResponse, Message, MockLlm, RunContext, ToolCall, ToolLoopConfig,
    DEFAULT_REACT_QUERY,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::with_tool_calls(
            "",
            vec![ToolCall::new("call_1", "add", json!({"a": 14, "b": 22}))],
        ),
        LlmResponse::with_tool_calls(
            "",
            vec![ToolCall::new("call_2", "multiply", json!({"a": 36, "b": 3}))],
        ),
        LlmResponse::text("14 + 22 = 36, and 36 × 3 = 108."),
    ]));

    let state = run_react(
        llm,
        DEFAULT_REACT_QUERY,
        ToolLoopConfig::default(),
        &RunContext::default(),
    )
    .await?;

    for message in state.history.iter() {
        match message {
            Message::User(text) => println!("Human: {}", text),
            Message::Assistant { content, tool_calls } => {
                for call in tool_calls {
                    println!("AI -> {}({})", call.name, call.arguments);
                }
                if !content.is_empty() {
                    println!("AI: {}", content);
                }
            }
            Message::Tool(result) => println!("Tool {}: {}", result.name, result.content),
            Message::System(_) => {}
        }
    }
    println!("terminated: {:?}", state.termination);
    Ok(())
}
