//! Document drafter with a scripted model and scripted user input. The document is saved under
//! the system temp directory.
//!
//! Run: `cargo run -p shuttle-examples --example drafter_scripted`

use std::sync::Arc;

use serde_json::json;
use shuttle::{
    DocumentSession, Drafter, LlmResponse, LoopEvent, MockLlm, RunContext, ScriptedInput,
    ToolCall, ToolLoopConfig,
};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::env::temp_dir().join("shuttle-drafter-example");
    let document = Arc::new(DocumentSession::new(&out_dir));

    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::text("What would you like to create?"),
        LlmResponse::with_tool_calls(
            "",
            vec![ToolCall::new(
                "call_1",
                "update",
                json!({"content": "Team meeting moved to 5pm on Friday."}),
            )],
        ),
        LlmResponse::text("Updated. Anything else, or shall I save it?"),
        LlmResponse::with_tool_calls(
            "",
            vec![ToolCall::new("call_2", "save", json!({"filename": "meeting"}))],
        ),
    ]));

    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                LoopEvent::Assistant { content, tool_names } if tool_names.is_empty() => {
                    println!("AI: {}", content)
                }
                LoopEvent::Assistant { tool_names, .. } => println!("USING TOOLS: {:?}", tool_names),
                LoopEvent::ToolResult(result) => println!("TOOL RESULT: {}", result.content),
                _ => {}
            }
        }
    });

    let mut drafter = Drafter::new(llm, Arc::clone(&document), ToolLoopConfig::default());
    let mut input = ScriptedInput::new([
        "Write an email saying the meeting moved to 5pm",
        "Save it as meeting",
    ]);
    let ctx = RunContext::with_events(tx);
    let outcome = drafter.run(&mut input, &ctx).await?;
    drop(ctx);
    printer.await?;

    println!("outcome: {:?}", outcome);
    let saved = out_dir.join("meeting.txt");
    println!("{}:\n{}", saved.display(), std::fs::read_to_string(&saved)?);
    Ok(())
}
