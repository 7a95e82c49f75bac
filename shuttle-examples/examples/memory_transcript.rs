//! Remembering chat persisted to a transcript: the second session resumes from the file the
//! first one wrote.
//!
//! Run: `cargo run -p shuttle-examples --example memory_transcript`

use std::sync::Arc;

use shuttle::{ChatSession, LlmResponse, MockLlm, RunContext, ScriptedInput, ToolLoopConfig, TranscriptStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("shuttle-memory-example.txt");
    let _ = std::fs::remove_file(&path);

    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::text("Nice to meet you, Ada."),
        LlmResponse::text("Your name is Ada."),
    ]));

    let store = TranscriptStore::new(&path);
    let mut first =
        ChatSession::from_transcript(llm.clone(), ToolLoopConfig::default(), store.clone(), false)
            .await?;
    first
        .run_interactive(
            &mut ScriptedInput::new(["I'm Ada", "exit"]),
            &RunContext::default(),
            |reply| println!("AI: {}", reply),
        )
        .await?;

    let mut second =
        ChatSession::from_transcript(llm.clone(), ToolLoopConfig::default(), store, false).await?;
    println!("Loaded {} previous messages.", second.history().len());
    let reply = second.respond("What's my name?").await?;
    println!("AI: {}", reply);

    let last_request = llm.requests().pop().unwrap_or_default();
    println!("last request carried {} messages", last_request.len());
    println!("transcript:\n{}", std::fs::read_to_string(&path)?);
    Ok(())
}
