//! Chat sessions: interactive loop, exit sentinel and transcript persistence.

mod init_logging;

use std::sync::Arc;

use shuttle::memory::parse_transcript;
use shuttle::{
    ChatMode, ChatSession, LlmResponse, Message, MockLlm, RunContext, ScriptedInput,
    ToolLoopConfig, TranscriptStore,
};

#[tokio::test]
async fn interactive_stateless_chat_stops_at_exit() {
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::text("Hi!"),
        LlmResponse::text("Fine."),
    ]));
    let mut session = ChatSession::stateless(llm.clone());
    let mut input = ScriptedInput::new(["hello", "how are you?", "exit", "ignored"]);
    let mut replies = Vec::new();

    let turns = session
        .run_interactive(&mut input, &RunContext::default(), |r| replies.push(r.to_string()))
        .await
        .unwrap();

    assert_eq!(turns, 2);
    assert_eq!(replies, ["Hi!", "Fine."]);
    assert_eq!(llm.call_count(), 2);
    assert_eq!(session.mode(), ChatMode::Stateless);
}

/// **Scenario**: a remembering session resumes from the transcript file, sends the loaded
/// turns to the model and saves the extended conversation at the end.
#[tokio::test]
async fn memory_session_resumes_and_saves_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conversation_history.txt");
    std::fs::write(
        &path,
        "Conversation History:\nYou: My name is Ada.\nAI: Nice to meet you, Ada.\n\nEnd of Conversation\n",
    )
    .unwrap();

    let llm = Arc::new(MockLlm::with_no_tool_calls("Your name is Ada."));
    let mut session = ChatSession::from_transcript(
        llm.clone(),
        ToolLoopConfig::default(),
        TranscriptStore::new(&path),
        false,
    )
    .await
    .unwrap();
    let mut input = ScriptedInput::new(["What is my name?"]);

    session
        .run_interactive(&mut input, &RunContext::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(
        llm.requests()[0],
        vec![
            Message::user("My name is Ada."),
            Message::assistant("Nice to meet you, Ada."),
            Message::user("What is my name?"),
        ]
    );
    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(parse_transcript(&saved).len(), 4);
    assert!(saved.ends_with("AI: Your name is Ada.\n\nEnd of Conversation\n"));
}

#[tokio::test]
async fn autosave_writes_after_each_turn() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    let llm = Arc::new(MockLlm::with_no_tool_calls("ok"));
    let mut session = ChatSession::with_memory(llm, vec![])
        .with_transcript(TranscriptStore::new(&path), true);

    let mut seen = Vec::new();
    let path_for_cb = path.clone();
    session
        .run_interactive(
            &mut ScriptedInput::new(["one", "two"]),
            &RunContext::default(),
            |_| {
                // The previous turn is already on disk when the next reply arrives.
                seen.push(path_for_cb.exists());
            },
        )
        .await
        .unwrap();

    assert_eq!(seen, [false, true]);
    let loaded = TranscriptStore::new(&path).load().await.unwrap();
    assert_eq!(loaded.len(), 4);
}
