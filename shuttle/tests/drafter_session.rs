//! Drafter sessions driven by MockLlm and ScriptedInput.

mod init_logging;

use std::sync::Arc;

use serde_json::json;
use shuttle::agent::{DRAFTER_INPUT_PROMPT, DRAFTER_OPENING};
use shuttle::{
    saved_document_condition, DocumentSession, DraftOutcome, Drafter, LlmResponse, LoopState,
    Message, MockLlm, RunContext, ScriptedInput, StopPolicy, StepKind, TerminationReason,
    ToolCall, ToolLoopConfig, ToolResult,
};

/// **Scenario**: opening → model asks what to write → user dictates → update → model shows it
/// → user asks to save → save ends the session with the file on disk.
#[tokio::test]
async fn drafter_updates_then_saves_and_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let document = Arc::new(DocumentSession::new(dir.path()));
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::text("What should the document say?"),
        LlmResponse::with_tool_calls(
            "",
            vec![ToolCall::new("u1", "update", json!({"content": "Meeting at 5pm."}))],
        ),
        LlmResponse::text("Current document: Meeting at 5pm."),
        LlmResponse::with_tool_calls(
            "",
            vec![ToolCall::new("s1", "save", json!({"filename": "meeting"}))],
        ),
        LlmResponse::text("never reached"),
    ]));
    let mut drafter = Drafter::new(llm.clone(), document.clone(), ToolLoopConfig::default());
    let mut input = ScriptedInput::new(["Write: Meeting at 5pm.", "Save it as meeting"]);

    let outcome = drafter.run(&mut input, &RunContext::default()).await.unwrap();

    assert_eq!(outcome, DraftOutcome::Finished(TerminationReason::DocumentSaved));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("meeting.txt")).unwrap(),
        "Meeting at 5pm."
    );
    assert_eq!(input.prompts(), [DRAFTER_INPUT_PROMPT, DRAFTER_INPUT_PROMPT]);
    assert_eq!(llm.call_count(), 4);

    let requests = llm.requests();
    assert_eq!(requests[0][1], Message::user(DRAFTER_OPENING));
    // The system prompt shows the document as of each call.
    assert!(requests[0][0].content().ends_with("The current document content is:"));
    assert!(requests[2][0]
        .content()
        .ends_with("The current document content is:Meeting at 5pm."));
}

#[tokio::test]
async fn drafter_ends_on_exit_or_closed_input() {
    let dir = tempfile::tempdir().unwrap();
    let document = Arc::new(DocumentSession::new(dir.path()));

    let llm = Arc::new(MockLlm::with_no_tool_calls("What next?"));
    let mut drafter = Drafter::new(llm, document.clone(), ToolLoopConfig::default());
    let outcome = drafter
        .run(&mut ScriptedInput::new(["", "exit"]), &RunContext::default())
        .await
        .unwrap();
    assert_eq!(outcome, DraftOutcome::UserExit);

    let llm = Arc::new(MockLlm::with_no_tool_calls("What next?"));
    let mut drafter = Drafter::new(llm, document, ToolLoopConfig::default());
    let outcome = drafter
        .run(&mut ScriptedInput::new(Vec::<String>::new()), &RunContext::default())
        .await
        .unwrap();
    assert_eq!(outcome, DraftOutcome::InputClosed);
    assert_eq!(drafter.state().history.len(), 2);
}

/// **Scenario**: a tool message reporting a saved document anywhere in the history forces
/// termination, even if later messages request more tools.
#[test]
fn saved_tool_message_anywhere_forces_termination() {
    let saved = Message::Tool(ToolResult {
        call_id: "s1".into(),
        name: "save".into(),
        content: "Document has been saved successfully as 'a.txt'!".into(),
        is_error: false,
    });
    let mut state = LoopState::new(vec![
        Message::user(DRAFTER_OPENING),
        Message::assistant_with_tools("", vec![ToolCall::new("s1", "save", json!({}))]),
        saved,
        Message::user("keep going"),
        Message::assistant_with_tools(
            "",
            vec![ToolCall::new("u1", "update", json!({"content": "x"}))],
        ),
    ]);
    state.turn_count = 1;

    assert!(saved_document_condition(&state.history));
    let policy = StopPolicy {
        stop_on_saved_document: true,
        max_turns: None,
    };
    assert_eq!(
        policy.evaluate(&state, StepKind::Think),
        Some(TerminationReason::DocumentSaved)
    );
}

#[tokio::test]
async fn failed_save_keeps_drafting() {
    let dir = tempfile::tempdir().unwrap();
    let document = Arc::new(DocumentSession::new(dir.path()));
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::with_tool_calls(
            "",
            vec![ToolCall::new("s1", "save", json!({"filename": "../../etc/passwd"}))],
        ),
        LlmResponse::text("I could not save there."),
    ]));
    let mut drafter = Drafter::new(llm, document, ToolLoopConfig::default());

    let outcome = drafter
        .run(&mut ScriptedInput::new(["exit"]), &RunContext::default())
        .await
        .unwrap();

    assert_eq!(outcome, DraftOutcome::UserExit);
    let tool_text = drafter
        .state()
        .history
        .iter()
        .find_map(|m| match m {
            Message::Tool(r) => Some(r.content.clone()),
            _ => None,
        })
        .unwrap();
    assert!(tool_text.starts_with("Failed to save the document: "));
}
