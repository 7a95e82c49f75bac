//! Transcript store: round trip, tolerant loading, missing file.

mod init_logging;

use serde_json::json;
use shuttle::memory::{parse_transcript, render_transcript};
use shuttle::{Message, ToolCall, ToolResult, TranscriptError, TranscriptStore};

#[tokio::test]
async fn round_trip_keeps_user_and_assistant_turns() {
    let dir = tempfile::tempdir().unwrap();
    let store = TranscriptStore::new(dir.path().join("history.txt"));
    let messages = vec![
        Message::system("not persisted"),
        Message::user("Write two lines"),
        Message::assistant_with_tools(
            "",
            vec![ToolCall::new("c1", "update", json!({"content": "a"}))],
        ),
        Message::Tool(ToolResult {
            call_id: "c1".into(),
            name: "update".into(),
            content: "not persisted".into(),
            is_error: false,
        }),
        Message::assistant("line one\nline two with a \\ backslash"),
    ];

    store.save(&messages).await.unwrap();
    let loaded = store.load().await.unwrap();

    assert_eq!(
        loaded,
        vec![
            Message::user("Write two lines"),
            Message::assistant(""),
            Message::assistant("line one\nline two with a \\ backslash"),
        ]
    );
}

#[tokio::test]
async fn missing_file_loads_as_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = TranscriptStore::new(dir.path().join("absent.txt"));
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_path_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be read as a file.
    let store = TranscriptStore::new(dir.path());
    let err = store.load().await.unwrap_err();
    assert!(matches!(err, TranscriptError::Read { .. }));
}

#[test]
fn unknown_lines_are_skipped() {
    let text = "Conversation History:\n\
                You: hi\n\
                random note\n\
                AI: hello\n\
                \n\
                System: ignored\n\
                End of Conversation\n";
    assert_eq!(
        parse_transcript(text),
        vec![Message::user("hi"), Message::assistant("hello")]
    );
}

#[test]
fn render_writes_header_turns_and_trailer() {
    let text = render_transcript(&[Message::user("a"), Message::assistant("b")]);
    assert_eq!(text, "Conversation History:\nYou: a\nAI: b\n\nEnd of Conversation\n");
    assert_eq!(render_transcript(&[]), "Conversation History:\nEnd of Conversation\n");
}
