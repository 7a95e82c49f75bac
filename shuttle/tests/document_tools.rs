//! Document tools: update replaces content, save writes `<name>.txt` under the output dir.

mod init_logging;

use std::sync::Arc;

use serde_json::json;
use shuttle::{document_registry, DocumentSession, ToolSource};

#[tokio::test]
async fn update_replaces_content_and_echoes_it() {
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(DocumentSession::new(dir.path()));
    let tools = document_registry(session.clone());

    let out = tools
        .call_tool("update", json!({"content": "Dear Tom,\nSee you soon."}))
        .await
        .unwrap();

    assert_eq!(
        out.text,
        "Document has been updated successfully! The current content is:\nDear Tom,\nSee you soon."
    );
    assert!(!out.finish);
    assert_eq!(session.content(), "Dear Tom,\nSee you soon.");
}

#[tokio::test]
async fn update_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(DocumentSession::new(dir.path()));
    let tools = document_registry(session.clone());

    let first = tools.call_tool("update", json!({"content": "X"})).await.unwrap();
    let after_first = session.content();
    let second = tools.call_tool("update", json!({"content": "X"})).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(after_first, session.content());
    assert_eq!(session.content(), "X");
}

#[tokio::test]
async fn save_appends_txt_and_writes_exact_content() {
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(DocumentSession::new(dir.path()));
    session.replace("hello");
    let tools = document_registry(session);

    let out = tools.call_tool("save", json!({"filename": "notes"})).await.unwrap();

    assert_eq!(out.text, "Document has been saved successfully as 'notes.txt'!");
    assert!(out.finish);
    let written = std::fs::read_to_string(dir.path().join("notes.txt")).unwrap();
    assert_eq!(written, "hello");
}

#[tokio::test]
async fn save_keeps_existing_txt_extension_and_creates_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("drafts");
    let session = Arc::new(DocumentSession::new(&out_dir));
    session.replace("body");
    let tools = document_registry(session);

    let out = tools
        .call_tool("save", json!({"filename": "letter.txt"}))
        .await
        .unwrap();

    assert_eq!(out.text, "Document has been saved successfully as 'letter.txt'!");
    assert_eq!(std::fs::read_to_string(out_dir.join("letter.txt")).unwrap(), "body");
}

#[tokio::test]
async fn save_outside_output_dir_fails_as_result_text() {
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(DocumentSession::new(dir.path().join("inner")));
    let tools = document_registry(session);

    let out = tools
        .call_tool("save", json!({"filename": "../escape"}))
        .await
        .unwrap();

    assert!(out.text.starts_with("Failed to save the document: "), "{}", out.text);
    assert!(!out.finish);
    assert!(!dir.path().join("escape.txt").exists());
}

#[tokio::test]
async fn save_without_filename_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let tools = document_registry(Arc::new(DocumentSession::new(dir.path())));
    let err = tools.call_tool("save", json!({})).await.unwrap_err();
    assert!(err.to_string().contains("missing filename"));
}
