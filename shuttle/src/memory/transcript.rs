//! Plain-text conversation log.
//!
//! ```text
//! Conversation History:
//! You: hello
//! AI: hi there
//!
//! End of Conversation
//! ```
//!
//! Only user and assistant turns are written. Backslashes and newlines inside a turn are
//! escaped as `\\` and `\n` so every turn stays on one line. Lines that are neither `You:` nor
//! `AI:` turns are ignored when loading.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::message::Message;

const HEADER: &str = "Conversation History:";
const TRAILER: &str = "End of Conversation";
const USER_PREFIX: &str = "You:";
const AI_PREFIX: &str = "AI:";

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write transcript {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            // Unknown escapes are kept verbatim.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Renders user and assistant turns in transcript format.
pub fn render_transcript(messages: &[Message]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for message in messages {
        match message {
            Message::User(text) => {
                out.push_str(USER_PREFIX);
                out.push(' ');
                out.push_str(&escape(text));
                out.push('\n');
            }
            Message::Assistant { content, .. } => {
                out.push_str(AI_PREFIX);
                out.push(' ');
                out.push_str(&escape(content));
                out.push_str("\n\n");
            }
            Message::System(_) | Message::Tool(_) => {}
        }
    }
    out.push_str(TRAILER);
    out.push('\n');
    out
}

fn turn_text<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

/// Parses transcript text back into user and assistant messages, skipping everything else.
pub fn parse_transcript(text: &str) -> Vec<Message> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim_start().trim_end_matches('\r');
            if let Some(t) = turn_text(line, USER_PREFIX) {
                Some(Message::user(unescape(t)))
            } else {
                turn_text(line, AI_PREFIX).map(|t| Message::assistant(unescape(t)))
            }
        })
        .collect()
}

/// Transcript file at a fixed path.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored turns. A missing file is an empty history.
    pub async fn load(&self) -> Result<Vec<Message>, TranscriptError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                let messages = parse_transcript(&text);
                info!(path = %self.path.display(), count = messages.len(), "transcript loaded");
                Ok(messages)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no transcript yet, starting fresh");
                Ok(Vec::new())
            }
            Err(source) => Err(TranscriptError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Overwrites the file with the user and assistant turns of `messages`.
    pub async fn save(&self, messages: &[Message]) -> Result<(), TranscriptError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| TranscriptError::Write {
                    path: self.path.clone(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, render_transcript(messages))
            .await
            .map_err(|source| TranscriptError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), "transcript saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_matches_expected_layout() {
        let text = render_transcript(&[
            Message::system("hidden"),
            Message::user("hello"),
            Message::assistant("hi there"),
        ]);
        assert_eq!(
            text,
            "Conversation History:\nYou: hello\nAI: hi there\n\nEnd of Conversation\n"
        );
    }

    #[test]
    fn escape_and_unescape_are_inverse() {
        for s in ["plain", "two\nlines", r"back\slash", "\\n literal", "trailing\\", "\r\n"] {
            assert_eq!(unescape(&escape(s)), s);
        }
    }

    #[test]
    fn parse_accepts_empty_turns() {
        let msgs = parse_transcript("You:\nAI: \n");
        assert_eq!(msgs, vec![Message::user(""), Message::assistant("")]);
    }

    #[test]
    fn parse_ignores_prefix_without_separator() {
        assert!(parse_transcript("Yourself: no\nAIx\n").is_empty());
    }
}
