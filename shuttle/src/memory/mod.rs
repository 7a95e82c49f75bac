//! Conversation persistence between runs.

mod transcript;

pub use transcript::{parse_transcript, render_transcript, TranscriptError, TranscriptStore};
