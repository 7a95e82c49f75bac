//! Plain chat on top of the loop (no tools): single-turn or with remembered history.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AgentError;
use crate::input::{is_exit_command, InputSource};
use crate::llm::LlmClient;
use crate::memory::{TranscriptError, TranscriptStore};
use crate::message::Message;
use crate::state::{ConversationHistory, LoopState};
use crate::stream::RunContext;
use crate::tools::ToolRegistry;

use super::react::{ToolLoop, ToolLoopConfig};
use super::SessionError;

/// Prompt shown before each chat input line.
pub const CHAT_INPUT_PROMPT: &str = "Enter: ";

/// Whether earlier turns are sent with each new message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Only the current user message is sent.
    Stateless,
    /// The whole conversation so far is sent.
    WithMemory,
}

/// Chat session over a tool-less loop.
pub struct ChatSession {
    tool_loop: ToolLoop,
    mode: ChatMode,
    history: ConversationHistory,
    transcript: Option<TranscriptStore>,
    autosave: bool,
}

impl ChatSession {
    pub fn new(llm: Arc<dyn LlmClient>, mode: ChatMode, config: ToolLoopConfig) -> Self {
        Self {
            tool_loop: ToolLoop::new(llm, Arc::new(ToolRegistry::new()), config),
            mode,
            history: ConversationHistory::new(),
            transcript: None,
            autosave: false,
        }
    }

    pub fn stateless(llm: Arc<dyn LlmClient>) -> Self {
        Self::new(llm, ChatMode::Stateless, ToolLoopConfig::default())
    }

    /// Remembering session seeded with `prior` messages.
    pub fn with_memory(llm: Arc<dyn LlmClient>, prior: Vec<Message>) -> Self {
        let mut session = Self::new(llm, ChatMode::WithMemory, ToolLoopConfig::default());
        session.history = prior.into();
        session
    }

    /// Remembering session that resumes from and saves to `store`.
    pub async fn from_transcript(
        llm: Arc<dyn LlmClient>,
        config: ToolLoopConfig,
        store: TranscriptStore,
        autosave: bool,
    ) -> Result<Self, TranscriptError> {
        let prior = store.load().await?;
        let mut session = Self::new(llm, ChatMode::WithMemory, config);
        session.history = prior.into();
        Ok(session.with_transcript(store, autosave))
    }

    /// Attach a transcript saved at the end of `run_interactive`, and after every turn when
    /// `autosave` is set.
    pub fn with_transcript(mut self, store: TranscriptStore, autosave: bool) -> Self {
        self.transcript = Some(store);
        self.autosave = autosave;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.tool_loop = self.tool_loop.with_system_prompt(prompt);
        self
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Remembered conversation; always empty in stateless mode.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub async fn respond(&mut self, input: &str) -> Result<String, AgentError> {
        self.respond_with_context(input, &RunContext::default())
            .await
    }

    /// Sends one user message and returns the assistant reply. On error the remembered
    /// history is left unchanged.
    pub async fn respond_with_context(
        &mut self,
        input: &str,
        ctx: &RunContext,
    ) -> Result<String, AgentError> {
        let mut state = match self.mode {
            ChatMode::Stateless => LoopState::default(),
            ChatMode::WithMemory => LoopState::new(self.history.clone()),
        };
        state.resume_with_user(input);
        let state = self.tool_loop.run_with_context(state, ctx).await?;
        let reply = state.last_assistant_reply().unwrap_or_default().to_string();
        if self.mode == ChatMode::WithMemory {
            self.history = state.history;
        }
        Ok(reply)
    }

    /// Writes the remembered history to the attached transcript, if any.
    pub async fn save_transcript(&self) -> Result<(), TranscriptError> {
        match &self.transcript {
            Some(store) => store.save(self.history.as_slice()).await,
            None => Ok(()),
        }
    }

    /// Reads lines from `input` until it is exhausted or yields `exit`, passing every reply to
    /// `on_reply`. Returns the number of answered turns.
    pub async fn run_interactive<I, F>(
        &mut self,
        input: &mut I,
        ctx: &RunContext,
        mut on_reply: F,
    ) -> Result<usize, SessionError>
    where
        I: InputSource + ?Sized,
        F: FnMut(&str),
    {
        if !self.history.is_empty() {
            info!(count = self.history.len(), "resuming conversation");
        }
        let mut turns = 0;
        while let Some(line) = input.next_line(CHAT_INPUT_PROMPT).await? {
            if is_exit_command(&line) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.respond_with_context(&line, ctx).await?;
            on_reply(&reply);
            turns += 1;
            if self.autosave {
                self.save_transcript().await?;
            }
        }
        debug!(turns, "chat session ended");
        self.save_transcript().await?;
        Ok(turns)
    }
}
