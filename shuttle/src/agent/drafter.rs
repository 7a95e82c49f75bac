//! Document drafter: the loop with `update`/`save` tools and a prompt showing the document.

use std::sync::Arc;

use tracing::info;

use crate::input::{is_exit_command, InputSource};
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::{LoopState, TerminationReason};
use crate::stream::RunContext;
use crate::tools::{document_registry, DocumentSession};

use super::react::{ToolLoop, ToolLoopConfig};
use super::SessionError;

/// First user message of a new drafting session.
pub const DRAFTER_OPENING: &str =
    "I'm ready to help you update a document. What would you like to create?";

/// Prompt shown before each drafting instruction.
pub const DRAFTER_INPUT_PROMPT: &str = "What would you like to do with the document? ";

/// System prompt for the drafter with the current document content.
pub fn drafter_system_prompt(content: &str) -> String {
    format!(
        "You are Drafter, a helpful writing assistant. You are going to help the user update \
         and modify documents.\n\n\
         - If the user wants to update or modify content, use the 'update' tool with the \
         complete updated content.\n\
         - If the user wants to save and finish, you need to use the 'save' tool.\n\
         - Make sure to always show the current document state after modifications.\n\n\
         The current document content is:{}",
        content
    )
}

/// How a drafting session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    /// The loop terminated on its own (document saved, stop signal, turn limit).
    Finished(TerminationReason),
    /// The user typed `exit`.
    UserExit,
    /// The input source ran out of lines.
    InputClosed,
}

/// Interactive document drafting session.
pub struct Drafter {
    tool_loop: ToolLoop,
    document: Arc<DocumentSession>,
    state: LoopState,
}

impl Drafter {
    /// `llm` must have the `update`/`save` specs bound; `stop_on_saved_document` is always on.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        document: Arc<DocumentSession>,
        mut config: ToolLoopConfig,
    ) -> Self {
        config.stop_on_saved_document = true;
        let prompt_doc = Arc::clone(&document);
        let tool_loop = ToolLoop::new(llm, Arc::new(document_registry(Arc::clone(&document))), config)
            .with_dynamic_system_prompt(move || drafter_system_prompt(&prompt_doc.content()));
        Self {
            tool_loop,
            document,
            state: LoopState::default(),
        }
    }

    pub fn document(&self) -> &Arc<DocumentSession> {
        &self.document
    }

    /// Loop state after the last run.
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Drafts until the document is saved, the user exits or the input runs out.
    ///
    /// A new session starts with [`DRAFTER_OPENING`]; each time the model answers without
    /// tools the next instruction is read from `input`.
    pub async fn run<I>(&mut self, input: &mut I, ctx: &RunContext) -> Result<DraftOutcome, SessionError>
    where
        I: InputSource + ?Sized,
    {
        if self.state.history.is_empty() {
            self.state = LoopState::new(vec![Message::user(DRAFTER_OPENING)]);
        }
        loop {
            self.state = self.tool_loop.run_with_context(self.state.clone(), ctx).await?;
            match self.state.termination {
                Some(TerminationReason::NoToolCalls) | None => {}
                Some(reason) => {
                    info!(reason = ?reason, "drafting finished");
                    return Ok(DraftOutcome::Finished(reason));
                }
            }

            let line = loop {
                match input.next_line(DRAFTER_INPUT_PROMPT).await? {
                    None => return Ok(DraftOutcome::InputClosed),
                    Some(line) if is_exit_command(&line) => return Ok(DraftOutcome::UserExit),
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => break line,
                }
            };
            self.state.resume_with_user(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_shows_content() {
        let prompt = drafter_system_prompt("Hello");
        assert!(prompt.starts_with("You are Drafter"));
        assert!(prompt.ends_with("The current document content is:Hello"));
    }
}
