//! Where interactive sessions get the next user line from.
//!
//! Sessions never read the terminal directly: they ask an [`InputSource`], so tests drive them
//! with [`ScriptedInput`] and the CLI with [`StdinInput`].

use std::collections::VecDeque;
use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Sentinel that ends an interactive session.
pub const EXIT_COMMAND: &str = "exit";

/// True for the exit sentinel (case-insensitive, surrounding whitespace ignored).
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Source of user input lines.
#[async_trait]
pub trait InputSource: Send {
    /// Shows `prompt` (when the source has a display) and returns the next line without its
    /// newline. `None` when the input is exhausted.
    async fn next_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
}

/// Reads lines from the process stdin, printing the prompt to stdout first.
pub struct StdinInput {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputSource for StdinInput {
    async fn next_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{}", prompt);
        std::io::stdout().flush()?;
        self.lines.next_line().await
    }
}

/// Replays fixed lines; records every prompt it was asked with.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_exit_command_matches_sentinel_only() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command(" EXIT "));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quit"));
    }

    #[tokio::test]
    async fn scripted_input_replays_then_exhausts() {
        let mut input = ScriptedInput::new(["a", "b"]);
        assert_eq!(input.next_line("> ").await.unwrap().as_deref(), Some("a"));
        assert_eq!(input.next_line("> ").await.unwrap().as_deref(), Some("b"));
        assert_eq!(input.next_line("? ").await.unwrap(), None);
        assert_eq!(input.prompts(), ["> ", "> ", "? "]);
    }
}
