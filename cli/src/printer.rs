//! Prints loop events while a session runs, and keeps them ordered before input prompts.

use std::io::Write;

use async_trait::async_trait;
use cli::{format_event, StreamedReply};
use shuttle::{InputSource, LoopEvent, RunContext};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Max chars of a tool result or argument list printed per event.
const EVENT_MAX_LEN: usize = 400;

/// Which events reach the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    /// Phases, tool calls, usage and termination on stderr.
    pub verbose: bool,
    /// Assistant turns and tool results on stdout.
    pub show_turns: bool,
    /// Model tokens on stdout as they arrive; implies `show_turns`.
    pub stream: bool,
}

pub struct EventPrinter {
    task: JoinHandle<()>,
    flush_tx: mpsc::Sender<oneshot::Sender<()>>,
}

impl EventPrinter {
    /// Run context wired to a printer task. Returns no printer when nothing would be printed.
    pub fn spawn(options: PrintOptions) -> (RunContext, Option<EventPrinter>) {
        if !options.verbose && !options.show_turns && !options.stream {
            return (RunContext::default(), None);
        }
        let (tx, mut rx) = mpsc::channel::<LoopEvent>(64);
        let (flush_tx, mut flush_rx) = mpsc::channel::<oneshot::Sender<()>>(1);
        let task = tokio::spawn(async move {
            let mut writer = EventWriter::new(options);
            loop {
                tokio::select! {
                    biased;
                    event = rx.recv() => match event {
                        Some(event) => {
                            let _ = writer.write(
                                &event,
                                &mut std::io::stdout().lock(),
                                &mut std::io::stderr().lock(),
                            );
                        }
                        None => break,
                    },
                    Some(ack) = flush_rx.recv() => {
                        let _ = ack.send(());
                    }
                }
            }
        });
        let ctx = RunContext::with_events(tx);
        let ctx = if options.stream { ctx.streaming_tokens() } else { ctx };
        (ctx, Some(EventPrinter { task, flush_tx }))
    }

    /// Returns once every event sent so far has been printed.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.flush_tx.send(ack_tx).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Closes the event channel and waits for the remaining events.
    pub async fn finish(self, ctx: RunContext) {
        drop(ctx);
        drop(self.flush_tx);
        let _ = self.task.await;
    }
}

/// Routes each event to stdout or stderr.
struct EventWriter {
    options: PrintOptions,
    reply: StreamedReply,
}

impl EventWriter {
    fn new(options: PrintOptions) -> Self {
        Self {
            options,
            reply: StreamedReply::default(),
        }
    }

    fn write(
        &mut self,
        event: &LoopEvent,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> std::io::Result<()> {
        if let Some(text) = self.reply.render(event) {
            write!(out, "{}", text)?;
            return out.flush();
        }
        if matches!(event, LoopEvent::Terminated { .. }) && self.reply.close() {
            writeln!(out)?;
        }
        let is_turn = matches!(event, LoopEvent::Assistant { .. } | LoopEvent::ToolResult(_));
        if is_turn && !(self.options.show_turns || self.options.stream) {
            return Ok(());
        }
        match format_event(event, self.options.verbose, EVENT_MAX_LEN) {
            Some(line) if is_turn => writeln!(out, "\n{}", line),
            Some(line) => writeln!(err, "{}", line),
            None => Ok(()),
        }
    }
}

/// Input that flushes pending events before showing its prompt.
pub struct OrderedInput<'a, I> {
    inner: I,
    printer: Option<&'a EventPrinter>,
}

impl<'a, I> OrderedInput<'a, I> {
    pub fn new(inner: I, printer: Option<&'a EventPrinter>) -> Self {
        Self { inner, printer }
    }
}

#[async_trait]
impl<I: InputSource> InputSource for OrderedInput<'_, I> {
    async fn next_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        if let Some(printer) = self.printer {
            printer.flush().await;
        }
        self.inner.next_line(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shuttle::{MessageChunk, TerminationReason};

    fn written(options: PrintOptions, events: &[LoopEvent]) -> (String, String) {
        let mut writer = EventWriter::new(options);
        let (mut out, mut err) = (Vec::new(), Vec::new());
        for event in events {
            writer.write(event, &mut out, &mut err).unwrap();
        }
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn chunk(text: &str) -> LoopEvent {
        LoopEvent::MessageChunk(MessageChunk {
            content: text.into(),
        })
    }

    #[test]
    fn streaming_prints_tokens_then_no_duplicate_reply() {
        let options = PrintOptions {
            stream: true,
            ..PrintOptions::default()
        };
        let (out, err) = written(
            options,
            &[
                chunk("Hel"),
                chunk("lo!"),
                LoopEvent::Assistant {
                    content: "Hello!".into(),
                    tool_names: vec![],
                },
                LoopEvent::Terminated {
                    reason: TerminationReason::NoToolCalls,
                },
            ],
        );
        assert_eq!(out, "\nAI: Hello!\n");
        assert_eq!(err, "");
    }

    #[test]
    fn unstreamed_reply_is_printed_whole_when_streaming() {
        let options = PrintOptions {
            stream: true,
            ..PrintOptions::default()
        };
        let (out, _) = written(
            options,
            &[LoopEvent::Assistant {
                content: "fallback".into(),
                tool_names: vec![],
            }],
        );
        assert_eq!(out, "\nAI: fallback\n");
    }

    #[test]
    fn without_streaming_turns_are_hidden_unless_shown() {
        let assistant = LoopEvent::Assistant {
            content: "hi".into(),
            tool_names: vec![],
        };
        let verbose = PrintOptions {
            verbose: true,
            ..PrintOptions::default()
        };
        let (out, err) = written(
            verbose,
            &[
                assistant.clone(),
                LoopEvent::Terminated {
                    reason: TerminationReason::MaxTurns,
                },
            ],
        );
        assert_eq!(out, "");
        assert_eq!(err, "[terminated] MaxTurns\n");
    }

    #[tokio::test]
    async fn spawn_enables_token_streaming_only_when_asked() {
        let (ctx, printer) = EventPrinter::spawn(PrintOptions {
            stream: true,
            ..PrintOptions::default()
        });
        assert!(ctx.stream_tokens);
        assert!(ctx.event_tx.is_some());
        if let Some(printer) = printer {
            printer.finish(ctx).await;
        }

        let (ctx, printer) = EventPrinter::spawn(PrintOptions::default());
        assert!(!ctx.stream_tokens);
        assert!(printer.is_none());
    }
}
