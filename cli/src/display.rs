//! Console formatting for messages and [`LoopEvent`]s.

use shuttle::{LoopEvent, Message};

/// Truncates a string to at most `max` chars; appends "..." when truncated. UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    let head: String = s.chars().take(max - SUFFIX.len()).collect();
    format!("{}{}", head, SUFFIX)
}

/// One message the way the sessions print it.
pub fn format_message(message: &Message) -> String {
    match message {
        Message::System(s) => format!("System: {}", s),
        Message::User(s) => format!("USER: {}", s),
        Message::Assistant { content, tool_calls } if tool_calls.is_empty() => {
            format!("AI: {}", content)
        }
        Message::Assistant { content, tool_calls } => {
            let calls: Vec<String> = tool_calls
                .iter()
                .map(|c| format!("{}({})", c.name, c.arguments))
                .collect();
            if content.is_empty() {
                format!("AI -> {}", calls.join(", "))
            } else {
                format!("AI: {}\nAI -> {}", content, calls.join(", "))
            }
        }
        Message::Tool(r) => format!("TOOL RESULT ({}): {}", r.name, r.content),
    }
}

/// All messages, separated by blank lines.
pub fn format_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Line for one loop event. `verbose` adds phase, usage and termination lines and shows tool
/// arguments; otherwise only assistant turns and tool results are printed.
pub fn format_event(event: &LoopEvent, verbose: bool, max: usize) -> Option<String> {
    match event {
        LoopEvent::Assistant {
            content,
            tool_names,
        } => {
            let mut out = Vec::new();
            if !content.is_empty() {
                out.push(format!("AI: {}", content));
            }
            out.extend(format_tool_use(tool_names));
            (!out.is_empty()).then(|| out.join("\n"))
        }
        LoopEvent::ToolResult(r) => Some(format!(
            "TOOL RESULT: {}",
            truncate_display(&r.content, max)
        )),
        _ if !verbose => None,
        LoopEvent::PhaseEnter { phase } => Some(format!("[phase] {:?}", phase)),
        LoopEvent::ToolCall {
            name, arguments, ..
        } => Some(format!(
            "[tool] {} {}",
            name,
            truncate_display(&arguments.to_string(), max)
        )),
        LoopEvent::Usage(u) => Some(format!(
            "[usage] prompt={} completion={} total={}",
            u.prompt_tokens, u.completion_tokens, u.total_tokens
        )),
        LoopEvent::Terminated { reason } => Some(format!("[terminated] {:?}", reason)),
        LoopEvent::MessageChunk(_) => None,
    }
}

fn format_tool_use(tool_names: &[String]) -> Option<String> {
    (!tool_names.is_empty()).then(|| format!("USING TOOLS: {:?}", tool_names))
}

/// Console text for a reply streamed as [`LoopEvent::MessageChunk`]s.
///
/// The first chunk opens an `AI: ` line and later chunks extend it. The assistant event that
/// completes the reply closes the line and adds only the tool names, since its content was
/// already printed.
#[derive(Debug, Default)]
pub struct StreamedReply {
    open: bool,
}

impl StreamedReply {
    /// Text to write for `event`; `None` when the event is not part of a streamed reply.
    pub fn render(&mut self, event: &LoopEvent) -> Option<String> {
        match event {
            LoopEvent::MessageChunk(chunk) if !chunk.content.is_empty() => {
                let prefix = if self.open { "" } else { "\nAI: " };
                self.open = true;
                Some(format!("{}{}", prefix, chunk.content))
            }
            LoopEvent::Assistant { tool_names, .. } if self.open => {
                self.open = false;
                Some(match format_tool_use(tool_names) {
                    Some(line) => format!("\n{}\n", line),
                    None => "\n".to_string(),
                })
            }
            _ => None,
        }
    }

    /// Ends a reply cut off before its assistant event. Returns whether a line was open.
    pub fn close(&mut self) -> bool {
        std::mem::take(&mut self.open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shuttle::{LoopPhase, MessageChunk, TerminationReason, ToolCall, ToolResult};

    #[test]
    fn truncate_display_is_char_safe() {
        assert_eq!(truncate_display("hello", 10), "hello");
        assert_eq!(truncate_display("hello world", 8), "hello...");
        assert_eq!(truncate_display("héllo wörld", 7), "héll...");
        assert_eq!(truncate_display("abcdef", 2), "ab");
    }

    #[test]
    fn formats_each_role() {
        assert_eq!(format_message(&Message::user("hi")), "USER: hi");
        assert_eq!(format_message(&Message::assistant("36")), "AI: 36");
        let call = Message::assistant_with_tools(
            "",
            vec![ToolCall::new("c1", "add", json!({"a": 14, "b": 22}))],
        );
        assert_eq!(format_message(&call), "AI -> add({\"a\":14,\"b\":22})");
        let result = Message::Tool(ToolResult {
            call_id: "c1".into(),
            name: "add".into(),
            content: "36".into(),
            is_error: false,
        });
        assert_eq!(format_message(&result), "TOOL RESULT (add): 36");
    }

    #[test]
    fn quiet_events_show_only_turns_and_results() {
        let assistant = LoopEvent::Assistant {
            content: String::new(),
            tool_names: vec!["update".into()],
        };
        assert_eq!(
            format_event(&assistant, false, 100).as_deref(),
            Some("USING TOOLS: [\"update\"]")
        );
        let phase = LoopEvent::PhaseEnter {
            phase: LoopPhase::AwaitingModel,
        };
        assert!(format_event(&phase, false, 100).is_none());
        assert_eq!(
            format_event(&phase, true, 100).as_deref(),
            Some("[phase] AwaitingModel")
        );
        let done = LoopEvent::Terminated {
            reason: TerminationReason::DocumentSaved,
        };
        assert_eq!(
            format_event(&done, true, 100).as_deref(),
            Some("[terminated] DocumentSaved")
        );
    }

    fn chunk(text: &str) -> LoopEvent {
        LoopEvent::MessageChunk(MessageChunk {
            content: text.into(),
        })
    }

    #[test]
    fn streamed_reply_prints_content_once() {
        let mut reply = StreamedReply::default();
        assert_eq!(reply.render(&chunk("The result")).as_deref(), Some("\nAI: The result"));
        assert_eq!(reply.render(&chunk("")), None);
        assert_eq!(reply.render(&chunk(" is 108.")).as_deref(), Some(" is 108."));
        let done = LoopEvent::Assistant {
            content: "The result is 108.".into(),
            tool_names: vec![],
        };
        assert_eq!(reply.render(&done).as_deref(), Some("\n"));
        // Not streamed: left to format_event.
        assert_eq!(reply.render(&done), None);
        assert!(!reply.close());
    }

    #[test]
    fn streamed_reply_with_tools_lists_them_after_the_text() {
        let mut reply = StreamedReply::default();
        reply.render(&chunk("Updating."));
        let assistant = LoopEvent::Assistant {
            content: "Updating.".into(),
            tool_names: vec!["update".into()],
        };
        assert_eq!(
            reply.render(&assistant).as_deref(),
            Some("\nUSING TOOLS: [\"update\"]\n")
        );
    }

    #[test]
    fn cut_off_reply_is_closed() {
        let mut reply = StreamedReply::default();
        reply.render(&chunk("partial"));
        assert!(reply.close());
        assert!(!reply.close());
    }
}
