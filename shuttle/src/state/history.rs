//! Append-only conversation history.

use std::slice::Iter;

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::state::ToolCall;

/// Ordered, insertion-order sequence of [`Message`].
///
/// Messages are never reordered, removed or edited in place: the only way to change the
/// history is to append. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Appends messages in iteration order.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Tool calls of the most recent assistant message; empty when there is none.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        self.messages
            .iter()
            .rev()
            .find_map(|m| match m {
                Message::Assistant { tool_calls, .. } => Some(tool_calls.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Content of the last assistant message. An assistant turn that only requested tools
    /// yields `Some("")`; `None` only when no assistant message exists.
    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn into_vec(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for ConversationHistory {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl FromIterator<Message> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Message;
    type IntoIter = Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_preserves_insertion_order() {
        let mut h = ConversationHistory::new();
        h.push(Message::user("one"));
        h.push(Message::assistant("two"));
        h.extend([Message::user("three")]);
        let contents: Vec<&str> = h.iter().map(Message::content).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    /// **Scenario**: pending_tool_calls reads the latest assistant turn even when tool
    /// results follow it.
    #[test]
    fn pending_tool_calls_come_from_latest_assistant() {
        let old = ToolCall::new("c0", "add", json!({"a": 1, "b": 2}));
        let new = ToolCall::new("c1", "multiply", json!({"a": 3, "b": 3}));
        let h: ConversationHistory = vec![
            Message::assistant_with_tools("", vec![old]),
            Message::user("again"),
            Message::assistant_with_tools("", vec![new.clone()]),
        ]
        .into();
        assert_eq!(h.pending_tool_calls(), &[new]);
    }

    #[test]
    fn pending_tool_calls_empty_without_assistant() {
        let h: ConversationHistory = vec![Message::user("hi")].into();
        assert!(h.pending_tool_calls().is_empty());
        assert!(h.last_assistant_reply().is_none());
    }

    #[test]
    fn serializes_as_plain_array() {
        let h: ConversationHistory = vec![Message::user("hi")].into();
        assert_eq!(serde_json::to_value(&h).unwrap(), json!([{ "User": "hi" }]));
    }
}
