use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// One user's chat history for the lifetime of their connection.
///
/// The transcript is append-only: messages are never reordered or removed.
/// Starting a new conversation means creating a new `Session`.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    created_at: SystemTime,
    messages: Vec<ChatMessage>,
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp_secs: u64,  // Unix timestamp in seconds for serialization
    pub tool_call: Option<ToolCallRecord>,
}

/// The tool request a `Tool` message answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Who sent the message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

impl Session {
    /// Create an empty session with a fresh connection id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Create an empty session bound to a known connection id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: SystemTime::now(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Get all messages in the session, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Add a user message to the conversation
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.push(MessageRole::User, content.into(), None);
    }

    /// Add an assistant reply to the conversation
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.push(MessageRole::Assistant, content.into(), None);
    }

    /// Add the result of a tool invocation, along with the call that produced it
    pub fn add_tool_message(&mut self, call: ToolCallRecord, output: impl Into<String>) {
        self.push(MessageRole::Tool, output.into(), Some(call));
    }

    /// Most recent message sent by the user, if any
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|msg| msg.role == MessageRole::User)
    }

    fn push(&mut self, role: MessageRole, content: String, tool_call: Option<ToolCallRecord>) {
        let timestamp_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0u64, |d| d.as_secs());
        self.messages.push(ChatMessage {
            role,
            content,
            timestamp_secs,
            tool_call,
        });
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatMessage {
    /// Format the message for display
    pub fn formatted_content(&self) -> String {
        match self.role {
            MessageRole::User => format!("You: {}", self.content),
            MessageRole::Assistant => format!("Agent: {}", self.content),
            MessageRole::Tool => match &self.tool_call {
                Some(call) => format!("{}: {}", call.name, self.content),
                None => self.content.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_sessions_get_distinct_ids() {
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a.id(), b.id());
        assert!(a.is_empty());
    }

    #[test]
    fn test_turns_accumulate_in_order() {
        let mut session = Session::with_id("conn-1");
        for i in 0..5 {
            session.add_user_message(format!("question {}", i));
            session.add_assistant_message(format!("answer {}", i));
        }

        assert_eq!(session.len(), 10);
        for (i, pair) in session.messages().chunks(2).enumerate() {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[0].content, format!("question {}", i));
            assert_eq!(pair[1].role, MessageRole::Assistant);
            assert_eq!(pair[1].content, format!("answer {}", i));
        }
    }

    #[test]
    fn test_tool_message_keeps_call() {
        let mut session = Session::new();
        session.add_user_message("btc");
        session.add_tool_message(
            ToolCallRecord {
                id: "call_1".to_string(),
                name: "crypto_price".to_string(),
                arguments: json!({"symbol": "btc"}),
            },
            "The current price of BTC is $1",
        );

        let tool_msg = &session.messages()[1];
        assert_eq!(tool_msg.role, MessageRole::Tool);
        assert_eq!(tool_msg.tool_call.as_ref().map(|c| c.id.as_str()), Some("call_1"));
        assert_eq!(tool_msg.formatted_content(), "crypto_price: The current price of BTC is $1");
    }

    #[test]
    fn test_last_user_message() {
        let mut session = Session::new();
        assert!(session.last_user_message().is_none());
        session.add_user_message("eth");
        session.add_assistant_message("ok");
        assert_eq!(session.last_user_message().map(|m| m.content.as_str()), Some("eth"));
    }
}
