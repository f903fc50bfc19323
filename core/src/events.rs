use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Requests sent from a front-end to the chat adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// A new conversation started (or the user asked for a fresh one)
    ChatStart,
    /// The user sent a message
    ChatSubmit { text: String },
}

/// Events that flow through the application
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A message was delivered to the user
    MessageSent(OutboundMessage),

    /// Application should quit
    Quit,

    // Chat events
    ChatCreated,
    ChatCompleted { token_usage: Option<TokenUsage> },
    TokenCount(TokenUsage),

    // Tool lifecycle events
    ToolBegin { id: String, tool: String, summary: String, args: Option<serde_json::Value> },
    ToolResult { id: String, output: String },
    ToolEnd { id: String, ok: bool, duration_ms: u64 },
}

/// What kind of message the user is being shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundKind {
    Greeting,
    Reply,
    Error,
}

/// A message displayed to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub kind: OutboundKind,
    pub content: String,
}

impl OutboundMessage {
    pub fn new(kind: OutboundKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Whether this message closes a user turn
    pub fn ends_turn(&self) -> bool {
        matches!(self.kind, OutboundKind::Reply | OutboundKind::Error)
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Add another round-trip's usage to this total
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

/// Event bus for communication between components
#[derive(Debug)]
pub struct EventBus {
    sender: mpsc::UnboundedSender<AppEvent>,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Get a sender handle for the event bus
    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: self.sender.clone(),
        }
    }

    /// Get the receiver (should only be used by the main event loop)
    pub fn into_receiver(self) -> mpsc::UnboundedReceiver<AppEvent> {
        self.receiver
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for sending events to the event bus
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    /// Send an event to the bus
    pub fn send(&self, event: AppEvent) -> Result<(), EventSendError> {
        self.inner
            .send(event)
            .map_err(|_| EventSendError::ChannelClosed)
    }

    /// Deliver a message to the user
    pub fn send_message(&self, message: OutboundMessage) -> Result<(), EventSendError> {
        self.send(AppEvent::MessageSent(message))
    }

    /// Send quit signal
    pub fn send_quit(&self) -> Result<(), EventSendError> {
        self.send(AppEvent::Quit)
    }
}

/// Errors that can occur when sending events
#[derive(Debug, thiserror::Error)]
pub enum EventSendError {
    #[error("Event channel is closed")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let mut receiver = bus.into_receiver();

        sender
            .send_message(OutboundMessage::new(OutboundKind::Reply, "hello"))
            .unwrap();

        let event = receiver.recv().await.unwrap();
        match event {
            AppEvent::MessageSent(msg) => {
                assert_eq!(msg.content, "hello");
                assert!(msg.ends_turn());
            }
            _ => panic!("Expected MessageSent event"),
        }
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let bus = EventBus::new();
        let sender = bus.sender();
        drop(bus.into_receiver());
        assert!(matches!(sender.send_quit(), Err(EventSendError::ChannelClosed)));
    }

    #[test]
    fn test_token_usage_accumulates() {
        let mut total = TokenUsage::default();
        total.accumulate(TokenUsage { input_tokens: 10, output_tokens: 2, total_tokens: 12 });
        total.accumulate(TokenUsage { input_tokens: 20, output_tokens: 3, total_tokens: 23 });
        assert_eq!(total, TokenUsage { input_tokens: 30, output_tokens: 5, total_tokens: 35 });
    }

    #[test]
    fn test_greeting_does_not_end_turn() {
        assert!(!OutboundMessage::new(OutboundKind::Greeting, "hi").ends_turn());
    }
}
