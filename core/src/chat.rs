//! Front-end adapter: turns chat events into turns against the agent.

use crate::agent::{Agent, AgentDefinition, AgentInfo};
use crate::events::{EventSender, OutboundKind, OutboundMessage, Request};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Binds one connection's session to the agent.
///
/// This is the only place agent failures become visible to the user: every
/// error is turned into an `Error` message and the session stays usable.
pub struct ChatAdapter {
    agent: Arc<dyn Agent>,
    session: Session,
    event_sender: EventSender,
}

impl ChatAdapter {
    pub fn new(agent: Arc<dyn Agent>, event_sender: EventSender) -> Self {
        Self {
            agent,
            session: Session::new(),
            event_sender,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn agent_info(&self) -> AgentInfo {
        self.agent.info()
    }

    /// Conversation started: fresh session plus a greeting
    pub fn start(&mut self) -> OutboundMessage {
        self.session = Session::new();
        info!("Chat started, session {}", self.session.id());

        let greeting = AgentDefinition::greeting(&self.agent.info().name);
        self.deliver(OutboundKind::Greeting, greeting)
    }

    /// Message received: run one turn and deliver the reply or a diagnostic
    pub async fn on_message(&mut self, text: String) -> OutboundMessage {
        self.session.add_user_message(text);
        debug!("Session {} now holds {} messages", self.session.id(), self.session.len());

        match self.agent.submit(self.session.messages()).await {
            Ok(response) => {
                for invocation in response.tool_calls {
                    self.session.add_tool_message(invocation.call, invocation.output);
                }
                self.session.add_assistant_message(response.content.clone());
                self.deliver(OutboundKind::Reply, response.content)
            }
            Err(e) => {
                error!("Turn failed in session {}: {}", self.session.id(), e);
                self.deliver(OutboundKind::Error, format!("⚠️ Error: {}", e))
            }
        }
    }

    /// Serve front-end requests until the channel closes.
    ///
    /// Requests are handled one at a time, so a turn always completes before
    /// the next message is read.
    pub async fn run(mut self, mut requests: mpsc::UnboundedReceiver<Request>) {
        self.start();
        while let Some(request) = requests.recv().await {
            match request {
                Request::ChatStart => {
                    self.start();
                }
                Request::ChatSubmit { text } => {
                    self.on_message(text).await;
                }
            }
        }
        info!("Chat closed, session {} discarded", self.session.id());
    }

    fn deliver(&self, kind: OutboundKind, content: String) -> OutboundMessage {
        let message = OutboundMessage::new(kind, content);
        if self.event_sender.send_message(message.clone()).is_err() {
            debug!("No front-end listening; dropped {:?} message", kind);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, AgentResponse, ResponseMetadata, ToolInvocation};
    use crate::events::{AppEvent, EventBus};
    use crate::session::{ChatMessage, MessageRole, ToolCallRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies from a script and remembers how long each transcript was
    struct ScriptedAgent {
        replies: Mutex<Vec<Result<AgentResponse, AgentError>>>,
        seen: Mutex<Vec<usize>>,
    }

    impl ScriptedAgent {
        fn new(mut replies: Vec<Result<AgentResponse, AgentError>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        async fn submit(&self, transcript: &[ChatMessage]) -> Result<AgentResponse, AgentError> {
            self.seen.lock().unwrap().push(transcript.len());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(AgentError::Processing("script exhausted".to_string())))
        }

        fn info(&self) -> AgentInfo {
            AgentInfo {
                name: "Crypto Agent".to_string(),
                description: "scripted".to_string(),
                model: "none".to_string(),
            }
        }
    }

    fn reply(content: &str, tool_calls: Vec<ToolInvocation>) -> Result<AgentResponse, AgentError> {
        Ok(AgentResponse {
            content: content.to_string(),
            tool_calls,
            metadata: ResponseMetadata::default(),
        })
    }

    #[test]
    fn test_start_greets_with_agent_name() {
        let bus = EventBus::new();
        let mut adapter = ChatAdapter::new(Arc::new(ScriptedAgent::new(vec![])), bus.sender());

        let greeting = adapter.start();
        assert_eq!(greeting.kind, OutboundKind::Greeting);
        assert_eq!(
            greeting.content,
            "👋 Assalamoalekum, I am Crypto Agent. Ask me about any cryptocurrency price."
        );
        assert!(adapter.session().is_empty());

        let mut receiver = bus.into_receiver();
        assert!(matches!(receiver.try_recv(), Ok(AppEvent::MessageSent(m)) if m == greeting));
    }

    #[test]
    fn test_start_resets_session() {
        let bus = EventBus::new();
        let agent = Arc::new(ScriptedAgent::new(vec![reply("hi", vec![])]));
        let mut adapter = ChatAdapter::new(agent, bus.sender());

        tokio_test::block_on(adapter.on_message("hello".to_string()));
        let first_id = adapter.session().id().to_string();
        assert_eq!(adapter.session().len(), 2);

        adapter.start();
        assert!(adapter.session().is_empty());
        assert_ne!(adapter.session().id(), first_id);
    }

    #[tokio::test]
    async fn test_reply_records_tools_before_answer() {
        let bus = EventBus::new();
        let invocation = ToolInvocation {
            call: ToolCallRecord {
                id: "call_1".to_string(),
                name: "crypto_price".to_string(),
                arguments: json!({"symbol": "BTC"}),
            },
            output: "The current price of BTC is $1".to_string(),
        };
        let agent = Arc::new(ScriptedAgent::new(vec![reply("BTC is $1", vec![invocation])]));
        let mut adapter = ChatAdapter::new(agent, bus.sender());

        let out = adapter.on_message("btc".to_string()).await;
        assert_eq!(out, OutboundMessage::new(OutboundKind::Reply, "BTC is $1"));

        let roles: Vec<MessageRole> = adapter.session().messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Tool, MessageRole::Assistant]);
    }

    #[tokio::test]
    async fn test_failure_becomes_error_message() {
        let bus = EventBus::new();
        let agent = Arc::new(ScriptedAgent::new(vec![
            Err(AgentError::Network("connection refused".to_string())),
            reply("ok", vec![]),
        ]));
        let mut adapter = ChatAdapter::new(agent.clone(), bus.sender());

        let out = adapter.on_message("btc".to_string()).await;
        assert_eq!(out.kind, OutboundKind::Error);
        assert_eq!(out.content, "⚠️ Error: Network error: connection refused");

        let out = adapter.on_message("eth".to_string()).await;
        assert_eq!(out.kind, OutboundKind::Reply);

        // The failed turn's user message stays in the history
        assert_eq!(*agent.seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(adapter.session().len(), 3);
    }
}
