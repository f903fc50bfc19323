use super::{Agent, AgentDefinition, AgentError, AgentInfo, AgentResponse, ResponseMetadata, ToolInvocation};
use crate::events::{AppEvent, EventSender};
use crate::session::{ChatMessage, MessageRole, ToolCallRecord};
use crate::tools::{ToolExecutor, PRICE_TOOL_NAME};
use async_trait::async_trait;
use serde_json::json;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Scripted agent that needs no model provider.
///
/// A message that looks like a ticker symbol is looked up with the price
/// tool; anything else gets a prompt to name a symbol.
pub struct MockAgent {
    info: AgentInfo,
    delay: Duration,
    executor: ToolExecutor,
    event_sender: EventSender,
}

impl MockAgent {
    pub fn new(definition: AgentDefinition, event_sender: EventSender) -> Self {
        Self {
            info: AgentInfo {
                name: definition.name.clone(),
                description: "Offline agent that looks up symbols without a model".to_string(),
                model: "mock".to_string(),
            },
            delay: Duration::from_millis(300), // Simulate processing time
            executor: ToolExecutor::new(definition.tools, event_sender.clone()),
            event_sender,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// A single token of 2-10 ASCII letters or digits
    fn as_symbol(message: &str) -> Option<&str> {
        let token = message.trim();
        let plausible = (2..=10).contains(&token.len())
            && token.chars().all(|c| c.is_ascii_alphanumeric());
        plausible.then_some(token)
    }
}

#[async_trait]
impl Agent for MockAgent {
    async fn submit(&self, transcript: &[ChatMessage]) -> Result<AgentResponse, AgentError> {
        let start = Instant::now();
        let message = transcript
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        // Simulate potential errors for testing
        if message.trim().eq_ignore_ascii_case("error") {
            return Err(AgentError::Processing("Simulated error".to_string()));
        }
        if message.trim().eq_ignore_ascii_case("network error") {
            return Err(AgentError::Network("Simulated network failure".to_string()));
        }

        let _ = self.event_sender.send(AppEvent::ChatCreated);
        tokio::time::sleep(self.delay).await;

        let mut tool_calls = Vec::new();
        let content = match Self::as_symbol(message) {
            Some(symbol) if self.executor.registry().contains(PRICE_TOOL_NAME) => {
                let id = Uuid::new_v4().to_string();
                let args = json!({ "symbol": symbol });
                let outcome = self
                    .executor
                    .execute_tool_with_result(id.clone(), PRICE_TOOL_NAME, args.clone())
                    .await;
                tool_calls.push(ToolInvocation {
                    call: ToolCallRecord {
                        id,
                        name: PRICE_TOOL_NAME.to_string(),
                        arguments: args,
                    },
                    output: outcome.output.clone(),
                });
                outcome.output
            }
            _ => "Please tell me the symbol of a cryptocurrency, for example BTC or ETH.".to_string(),
        };

        let _ = self.event_sender.send(AppEvent::ChatCompleted { token_usage: None });

        Ok(AgentResponse {
            content,
            tool_calls,
            metadata: ResponseMetadata::new()
                .with_processing_time(start.elapsed())
                .with_model(Some("mock".to_string()))
                .with_round_trips(1),
        })
    }

    fn info(&self) -> AgentInfo {
        self.info.clone()
    }
}
