use crate::events::{EventSender, TokenUsage};
use crate::session::{ChatMessage, ToolCallRecord};
use crate::tools::{PriceConfig, ToolRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;

pub mod config;
pub mod definition;
pub mod mock;
pub mod runner;

pub use config::RunConfig;
pub use definition::AgentDefinition;
pub use mock::MockAgent;
pub use runner::TurnRunner;

/// Main agent trait that all agent implementations must satisfy
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run one turn over the full transcript, latest user message last
    async fn submit(&self, transcript: &[ChatMessage]) -> Result<AgentResponse, AgentError>;

    /// Get agent information
    fn info(&self) -> AgentInfo;
}

/// Response from an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    /// Tools run during the turn, in call order
    pub tool_calls: Vec<ToolInvocation>,
    pub metadata: ResponseMetadata,
}

/// A tool call made during a turn and the text it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub call: ToolCallRecord,
    pub output: String,
}

/// Metadata about the response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub processing_time: Option<Duration>,
    pub token_usage: Option<TokenUsage>,
    pub model: Option<String>,
    pub round_trips: usize,
    pub timestamp: SystemTime,
}

impl ResponseMetadata {
    pub fn new() -> Self {
        Self {
            processing_time: None,
            token_usage: None,
            model: None,
            round_trips: 0,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_processing_time(mut self, duration: Duration) -> Self {
        self.processing_time = Some(duration);
        self
    }

    pub fn with_token_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.token_usage = usage;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_round_trips(mut self, round_trips: usize) -> Self {
        self.round_trips = round_trips;
        self
    }
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub model: String,
}

/// Errors that can occur during agent operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Model provider rejected the credentials: {0}")]
    Authentication(String),

    #[error("Model provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Invalid response from model provider: {0}")]
    InvalidResponse(String),

    #[error("Agent configuration error: {0}")]
    Configuration(String),

    #[error("Gave up after {limit} model round-trips without a final answer")]
    ToolLoopExceeded { limit: usize },

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Factory for creating different types of agents
pub struct AgentFactory;

impl AgentFactory {
    /// Create the crypto agent backed by the remote model.
    /// Required: GEMINI_API_KEY
    /// Optional: COINCHAT_BASE_URL, COINCHAT_MODEL, COINCHAT_MAX_TOOL_TURNS,
    /// COINCHAT_TRACING, COINCHAT_PRICE_URL
    pub fn create_from_env(event_sender: EventSender) -> Result<Arc<dyn Agent>, AgentError> {
        let config = RunConfig::from_env()?;
        let tools = Arc::new(ToolRegistry::with_builtin_tools(PriceConfig::from_env()));
        let definition = AgentDefinition::crypto_agent(tools);

        Ok(Arc::new(TurnRunner::new(definition, config, event_sender)))
    }

    /// Create the offline scripted agent; price lookups still go to the price endpoint
    pub fn create_mock(event_sender: EventSender) -> Arc<dyn Agent> {
        let tools = Arc::new(ToolRegistry::with_builtin_tools(PriceConfig::from_env()));
        Arc::new(MockAgent::new(AgentDefinition::crypto_agent(tools), event_sender))
    }
}
