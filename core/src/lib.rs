pub mod agent;
pub mod chat;
pub mod events;
pub mod session;
pub mod tools;

// Re-export main types for convenience
pub use agent::{Agent, AgentDefinition, AgentError, AgentFactory, AgentInfo, AgentResponse, RunConfig, TurnRunner};
pub use chat::ChatAdapter;
pub use events::{AppEvent, EventBus, EventSender, OutboundKind, OutboundMessage, Request, TokenUsage};
pub use session::{ChatMessage, MessageRole, Session, ToolCallRecord};
pub use tools::{PriceConfig, ToolExecutor, ToolRegistry, PRICE_TOOL_NAME};
