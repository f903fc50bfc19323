use crate::tools::ToolRegistry;
use std::sync::Arc;

pub const CRYPTO_AGENT_NAME: &str = "Crypto Agent";

/// Name, instructions and tool set of an agent.
///
/// Immutable once built and shared by every session. The instructions are
/// advisory text for the model; nothing here enforces them.
#[derive(Clone)]
pub struct AgentDefinition {
    pub name: String,
    pub instructions: String,
    pub tools: Arc<ToolRegistry>,
}

impl AgentDefinition {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools,
        }
    }

    /// The price-lookup agent
    pub fn crypto_agent(tools: Arc<ToolRegistry>) -> Self {
        Self::new(CRYPTO_AGENT_NAME, include_str!("../prompts/crypto_agent.md"), tools)
    }

    /// First message shown when a conversation starts
    pub fn greeting(name: &str) -> String {
        format!("👋 Assalamoalekum, I am {}. Ask me about any cryptocurrency price.", name)
    }
}

impl std::fmt::Debug for AgentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tools: Vec<&str> = self.tools.get_all_specs().iter().map(|s| s.name.as_str()).collect();
        f.debug_struct("AgentDefinition")
            .field("name", &self.name)
            .field("tools", &tools)
            .finish()
    }
}
