use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Tool specification advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,   // JSON Schema
}

impl ToolSpec {
    /// Render in the chat-completions function-calling shape
    pub fn to_openai_function(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema,
            }
        })
    }
}

/// Errors raised while dispatching a tool call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

// Price lookup tool types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoPriceArgs {
    pub symbol: String,
}

/// Outcome of a single price lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceQuote {
    Found { symbol: String, price: String },
    NotFound { symbol: String },
    Failed { reason: String },
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceQuote::Found { symbol, price } => {
                write!(f, "The current price of {} is ${}", symbol, price)
            }
            PriceQuote::NotFound { symbol } => {
                write!(f, "Symbol '{}' not found on Binance. Try 'BTC' or 'ETH'.", symbol)
            }
            PriceQuote::Failed { reason } => write!(f, "Error fetching price: {}", reason),
        }
    }
}
