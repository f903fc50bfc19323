use crate::events::{AppEvent, EventSender};
use crate::tools::executors::PRICE_TOOL_NAME;
use crate::tools::registry::ToolRegistry;
use crate::tools::types::CryptoPriceArgs;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Result of running one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    /// Text handed back to the model
    pub output: String,
    /// False when the call could not be dispatched (unknown tool, bad arguments)
    pub ok: bool,
    pub duration_ms: u64,
}

/// Runs tool calls against the registry and reports their lifecycle on the event bus
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    event_sender: EventSender,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, event_sender: EventSender) -> Self {
        Self { registry, event_sender }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a tool with the given arguments and return its textual result.
    ///
    /// Dispatch errors become an `Error: ...` result so the caller can pass
    /// them back to the model instead of failing the turn.
    pub async fn execute_tool_with_result(&self, id: String, tool: &str, args: Value) -> ToolOutcome {
        let summary = Self::get_tool_summary(tool, &args);

        let _ = self.event_sender.send(AppEvent::ToolBegin {
            id: id.clone(),
            tool: tool.to_string(),
            summary,
            args: Some(args.clone()),
        });

        let start = Instant::now();
        let (output, ok) = match self.registry.execute(tool, args).await {
            Ok(output) => (output, true),
            Err(e) => {
                debug!("Tool {} rejected: {}", tool, e);
                (format!("Error: {}", e), false)
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let _ = self.event_sender.send(AppEvent::ToolResult {
            id: id.clone(),
            output: output.clone(),
        });
        let _ = self.event_sender.send(AppEvent::ToolEnd { id, ok, duration_ms });

        ToolOutcome { output, ok, duration_ms }
    }

    fn get_tool_summary(tool: &str, args: &Value) -> String {
        match tool {
            PRICE_TOOL_NAME => {
                if let Ok(args) = serde_json::from_value::<CryptoPriceArgs>(args.clone()) {
                    format!("Looking up price: {}", args.symbol.trim().to_uppercase())
                } else {
                    "Looking up price".to_string()
                }
            }
            other => format!("Running {}", other),
        }
    }
}
