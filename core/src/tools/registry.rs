use crate::tools::executors::{PriceConfig, PriceExecutor};
use crate::tools::types::{ToolError, ToolSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A capability the model may invoke by name
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Specification advertised to the model
    fn spec(&self) -> ToolSpec;

    /// Run the tool. Domain failures are reported in the returned text.
    async fn call(&self, args: Value) -> Result<String, ToolError>;
}

/// Registry mapping tool names to their specification and handler.
///
/// Built once at startup and shared read-only by every session. Only the
/// turn runner consults it, when the model asks for a tool.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Registered>,
}

struct Registered {
    spec: ToolSpec,
    handler: Arc<dyn ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in price lookup tool
    pub fn with_builtin_tools(price: PriceConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PriceExecutor::new(price)));
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let spec = handler.spec();
        self.tools.insert(spec.name.clone(), Registered { spec, handler });
    }

    /// Get all tool specifications, ordered by name
    pub fn get_all_specs(&self) -> Vec<&ToolSpec> {
        self.tools.values().map(|t| &t.spec).collect()
    }

    /// Get specification for a specific tool
    pub fn get_spec(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name).map(|t| &t.spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool list for a chat-completions request
    pub fn specs_for_openai(&self) -> Vec<Value> {
        self.tools.values().map(|t| t.spec.to_openai_function()).collect()
    }

    /// Validate arguments against tool schema
    pub fn validate_args(&self, name: &str, args: &Value) -> Result<(), ToolError> {
        let spec = self
            .get_spec(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        // Only the object shape and required fields are checked
        let obj = args.as_object().ok_or_else(|| ToolError::InvalidArguments {
            tool: name.to_string(),
            reason: "arguments must be an object".to_string(),
        })?;

        let required = spec
            .input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .into_iter()
            .flatten()
            .filter_map(|r| r.as_str());

        for field in required {
            if !obj.contains_key(field) {
                return Err(ToolError::InvalidArguments {
                    tool: name.to_string(),
                    reason: format!("missing required field: {}", field),
                });
            }
        }

        Ok(())
    }

    /// Validate and run a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<String, ToolError> {
        self.validate_args(name, &args)?;
        let handler = self
            .tools
            .get(name)
            .map(|t| t.handler.clone())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        handler.call(args).await
    }
}
