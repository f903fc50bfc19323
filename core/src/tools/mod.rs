pub mod types;
pub mod executor;
pub mod registry;
pub mod executors;

#[cfg(test)]
pub mod tests;

pub use types::*;
pub use executor::{ToolExecutor, ToolOutcome};
pub use registry::{ToolHandler, ToolRegistry};
pub use executors::{PriceConfig, PriceExecutor, PRICE_TOOL_NAME};
