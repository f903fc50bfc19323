
// Test utilities
use crate::events::{AppEvent, EventBus};
use crate::tools::{PriceConfig, PriceExecutor, ToolRegistry};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TICKER_PATH: &str = "/api/v3/ticker/price";

/// Test helper to setup an event bus for testing
pub fn setup_event_bus() -> (crate::events::EventSender, mpsc::UnboundedReceiver<AppEvent>) {
    let bus = EventBus::new();
    let sender = bus.sender();
    let receiver = bus.into_receiver();
    (sender, receiver)
}

/// Test helper to collect events from a receiver
pub async fn collect_events(receiver: &mut mpsc::UnboundedReceiver<AppEvent>, count: usize) -> Vec<AppEvent> {
    let mut events = Vec::new();
    for _ in 0..count {
        if let Some(event) = receiver.recv().await {
            events.push(event);
        }
    }
    events
}

/// Test helper to find tool end event
pub fn find_tool_end_event(events: &[AppEvent]) -> Option<(bool, u64)> {
    for event in events {
        if let AppEvent::ToolEnd { ok, duration_ms, .. } = event {
            return Some((*ok, *duration_ms));
        }
    }
    None
}

/// Price config pointing at a mock ticker endpoint
pub fn price_config(server: &MockServer) -> PriceConfig {
    PriceConfig::new(format!("{}{}", server.uri(), TICKER_PATH))
}

pub fn price_executor(server: &MockServer) -> PriceExecutor {
    PriceExecutor::new(price_config(server))
}

pub fn builtin_registry(server: &MockServer) -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::with_builtin_tools(price_config(server)))
}

/// Mount a ticker response for one trading pair
pub async fn mount_ticker(server: &MockServer, pair: &str, price: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(TICKER_PATH))
        .and(query_param("symbol", pair))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": pair,
            "price": price
        })))
        .mount(server)
        .await;
}

/// Mount the exchange's answer for an unknown trading pair
pub async fn mount_unknown_symbol(server: &MockServer, pair: &str) {
    Mock::given(method("GET"))
        .and(path(TICKER_PATH))
        .and(query_param("symbol", pair))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -1121,
            "msg": "Invalid symbol."
        })))
        .mount(server)
        .await;
}
