use crate::state::{AppState, EntryKind, Lookup, LookupStatus};
use coinchat_core::{AppEvent, OutboundKind};
use std::time::Instant;
use tracing::{debug, error};

/// Handles application events coming from the chat adapter and tools
pub struct EventHandler;

impl EventHandler {
    pub async fn handle_event(state: &mut AppState, event: AppEvent) {
        debug!("Handling app event: {:?}", event);
        match event {
            AppEvent::MessageSent(message) => {
                let kind = match message.kind {
                    OutboundKind::Greeting | OutboundKind::Reply => EntryKind::Agent,
                    OutboundKind::Error => {
                        error!("Turn failed: {}", message.content);
                        EntryKind::Error
                    }
                };
                if message.ends_turn() {
                    state.processing = false;
                }
                state.push_entry(kind, message.content);
            }
            AppEvent::Quit => {
                state.should_quit = true;
            }

            AppEvent::ChatCreated => {
                debug!("Chat created");
            }
            AppEvent::ChatCompleted { token_usage } => {
                if let Some(usage) = token_usage {
                    debug!("Chat completed. Tokens used: {}", usage.total_tokens);
                }
            }
            AppEvent::TokenCount(usage) => {
                debug!("Token usage: {}/{} tokens", usage.input_tokens, usage.output_tokens);
                state.last_token_usage = Some(usage);
                state.total_token_usage.accumulate(usage);
            }

            // Tool lifecycle events
            AppEvent::ToolBegin { id, tool, summary, args: _ } => {
                debug!("Tool {} started: {}", id, summary);
                state.push_entry(EntryKind::System, summary.clone());
                state.lookups.push(Lookup {
                    id,
                    tool,
                    summary,
                    status: LookupStatus::Running,
                    output: None,
                    duration_ms: None,
                    start_time: Instant::now(),
                });
                state.auto_scroll_lookups = true;
            }
            AppEvent::ToolResult { id, output } => {
                if let Some(lookup) = state.lookup_mut(&id) {
                    lookup.output = Some(output);
                }
            }
            AppEvent::ToolEnd { id, ok, duration_ms } => {
                debug!("Tool {} ended: ok={}, duration={}ms", id, ok, duration_ms);
                if let Some(lookup) = state.lookup_mut(&id) {
                    lookup.status = if ok { LookupStatus::Completed } else { LookupStatus::Failed };
                    lookup.duration_ms = Some(duration_ms);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinchat_core::{AgentInfo, OutboundMessage, Request, TokenUsage};
    use tokio::sync::mpsc;

    fn test_state() -> (AppState, mpsc::UnboundedReceiver<Request>) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let info = AgentInfo {
            name: "Crypto Agent".to_string(),
            description: "test".to_string(),
            model: "mock".to_string(),
        };
        (AppState::new(request_tx, event_rx, info), request_rx)
    }

    #[tokio::test]
    async fn test_reply_ends_processing() {
        let (mut state, mut requests) = test_state();
        assert!(state.send_message("btc".to_string()));
        assert!(state.processing);
        assert!(matches!(requests.try_recv(), Ok(Request::ChatSubmit { text }) if text == "btc"));

        EventHandler::handle_event(
            &mut state,
            AppEvent::MessageSent(OutboundMessage::new(OutboundKind::Reply, "The current price of BTC is $1")),
        )
        .await;

        assert!(!state.processing);
        assert_eq!(state.entries.len(), 2);
        assert_eq!(state.entries[1].kind, EntryKind::Agent);
    }

    #[tokio::test]
    async fn test_greeting_keeps_processing_state() {
        let (mut state, _requests) = test_state();
        state.processing = true;
        EventHandler::handle_event(
            &mut state,
            AppEvent::MessageSent(OutboundMessage::new(OutboundKind::Greeting, "hi")),
        )
        .await;
        assert!(state.processing);
    }

    #[tokio::test]
    async fn test_error_message_shown_as_error() {
        let (mut state, _requests) = test_state();
        state.processing = true;
        EventHandler::handle_event(
            &mut state,
            AppEvent::MessageSent(OutboundMessage::new(OutboundKind::Error, "⚠️ Error: Network error: down")),
        )
        .await;
        assert!(!state.processing);
        assert_eq!(state.entries[0].kind, EntryKind::Error);
    }

    #[tokio::test]
    async fn test_lookup_lifecycle() {
        let (mut state, _requests) = test_state();
        EventHandler::handle_event(
            &mut state,
            AppEvent::ToolBegin {
                id: "t1".to_string(),
                tool: "crypto_price".to_string(),
                summary: "Looking up price: BTC".to_string(),
                args: None,
            },
        )
        .await;
        EventHandler::handle_event(
            &mut state,
            AppEvent::ToolResult { id: "t1".to_string(), output: "The current price of BTC is $1".to_string() },
        )
        .await;
        EventHandler::handle_event(&mut state, AppEvent::ToolEnd { id: "t1".to_string(), ok: true, duration_ms: 12 })
            .await;

        let lookup = &state.lookups[0];
        assert_eq!(lookup.status, LookupStatus::Completed);
        assert_eq!(lookup.output.as_deref(), Some("The current price of BTC is $1"));
        assert_eq!(lookup.duration_ms, Some(12));
        assert_eq!(state.entries[0].kind, EntryKind::System);
    }

    #[tokio::test]
    async fn test_usage_accumulates_until_restart() {
        let (mut state, mut requests) = test_state();
        let usage = TokenUsage { input_tokens: 10, output_tokens: 5, total_tokens: 15 };
        EventHandler::handle_event(&mut state, AppEvent::TokenCount(usage)).await;
        EventHandler::handle_event(&mut state, AppEvent::TokenCount(usage)).await;
        assert_eq!(state.total_token_usage.total_tokens, 30);

        state.restart_chat();
        assert_eq!(state.total_token_usage, TokenUsage::default());
        assert!(state.last_token_usage.is_none());
        assert!(matches!(requests.try_recv(), Ok(Request::ChatStart)));
    }
}
