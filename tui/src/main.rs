use anyhow::Result;
use coinchat_core::{AgentFactory, EventBus};
use coinchat_tui::App;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr only; the terminal belongs to the UI
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Optional: load .env (ignore errors if missing)
    let _ = dotenvy::dotenv();
    info!("Starting coinchat TUI");

    let event_bus = EventBus::new();
    let agent = match AgentFactory::create_from_env(event_bus.sender()) {
        Ok(agent) => agent,
        Err(e) => {
            warn!("{}; falling back to the offline agent", e);
            AgentFactory::create_mock(event_bus.sender())
        }
    };

    App::launch(agent, event_bus).await?;

    info!("coinchat TUI shutting down");
    Ok(())
}
