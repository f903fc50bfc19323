use anyhow::{Context, Result};
use clap::Parser;
use coinchat_core::{Agent, AgentFactory, AppEvent, ChatAdapter, EventBus, OutboundKind, Request};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Chat with an agent that knows current cryptocurrency prices
#[derive(Parser, Debug)]
#[command(name = "coinchat", version, about)]
struct Args {
    /// Line-oriented chat on stdin/stdout instead of the full-screen UI
    #[arg(long)]
    plain: bool,

    /// Use the scripted offline agent even if GEMINI_API_KEY is set
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv();
    let args = Args::parse();
    info!("Starting coinchat CLI with {:?}", args);

    let event_bus = EventBus::new();
    let agent = if args.offline {
        AgentFactory::create_mock(event_bus.sender())
    } else {
        match AgentFactory::create_from_env(event_bus.sender()) {
            Ok(agent) => agent,
            Err(e) => {
                warn!("{}; falling back to the offline agent", e);
                AgentFactory::create_mock(event_bus.sender())
            }
        }
    };

    if args.plain {
        run_plain(agent, event_bus).await?;
    } else {
        coinchat_tui::App::launch(agent, event_bus).await?;
    }

    info!("coinchat CLI shutting down");
    Ok(())
}

/// Read messages from stdin one line at a time and print replies as they arrive
async fn run_plain(agent: Arc<dyn Agent>, event_bus: EventBus) -> Result<()> {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let adapter = ChatAdapter::new(agent, event_bus.sender());
    let chat = tokio::spawn(adapter.run(request_rx));
    let mut events = event_bus.into_receiver();

    // The adapter greets on startup
    print_until(&mut events, |kind| kind == OutboundKind::Greeting).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let text = line.trim();
        match text {
            "" => continue,
            "/quit" | "/q" => break,
            "/clear" => {
                request_tx.send(Request::ChatStart).context("chat adapter stopped")?;
                print_until(&mut events, |kind| kind == OutboundKind::Greeting).await;
            }
            _ => {
                request_tx
                    .send(Request::ChatSubmit { text: text.to_string() })
                    .context("chat adapter stopped")?;
                print_until(&mut events, |kind| kind != OutboundKind::Greeting).await;
            }
        }
    }

    drop(request_tx);
    chat.await.context("chat adapter panicked")?;
    Ok(())
}

/// Print events until a message whose kind satisfies `done` has been shown
async fn print_until<F>(events: &mut mpsc::UnboundedReceiver<AppEvent>, done: F)
where
    F: Fn(OutboundKind) -> bool,
{
    while let Some(event) = events.recv().await {
        match event {
            AppEvent::MessageSent(message) => {
                match message.kind {
                    OutboundKind::Error => eprintln!("{}", message.content),
                    _ => println!("{}", message.content),
                }
                if done(message.kind) {
                    return;
                }
            }
            AppEvent::ToolBegin { summary, .. } => println!("  ↳ {}", summary),
            AppEvent::ToolEnd { ok: false, id, .. } => warn!("Lookup {} failed", id),
            AppEvent::Quit => return,
            _ => {}
        }
    }
}
