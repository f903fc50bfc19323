use anyhow::Result;
use coinchat_core::{Agent, AgentInfo, AppEvent, ChatAdapter, EventBus, Request};
use crossterm::event;
use ratatui::{backend::Backend, Frame, Terminal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    components::{ChatComponent, CommandPaletteComponent, InputComponent, LookupsComponent, StatusComponent},
    handlers::{EventHandler, InputHandler},
    state::AppState,
    utils::{layout, terminal},
};

/// Terminal chat front-end
pub struct App {
    state: AppState,
}

impl App {
    /// `request_tx` feeds a running `ChatAdapter`; `event_receiver` is its event bus
    pub fn new(
        request_tx: mpsc::UnboundedSender<Request>,
        event_receiver: mpsc::UnboundedReceiver<AppEvent>,
        agent_info: AgentInfo,
    ) -> Self {
        Self {
            state: AppState::new(request_tx, event_receiver, agent_info),
        }
    }

    /// Serve `agent` through a `ChatAdapter` and run the TUI until the user quits.
    ///
    /// `event_bus` must be the bus the agent was built with.
    pub async fn launch(agent: Arc<dyn Agent>, event_bus: EventBus) -> Result<()> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let agent_info = agent.info();
        let adapter = ChatAdapter::new(agent, event_bus.sender());
        let chat = tokio::spawn(adapter.run(request_rx));

        let mut app = App::new(request_tx, event_bus.into_receiver(), agent_info);
        let result = app.run().await;

        // An in-flight turn has nobody left to show its reply to
        chat.abort();
        result
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = terminal::setup()?;
        info!("TUI initialized, starting main loop");

        let result = self.run_app(&mut terminal).await;

        terminal::restore(&mut terminal)?;
        result
    }

    async fn run_app<B: Backend + std::io::Write>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.state.update_cursor_blink();
            terminal.draw(|f| self.ui(f))?;

            tokio::select! {
                terminal_event = async {
                    if event::poll(Duration::from_millis(0)).unwrap_or(false) {
                        event::read().ok()
                    } else {
                        None
                    }
                } => {
                    if let Some(event) = terminal_event {
                        InputHandler::handle_event(&mut self.state, event).await;
                    }
                },

                app_event = self.state.event_receiver.recv() => {
                    match app_event {
                        Some(event) => EventHandler::handle_event(&mut self.state, event).await,
                        None => self.state.should_quit = true,
                    }
                },

                // Keep redrawing while idle
                _ = tokio::time::sleep(Duration::from_millis(50)) => {},
            }

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn ui(&mut self, f: &mut Frame) {
        let main_chunks = layout::create_main_layout(f.size());
        let top_chunks = layout::create_top_panel_layout(main_chunks[0]);

        ChatComponent::render(&mut self.state, f, top_chunks[0]);
        LookupsComponent::render(&mut self.state, f, top_chunks[1]);
        InputComponent::render(&mut self.state, f, main_chunks[1]);
        StatusComponent::render(&self.state, f, main_chunks[2]);

        if self.state.command_palette_open {
            CommandPaletteComponent::render(&self.state, f);
        }
    }
}
