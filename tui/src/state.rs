use coinchat_core::{AgentInfo, AppEvent, Request, TokenUsage};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::warn;

/// Command for the command palette
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub description: String,
}

/// Who a chat panel entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Agent,
    System,
    Error,
}

/// One line item in the chat panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub kind: EntryKind,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Running,
    Completed,
    Failed,
}

/// A price lookup shown in the lookups panel
#[derive(Debug, Clone)]
pub struct Lookup {
    pub id: String,
    pub tool: String,
    pub summary: String,
    pub status: LookupStatus,
    pub output: Option<String>,
    pub duration_ms: Option<u64>,
    pub start_time: Instant,
}

/// Application state
pub struct AppState {
    /// What the chat panel shows; the conversation itself lives in the adapter
    pub entries: Vec<ChatEntry>,

    /// Lookups of the current conversation, oldest first
    pub lookups: Vec<Lookup>,

    /// Current input text
    pub input: String,

    /// Cursor position in input text (byte index)
    pub input_cursor: usize,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Whether we're waiting for a reply
    pub processing: bool,

    /// Event receiver for handling app events
    pub event_receiver: mpsc::UnboundedReceiver<AppEvent>,

    /// Requests to the chat adapter
    pub request_tx: mpsc::UnboundedSender<Request>,

    pub agent_info: AgentInfo,

    /// Chat scroll state
    pub chat_scroll: usize,

    /// Lookups scroll state
    pub lookups_scroll: usize,

    /// Input scroll state (for multi-line input)
    pub input_scroll: usize,

    /// Currently focused panel (0 = input, 1 = chat, 2 = lookups)
    pub focused_panel: usize,

    /// Whether to auto-scroll chat to bottom on new messages
    pub auto_scroll_chat: bool,

    /// Whether to auto-scroll lookups to bottom on new lookups
    pub auto_scroll_lookups: bool,

    /// Whether cursor is visible (for blinking effect)
    pub cursor_visible: bool,

    /// Last time cursor blinked
    pub last_cursor_blink: Instant,

    /// Command palette state
    pub command_palette_open: bool,

    /// Currently selected command in palette
    pub command_palette_selected: usize,

    /// Filter text for command palette
    pub command_palette_filter: String,

    /// Available commands
    pub available_commands: Vec<Command>,

    /// Usage of the most recent turn
    pub last_token_usage: Option<TokenUsage>,

    /// Usage summed over the conversation
    pub total_token_usage: TokenUsage,
}

impl AppState {
    pub fn new(
        request_tx: mpsc::UnboundedSender<Request>,
        event_receiver: mpsc::UnboundedReceiver<AppEvent>,
        agent_info: AgentInfo,
    ) -> Self {
        let available_commands = vec![
            Command {
                name: "/clear".to_string(),
                description: "Forget the conversation and start a new one".to_string(),
            },
            Command {
                name: "/info".to_string(),
                description: "Show agent information".to_string(),
            },
            Command {
                name: "/usage".to_string(),
                description: "Show token usage for this conversation".to_string(),
            },
            Command {
                name: "/quit".to_string(),
                description: "Exit the application".to_string(),
            },
        ];

        Self {
            entries: Vec::new(),
            lookups: Vec::new(),
            input: String::new(),
            input_cursor: 0,
            should_quit: false,
            processing: false,
            event_receiver,
            request_tx,
            agent_info,
            chat_scroll: 0,
            lookups_scroll: 0,
            input_scroll: 0,
            focused_panel: 0,
            auto_scroll_chat: true,
            auto_scroll_lookups: true,
            cursor_visible: true,
            last_cursor_blink: Instant::now(),
            command_palette_open: false,
            command_palette_selected: 0,
            command_palette_filter: String::new(),
            available_commands,
            last_token_usage: None,
            total_token_usage: TokenUsage::default(),
        }
    }

    /// Update cursor blinking state
    pub fn update_cursor_blink(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_cursor_blink).as_millis() >= 500 {
            self.cursor_visible = !self.cursor_visible;
            self.last_cursor_blink = now;
        }
    }

    pub fn push_entry(&mut self, kind: EntryKind, content: impl Into<String>) {
        self.entries.push(ChatEntry {
            kind,
            content: content.into(),
        });
        self.auto_scroll_chat = true;
    }

    /// Hand a message to the adapter; returns false if the adapter is gone
    pub fn send_message(&mut self, text: String) -> bool {
        self.push_entry(EntryKind::User, text.clone());
        if self.request_tx.send(Request::ChatSubmit { text }).is_err() {
            warn!("Chat adapter stopped; message not sent");
            self.push_entry(EntryKind::Error, "The chat service has stopped.");
            return false;
        }
        self.processing = true;
        true
    }

    /// Drop the display and ask the adapter for a fresh conversation
    pub fn restart_chat(&mut self) {
        self.entries.clear();
        self.lookups.clear();
        self.chat_scroll = 0;
        self.lookups_scroll = 0;
        self.auto_scroll_chat = true;
        self.auto_scroll_lookups = true;
        self.last_token_usage = None;
        self.total_token_usage = TokenUsage::default();

        if self.request_tx.send(Request::ChatStart).is_err() {
            warn!("Chat adapter stopped; cannot start a new chat");
            self.push_entry(EntryKind::Error, "The chat service has stopped.");
        }
    }

    pub fn lookup_mut(&mut self, id: &str) -> Option<&mut Lookup> {
        self.lookups.iter_mut().find(|l| l.id == id)
    }
}
