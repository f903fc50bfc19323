use crate::state::{AppState, Command, EntryKind};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

/// What a line typed into the input box asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Clear,
    Info,
    Usage,
    Send(String),
}

impl InputAction {
    /// Interpret submitted input; `None` for blank input
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        match input {
            "" => None,
            "/quit" | "/q" => Some(Self::Quit),
            "/clear" | "/new" => Some(Self::Clear),
            "/info" => Some(Self::Info),
            "/usage" | "/context" => Some(Self::Usage),
            text => Some(Self::Send(text.to_string())),
        }
    }
}

/// Handles input events for the application
pub struct InputHandler;

impl InputHandler {
    /// Handle input events (keyboard and mouse)
    pub async fn handle_event(state: &mut AppState, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Self::handle_key_event(state, key.code, key.modifiers);
            }
            Event::Mouse(mouse_event) => {
                Self::handle_mouse_event(state, mouse_event);
            }
            _ => {}
        }
    }

    fn handle_key_event(state: &mut AppState, key_code: KeyCode, modifiers: KeyModifiers) {
        match key_code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                state.should_quit = true;
            }
            KeyCode::Char('q') if state.focused_panel != 0 => {
                state.should_quit = true;
            }
            KeyCode::Tab => {
                state.focused_panel = (state.focused_panel + 1) % 3;
            }
            KeyCode::Up => {
                if state.command_palette_open && state.focused_panel == 0 {
                    state.command_palette_selected = state.command_palette_selected.saturating_sub(1);
                } else if state.focused_panel == 0 {
                    Self::move_cursor_up(state);
                } else {
                    Self::scroll_focused(state, -1);
                }
            }
            KeyCode::Down => {
                if state.command_palette_open && state.focused_panel == 0 {
                    let count = filtered_commands(state).len();
                    if state.command_palette_selected + 1 < count {
                        state.command_palette_selected += 1;
                    }
                } else if state.focused_panel == 0 {
                    Self::move_cursor_down(state);
                } else {
                    Self::scroll_focused(state, 1);
                }
            }
            KeyCode::PageUp => Self::scroll_focused(state, -10),
            KeyCode::PageDown => Self::scroll_focused(state, 10),
            KeyCode::Enter if state.focused_panel == 0 => {
                if state.command_palette_open {
                    Self::execute_selected_command(state);
                } else {
                    Self::submit_input(state);
                }
            }
            KeyCode::Char('/')
                if state.focused_panel == 0 && state.input.is_empty() && !state.command_palette_open =>
            {
                state.command_palette_open = true;
                state.command_palette_selected = 0;
                state.command_palette_filter.clear();
            }
            KeyCode::Char(c) if state.focused_panel == 0 => {
                if state.command_palette_open {
                    if c.is_alphanumeric() || c == '/' || c == '-' || c == '_' {
                        state.command_palette_filter.push(c);
                        state.command_palette_selected = 0;
                    }
                } else {
                    Self::insert_char(state, c);
                }
            }
            KeyCode::Backspace if state.focused_panel == 0 => {
                if state.command_palette_open {
                    if state.command_palette_filter.pop().is_none() {
                        state.command_palette_open = false;
                    }
                    state.command_palette_selected = 0;
                } else {
                    Self::delete_char(state);
                }
            }
            KeyCode::Left if state.focused_panel == 0 => Self::move_cursor_left(state),
            KeyCode::Right if state.focused_panel == 0 => Self::move_cursor_right(state),
            KeyCode::Home if state.focused_panel == 0 => state.input_cursor = 0,
            KeyCode::End => match state.focused_panel {
                0 => state.input_cursor = state.input.len(),
                1 => state.auto_scroll_chat = true,
                _ => state.auto_scroll_lookups = true,
            },
            KeyCode::Esc => {
                if state.command_palette_open {
                    state.command_palette_open = false;
                    state.command_palette_filter.clear();
                    state.command_palette_selected = 0;
                } else {
                    state.input.clear();
                    state.input_cursor = 0;
                    state.focused_panel = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_mouse_event(state: &mut AppState, mouse_event: MouseEvent) {
        match mouse_event.kind {
            MouseEventKind::ScrollUp => Self::scroll_focused(state, -3),
            MouseEventKind::ScrollDown => Self::scroll_focused(state, 3),
            _ => {}
        }
    }

    /// Scroll the focused panel; manual scrolling turns auto-scroll off
    fn scroll_focused(state: &mut AppState, delta: isize) {
        let apply = |pos: usize| {
            if delta < 0 {
                pos.saturating_sub(delta.unsigned_abs())
            } else {
                pos.saturating_add(delta.unsigned_abs())
            }
        };
        match state.focused_panel {
            0 => state.input_scroll = apply(state.input_scroll),
            1 => {
                state.chat_scroll = apply(state.chat_scroll);
                state.auto_scroll_chat = false;
            }
            _ => {
                state.lookups_scroll = apply(state.lookups_scroll);
                state.auto_scroll_lookups = false;
            }
        }
    }

    /// Submit the current input to the adapter, or run a slash command
    fn submit_input(state: &mut AppState) {
        if state.processing {
            return;
        }
        let Some(action) = InputAction::parse(&state.input) else {
            return;
        };

        state.input.clear();
        state.input_cursor = 0;
        state.input_scroll = 0;

        match action {
            InputAction::Quit => state.should_quit = true,
            InputAction::Clear => state.restart_chat(),
            InputAction::Info => {
                let info = state.agent_info.clone();
                state.push_entry(
                    EntryKind::System,
                    format!("Agent: {} ({}) - {}", info.name, info.model, info.description),
                );
            }
            InputAction::Usage => {
                let text = match state.last_token_usage {
                    Some(last) => format!(
                        "Token usage:\n• Last turn: {} in / {} out\n• Conversation total: {} tokens",
                        last.input_tokens, last.output_tokens, state.total_token_usage.total_tokens
                    ),
                    None => "No token usage information available yet.".to_string(),
                };
                state.push_entry(EntryKind::System, text);
            }
            InputAction::Send(text) => {
                state.send_message(text);
            }
        }
    }

    fn insert_char(state: &mut AppState, ch: char) {
        if state.input_cursor <= state.input.len() {
            state.input.insert(state.input_cursor, ch);
            state.input_cursor += ch.len_utf8();
        }
    }

    /// Delete the character before the cursor
    fn delete_char(state: &mut AppState) {
        if let Some((idx, _)) = state.input[..state.input_cursor].char_indices().next_back() {
            state.input.remove(idx);
            state.input_cursor = idx;
        }
    }

    fn move_cursor_left(state: &mut AppState) {
        if let Some((idx, _)) = state.input[..state.input_cursor].char_indices().next_back() {
            state.input_cursor = idx;
        }
    }

    fn move_cursor_right(state: &mut AppState) {
        if let Some(ch) = state.input[state.input_cursor..].chars().next() {
            state.input_cursor += ch.len_utf8();
        }
    }

    /// Move to the same column on the previous line, or to the start
    fn move_cursor_up(state: &mut AppState) {
        let before = &state.input[..state.input_cursor];
        let Some(line_start) = before.rfind('\n').map(|p| p + 1) else {
            state.input_cursor = 0;
            return;
        };
        let col = state.input_cursor - line_start;
        let prev_start = before[..line_start - 1].rfind('\n').map(|p| p + 1).unwrap_or(0);
        let prev_len = line_start - 1 - prev_start;
        state.input_cursor = Self::floor_boundary(&state.input, prev_start + col.min(prev_len));
    }

    /// Move to the same column on the next line, or to the end
    fn move_cursor_down(state: &mut AppState) {
        let Some(offset) = state.input[state.input_cursor..].find('\n') else {
            state.input_cursor = state.input.len();
            return;
        };
        let line_start = state.input[..state.input_cursor].rfind('\n').map(|p| p + 1).unwrap_or(0);
        let col = state.input_cursor - line_start;
        let next_start = state.input_cursor + offset + 1;
        let next_end = state.input[next_start..]
            .find('\n')
            .map(|p| next_start + p)
            .unwrap_or(state.input.len());
        state.input_cursor = Self::floor_boundary(&state.input, next_start + col.min(next_end - next_start));
    }

    fn floor_boundary(s: &str, mut idx: usize) -> usize {
        while idx > 0 && !s.is_char_boundary(idx) {
            idx -= 1;
        }
        idx
    }

    fn execute_selected_command(state: &mut AppState) {
        let selected = filtered_commands(state)
            .get(state.command_palette_selected)
            .map(|cmd| cmd.name.clone());

        state.command_palette_open = false;
        state.command_palette_filter.clear();
        state.command_palette_selected = 0;

        if let Some(command_text) = selected {
            state.input = command_text;
            state.input_cursor = state.input.len();
            Self::submit_input(state);
        }
    }
}

/// Commands whose name or description matches the palette filter
pub fn filtered_commands(state: &AppState) -> Vec<&Command> {
    let filter = state.command_palette_filter.to_lowercase();
    state
        .available_commands
        .iter()
        .filter(|cmd| {
            filter.is_empty()
                || cmd.name.to_lowercase().contains(&filter)
                || cmd.description.to_lowercase().contains(&filter)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinchat_core::{AgentInfo, Request};
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

    #[test]
    fn test_parse_input() {
        assert_eq!(InputAction::parse("   "), None);
        assert_eq!(InputAction::parse("/quit"), Some(InputAction::Quit));
        assert_eq!(InputAction::parse("/clear"), Some(InputAction::Clear));
        assert_eq!(InputAction::parse(" /usage "), Some(InputAction::Usage));
        assert_eq!(InputAction::parse(" btc "), Some(InputAction::Send("btc".to_string())));
    }

    #[test]
    fn test_submit_sends_request() {
        let (mut state, mut requests) = test_state();
        for c in "eth".chars() {
            InputHandler::handle_key_event(&mut state, KeyCode::Char(c), KeyModifiers::NONE);
        }
        InputHandler::handle_key_event(&mut state, KeyCode::Enter, KeyModifiers::NONE);

        assert!(state.input.is_empty());
        assert!(state.processing);
        assert!(matches!(requests.try_recv(), Ok(Request::ChatSubmit { text }) if text == "eth"));
    }

    #[test]
    fn test_no_submit_while_processing() {
        let (mut state, mut requests) = test_state();
        state.processing = true;
        state.input = "btc".to_string();
        InputHandler::submit_input(&mut state);
        assert!(requests.try_recv().is_err());
        assert_eq!(state.input, "btc");
    }

    #[test]
    fn test_palette_runs_filtered_command() {
        let (mut state, mut requests) = test_state();
        InputHandler::handle_key_event(&mut state, KeyCode::Char('/'), KeyModifiers::NONE);
        assert!(state.command_palette_open);
        for c in "clear".chars() {
            InputHandler::handle_key_event(&mut state, KeyCode::Char(c), KeyModifiers::NONE);
        }
        InputHandler::handle_key_event(&mut state, KeyCode::Enter, KeyModifiers::NONE);

        assert!(!state.command_palette_open);
        assert!(matches!(requests.try_recv(), Ok(Request::ChatStart)));
    }

    #[test]
    fn test_delete_multibyte_char() {
        let (mut state, _requests) = test_state();
        state.input = "₿tc".to_string();
        state.input_cursor = "₿".len();
        InputHandler::delete_char(&mut state);
        assert_eq!(state.input, "tc");
        assert_eq!(state.input_cursor, 0);
    }

    #[test]
    fn test_cursor_moves_between_lines() {
        let (mut state, _requests) = test_state();
        state.input = "abcd\nef".to_string();
        state.input_cursor = state.input.len();
        InputHandler::move_cursor_up(&mut state);
        assert_eq!(state.input_cursor, 2);
        InputHandler::move_cursor_down(&mut state);
        assert_eq!(state.input_cursor, 7);
    }
}
