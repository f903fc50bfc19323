use crate::state::AppState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Component for rendering the input box
pub struct InputComponent;

impl InputComponent {
    pub fn render(state: &mut AppState, f: &mut Frame, area: Rect) {
        if state.processing {
            let waiting = Paragraph::new("Waiting for reply...")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(" Message "));
            f.render_widget(waiting, area);
            return;
        }

        let text_width = area.width.saturating_sub(2) as usize;
        let text_height = area.height.saturating_sub(2) as usize;
        let (lines, cursor_line, cursor_col) = Self::layout_input(&state.input, state.input_cursor, text_width);

        // Keep the cursor line in view
        let max_scroll = lines.len().saturating_sub(text_height);
        let mut scroll_pos = state.input_scroll.min(max_scroll);
        if cursor_line < scroll_pos {
            scroll_pos = cursor_line;
        } else if text_height > 0 && cursor_line >= scroll_pos + text_height {
            scroll_pos = cursor_line + 1 - text_height;
        }
        state.input_scroll = scroll_pos;

        let display_text = lines.iter().skip(scroll_pos).take(text_height).cloned().collect::<Vec<_>>().join("\n");

        let focused = state.focused_panel == 0;
        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title = if focused {
            " Message (Enter to send, / for commands) "
        } else {
            " Message "
        };

        let input_widget = Paragraph::new(display_text)
            .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title));
        f.render_widget(input_widget, area);

        if focused && state.cursor_visible {
            let cursor_x = area.x + 1 + cursor_col as u16;
            let cursor_y = area.y + 1 + (cursor_line - scroll_pos) as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) && cursor_y < area.y + area.height.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }

    /// Hard-wrap `input` at `width` chars; returns lines plus cursor line and column
    fn layout_input(input: &str, cursor: usize, width: usize) -> (Vec<String>, usize, usize) {
        let width = width.max(1);
        let mut lines = vec![String::new()];
        let mut cursor_pos = (0, 0);

        for (i, ch) in input.char_indices() {
            if i == cursor {
                cursor_pos = (lines.len() - 1, lines.last().map_or(0, |l| l.chars().count()));
            }
            if ch == '\n' {
                lines.push(String::new());
                continue;
            }
            if lines.last().map_or(0, |l| l.chars().count()) >= width {
                lines.push(String::new());
                if i == cursor {
                    cursor_pos = (lines.len() - 1, 0);
                }
            }
            if let Some(line) = lines.last_mut() {
                line.push(ch);
            }
        }
        if cursor >= input.len() {
            cursor_pos = (lines.len() - 1, lines.last().map_or(0, |l| l.chars().count()));
        }

        (lines, cursor_pos.0, cursor_pos.1)
    }
}
