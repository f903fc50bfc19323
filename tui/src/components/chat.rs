use crate::state::{AppState, EntryKind};
use crate::utils::text;
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Component for rendering the chat panel
pub struct ChatComponent;

impl ChatComponent {
    pub fn render(state: &mut AppState, f: &mut Frame, area: Rect) {
        let available_width = area.width.saturating_sub(4) as usize;
        let agent_name = state.agent_info.name.clone();

        let mut chat_lines = Vec::new();
        for entry in &state.entries {
            match entry.kind {
                EntryKind::User => {
                    Self::push_styled(&mut chat_lines, &format!("You: {}", entry.content), Style::default().fg(Color::Cyan), available_width);
                }
                EntryKind::Agent => {
                    chat_lines.push(Line::from(Span::styled(
                        format!("{}:", agent_name),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    )));
                    Self::push_styled(&mut chat_lines, &entry.content, Style::default(), available_width);
                }
                EntryKind::System => {
                    Self::push_styled(&mut chat_lines, &entry.content, Style::default().fg(Color::Yellow), available_width);
                }
                EntryKind::Error => {
                    Self::push_styled(&mut chat_lines, &entry.content, Style::default().fg(Color::Red), available_width);
                }
            }
            chat_lines.push(Line::from(""));
        }

        if state.processing {
            chat_lines.push(Line::from(Span::styled(
                "…",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        let content_height = chat_lines.len();
        let visible_height = area.height.saturating_sub(2) as usize;
        let max_scroll = content_height.saturating_sub(visible_height);

        let scroll_pos = if state.auto_scroll_chat {
            max_scroll
        } else {
            state.chat_scroll.min(max_scroll)
        };
        // Keep the stored position in range so scrolling back up responds immediately
        state.chat_scroll = scroll_pos;

        let visible_lines: Vec<Line> = chat_lines.into_iter().skip(scroll_pos).take(visible_height).collect();

        let focused = state.focused_panel == 1;
        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title = if focused { " Chat [FOCUSED] " } else { " Chat " };

        let chat = Paragraph::new(Text::from(visible_lines))
            .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title));
        f.render_widget(chat, area);

        if content_height > visible_height {
            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            let mut scrollbar_state = ScrollbarState::new(max_scroll.max(1)).position(scroll_pos);
            f.render_stateful_widget(
                scrollbar,
                area.inner(&Margin { vertical: 1, horizontal: 0 }),
                &mut scrollbar_state,
            );
        }
    }

    fn push_styled(chat_lines: &mut Vec<Line<'static>>, content: &str, style: Style, width: usize) {
        for line in text::wrap(content, width) {
            chat_lines.push(Line::from(Span::styled(line, style)));
        }
    }
}
