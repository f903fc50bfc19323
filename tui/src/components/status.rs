use crate::state::AppState;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Component for rendering the status line
pub struct StatusComponent;

impl StatusComponent {
    pub fn render(state: &AppState, f: &mut Frame, area: Rect) {
        let focus = match state.focused_panel {
            0 => "Input",
            1 => "Chat",
            _ => "Lookups",
        };

        let status_text = if state.processing {
            format!("● Asking {}... | {} focused | Ctrl+C to quit", state.agent_info.name, focus)
        } else {
            format!(
                "Ready - {} on {} | {} tokens | / for commands | Tab to switch ({})",
                state.agent_info.name, state.agent_info.model, state.total_token_usage.total_tokens, focus
            )
        };

        let style = if state.processing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Green)
        };
        f.render_widget(Paragraph::new(status_text).style(style), area);
    }
}
