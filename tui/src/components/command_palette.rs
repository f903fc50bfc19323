use crate::handlers::filtered_commands;
use crate::state::AppState;
use crate::utils::layout;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Component for rendering the command palette overlay
pub struct CommandPaletteComponent;

impl CommandPaletteComponent {
    pub fn render(state: &AppState, f: &mut Frame) {
        let popup_area = layout::centered(f.size(), 50, 40);
        f.render_widget(Clear, popup_area);

        let header = if state.command_palette_filter.is_empty() {
            "Command Palette (type to filter)".to_string()
        } else {
            format!("Command Palette (filter: {})", state.command_palette_filter)
        };
        let mut lines = vec![
            Line::from(Span::styled(header, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
            Line::from(""),
        ];

        let commands = filtered_commands(state);
        if commands.is_empty() {
            lines.push(Line::from(Span::styled("No matching commands found", Style::default().fg(Color::Red))));
        }
        for (i, cmd) in commands.iter().enumerate() {
            let selected = i == state.command_palette_selected;
            let style = if selected {
                Style::default().bg(Color::DarkGray).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(if selected { "► " } else { "  " }, style),
                Span::styled(cmd.name.clone(), style.fg(if selected { Color::Yellow } else { Color::Green })),
                Span::styled(format!("  {}", cmd.description), style.fg(Color::Gray)),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "↑↓ Navigate • Enter Select • Esc Close",
            Style::default().fg(Color::DarkGray),
        )));

        let popup = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                    .title(" Commands "),
            )
            .wrap(ratatui::widgets::Wrap { trim: false });

        f.render_widget(popup, popup_area);
    }
}
