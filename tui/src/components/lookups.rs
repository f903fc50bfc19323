use crate::state::{AppState, Lookup, LookupStatus};
use crate::utils::text;
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Component for rendering the price lookups panel
pub struct LookupsComponent;

impl LookupsComponent {
    pub fn render(state: &mut AppState, f: &mut Frame, area: Rect) {
        let focused = state.focused_panel == 2;
        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title = if focused { " Lookups [FOCUSED] " } else { " Lookups " };
        let block = Block::default().borders(Borders::ALL).border_style(border_style).title(title);

        if state.lookups.is_empty() {
            let placeholder = Paragraph::new("No lookups yet\n\nAsk about a coin, e.g. BTC")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(placeholder, area);
            return;
        }

        let available_width = area.width.saturating_sub(4) as usize;
        let mut all_lines = Vec::new();
        for lookup in &state.lookups {
            Self::render_lookup(&mut all_lines, lookup, available_width);
            all_lines.push(Line::from("─".repeat(available_width.min(40))));
        }

        let content_height = all_lines.len();
        let visible_height = area.height.saturating_sub(2) as usize;
        let max_scroll = content_height.saturating_sub(visible_height);
        let scroll_pos = if state.auto_scroll_lookups {
            max_scroll
        } else {
            state.lookups_scroll.min(max_scroll)
        };
        state.lookups_scroll = scroll_pos;

        let visible_lines: Vec<Line> = all_lines.into_iter().skip(scroll_pos).take(visible_height).collect();
        f.render_widget(Paragraph::new(Text::from(visible_lines)).block(block), area);

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

    fn render_lookup(all_lines: &mut Vec<Line<'static>>, lookup: &Lookup, width: usize) {
        let (icon, color) = match lookup.status {
            LookupStatus::Running => ("🔄", Color::Yellow),
            LookupStatus::Completed => ("✅", Color::Green),
            LookupStatus::Failed => ("❌", Color::Red),
        };

        let timing = match lookup.duration_ms {
            Some(ms) => format!(" ({}ms)", ms),
            None => format!(" ({}s)", lookup.start_time.elapsed().as_secs()),
        };
        all_lines.push(Line::from(Span::styled(
            format!("{} {}{}", icon, lookup.summary, timing),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        all_lines.push(Line::from(Span::styled(
            format!("  via {}", lookup.tool),
            Style::default().fg(Color::DarkGray),
        )));

        let output = lookup.output.as_deref().unwrap_or("Waiting for price...");
        for line in text::wrap(output, width) {
            all_lines.push(Line::from(line));
        }
    }
}
