//! Overview landing view.

use crate::state::{App, OVERVIEW_ENTRIES};
use crate::views::helpers::centered;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let box_area = centered(area, 64, (OVERVIEW_ENTRIES.len() as u16) * 3 + 4);

    let mut lines = vec![
        Line::styled(
            "Welcome to the FIDUS advisory platform.",
            Style::default().fg(app.theme.text),
        ),
        Line::raw(""),
    ];

    for (index, entry) in OVERVIEW_ENTRIES.iter().enumerate() {
        let selected = index == app.overview.selected;
        let marker = if selected { "▸ " } else { "  " };
        let title_style = if selected {
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, title_style),
            Span::styled(entry.title, title_style),
        ]));
        lines.push(Line::styled(
            format!("    {}", entry.description),
            Style::default().fg(app.theme.text_dim),
        ));
        lines.push(Line::raw(""));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title("Get started")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(widget, box_area);
}
