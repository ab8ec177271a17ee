//! Placeholder panel for the non-populated read states.

use crate::state::FetchState;
use crate::theme::MidnightTheme;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Renders the loading / failed / empty placeholders for a fetched list.
/// Returns `false` when the state is populated and the caller should render
/// its real content instead.
pub struct StatePanel<'a> {
    pub title: &'a str,
    pub empty_hint: &'a str,
    pub theme: &'a MidnightTheme,
}

impl<'a> StatePanel<'a> {
    pub fn render_placeholder<T>(
        &self,
        f: &mut Frame<'_>,
        area: Rect,
        state: &FetchState<Vec<T>>,
    ) -> bool {
        let (message, style) = match state {
            FetchState::Idle => (
                "Nothing to show yet.".to_string(),
                Style::default().fg(self.theme.text_dim),
            ),
            FetchState::Loading => (
                "Loading…".to_string(),
                Style::default().fg(self.theme.info),
            ),
            FetchState::Failed(message) => (
                format!("Failed to load: {}", message),
                Style::default().fg(self.theme.error),
            ),
            FetchState::Ready(items) if items.is_empty() => (
                self.empty_hint.to_string(),
                Style::default().fg(self.theme.text_dim),
            ),
            FetchState::Ready(_) => return false,
        };

        let widget = Paragraph::new(message)
            .style(style)
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(widget, area);
        true
    }
}
