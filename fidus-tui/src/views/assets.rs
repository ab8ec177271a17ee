//! Asset board view (read-only).

use crate::state::App;
use crate::views::helpers::{format_currency, two_column};
use crate::widgets::{DetailPanel, StatePanel};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let (list_area, detail_area) = two_column(area, 60);

    let placeholder = StatePanel {
        title: "Assets",
        empty_hint: "No assets available.",
        theme: &app.theme,
    };
    if placeholder.render_placeholder(f, list_area, &app.asset_board.assets) {
        render_detail_panel(f, app, detail_area);
        return;
    }

    let assets = app.asset_board.assets.as_ready().map_or(&[][..], |a| a.as_slice());
    let width = list_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = assets
        .iter()
        .map(|asset| {
            let value = format_currency(asset.current_value);
            let padding = width
                .saturating_sub(asset.name.chars().count() + value.chars().count())
                .max(1);
            ListItem::new(Line::from(vec![
                Span::styled(asset.name.clone(), Style::default().fg(app.theme.text)),
                Span::raw(" ".repeat(padding)),
                Span::styled(value, Style::default().fg(app.theme.success)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if let Some(selected) = app.asset_board.selected {
        if let Some(index) = assets.iter().position(|a| a.id.as_uuid() == selected) {
            state.select(Some(index));
        }
    }

    let list = List::new(items)
        .block(Block::default().title("Assets").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(list, list_area, &mut state);

    render_detail_panel(f, app, detail_area);
}

fn render_detail_panel(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let mut fields = Vec::new();
    if let Some(asset) = app.asset_board.selected_asset() {
        fields.push(("Asset ID", asset.id.to_string()));
        fields.push(("Name", asset.name.clone()));
        fields.push(("Current value", format_currency(asset.current_value)));
    }

    let detail = DetailPanel {
        title: "Details",
        fields,
        empty_hint: "Select an asset to see its details.",
        label_style: Style::default().fg(app.theme.secondary),
        hint_style: Style::default().fg(app.theme.text_dim),
    };
    detail.render(f, area);
}
