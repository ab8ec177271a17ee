//! Client directory view.

use crate::state::App;
use crate::theme::client_status_color;
use crate::views::helpers::two_column;
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
        title: "Clients",
        empty_hint: "No clients yet — press n to add one.",
        theme: &app.theme,
    };
    if placeholder.render_placeholder(f, list_area, &app.directory.clients) {
        render_detail_panel(f, app, detail_area);
        return;
    }

    let clients = app.directory.clients.as_ready().map_or(&[][..], |c| c.as_slice());
    let items: Vec<ListItem> = clients
        .iter()
        .map(|client| {
            let status_style =
                Style::default().fg(client_status_color(client.status, &app.theme));
            ListItem::new(Line::from(vec![
                Span::styled(client.name.clone(), Style::default().fg(app.theme.text)),
                Span::raw(" "),
                Span::styled(format!("<{}>", client.email), Style::default().fg(app.theme.text_dim)),
                Span::raw(" "),
                Span::styled(format!("({})", client.status), status_style),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if let Some(selected) = app.directory.selected {
        if let Some(index) = clients.iter().position(|c| c.id.as_uuid() == selected) {
            state.select(Some(index));
        }
    }

    let list = List::new(items)
        .block(Block::default().title("Clients").borders(Borders::ALL))
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
    if let Some(client) = app.directory.selected_client() {
        fields.push(("Client ID", client.id.to_string()));
        fields.push(("Name", client.name.clone()));
        fields.push(("Email", client.email.clone()));
        fields.push(("Status", client.status.to_string()));
        fields.push(("Created", client.created_at.to_rfc3339()));
        fields.push(("Updated", client.updated_at.to_rfc3339()));
    }

    let detail = DetailPanel {
        title: "Details",
        fields,
        empty_hint: "Select a client to see its details.",
        label_style: Style::default().fg(app.theme.secondary),
        hint_style: Style::default().fg(app.theme.text_dim),
    };
    detail.render(f, area);
}
