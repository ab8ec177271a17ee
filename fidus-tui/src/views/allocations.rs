//! Allocation ledger view: a client's portfolio plus the allocate form.

use crate::schemas::allocation::{FIELD_ASSET_ID, FIELD_QUANTITY};
use crate::state::{AllocationField, App, FetchState, SubmitState};
use crate::views::helpers::{format_currency, two_column};
use crate::widgets::{DetailPanel, StatePanel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let ledger = &app.ledger;

    if ledger.client_id.is_none() {
        let hint = Paragraph::new("Select a client in the directory and press Enter.")
            .style(Style::default().fg(app.theme.text_dim))
            .block(Block::default().title("Allocations").borders(Borders::ALL));
        f.render_widget(hint, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_client_banner(f, app, rows[0]);

    let (list_area, side_area) = two_column(rows[1], 58);
    render_portfolio(f, app, list_area);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(9)])
        .split(side_area);
    render_detail_panel(f, app, side[0]);
    render_allocation_form(f, app, side[1]);
}

fn render_client_banner(f: &mut Frame<'_>, app: &App, area: Rect) {
    let ledger = &app.ledger;
    let text = match &ledger.client {
        FetchState::Ready(client) => {
            let total = ledger
                .total_value()
                .map(format_currency)
                .unwrap_or_else(|| "—".to_string());
            format!(
                "Allocations of {} <{}>   Portfolio value: {}",
                client.name, client.email, total
            )
        }
        FetchState::Loading => "Loading client…".to_string(),
        FetchState::Failed(message) => format!("Failed to load client: {}", message),
        FetchState::Idle => "…".to_string(),
    };
    let widget = Paragraph::new(text)
        .style(Style::default().fg(app.theme.text))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn render_portfolio(f: &mut Frame<'_>, app: &App, area: Rect) {
    let ledger = &app.ledger;
    let placeholder = StatePanel {
        title: "Portfolio",
        empty_hint: "This client has no allocations yet — press n to add one.",
        theme: &app.theme,
    };
    if placeholder.render_placeholder(f, area, &ledger.allocations) {
        return;
    }

    let allocations = ledger.allocations.as_ready().map_or(&[][..], |a| a.as_slice());
    let items: Vec<ListItem> = allocations
        .iter()
        .map(|allocation| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    allocation.asset.name.clone(),
                    Style::default().fg(app.theme.text),
                ),
                Span::styled(
                    format!("  ×{}", allocation.quantity),
                    Style::default().fg(app.theme.secondary),
                ),
                Span::styled(
                    format!(
                        "  @ {}  = {}",
                        format_currency(allocation.asset.current_value),
                        format_currency(allocation.position_value())
                    ),
                    Style::default().fg(app.theme.success),
                ),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if let Some(selected) = ledger.selected {
        if let Some(index) = allocations.iter().position(|a| a.id.as_uuid() == selected) {
            state.select(Some(index));
        }
    }

    let list = List::new(items)
        .block(Block::default().title("Portfolio").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut fields = Vec::new();
    if let Some(allocation) = app.ledger.selected_allocation() {
        fields.push(("Allocation ID", allocation.id.to_string()));
        fields.push(("Asset", allocation.asset.name.clone()));
        fields.push(("Quantity", allocation.quantity.to_string()));
        fields.push((
            "Unit value",
            format_currency(allocation.asset.current_value),
        ));
        fields.push(("Position", format_currency(allocation.position_value())));
        fields.push(("Assigned", allocation.assigned_at.to_rfc3339()));
    }

    let detail = DetailPanel {
        title: "Details",
        fields,
        empty_hint: "Select an allocation to see its details.",
        label_style: Style::default().fg(app.theme.secondary),
        hint_style: Style::default().fg(app.theme.text_dim),
    };
    detail.render(f, area);
}

fn render_allocation_form(f: &mut Frame<'_>, app: &App, area: Rect) {
    let form = &app.ledger.form;
    let border_style = if form.active {
        Style::default().fg(app.theme.border_focus)
    } else {
        Style::default().fg(app.theme.border)
    };
    let outer = Block::default()
        .title("Allocate asset [n]")
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // asset selector
            Constraint::Length(1), // asset error
            Constraint::Length(1), // quantity
            Constraint::Length(1), // quantity error
            Constraint::Length(1), // root error
            Constraint::Length(1), // hint
        ])
        .split(inner);

    let assets = app.asset_board.assets.as_ready().map_or(&[][..], |a| a.as_slice());
    let asset_label = match &app.asset_board.assets {
        FetchState::Loading => "Loading assets…".to_string(),
        FetchState::Failed(message) => format!("Assets unavailable: {}", message),
        _ => form
            .selected_asset(assets)
            .map(|asset| {
                format!(
                    "◂ {} ({}) ▸",
                    asset.name,
                    format_currency(asset.current_value)
                )
            })
            .unwrap_or_else(|| "No assets available".to_string()),
    };
    render_form_row(
        f,
        app,
        rows[0],
        "Asset:    ",
        &asset_label,
        form.active && form.focus == AllocationField::Asset,
    );
    render_error_row(f, app, rows[1], form.errors.first(FIELD_ASSET_ID));

    let quantity = form.quantity_text();
    let quantity_label = if quantity.is_empty() && !form.active {
        "—".to_string()
    } else {
        quantity
    };
    render_form_row(
        f,
        app,
        rows[2],
        "Quantity: ",
        &quantity_label,
        form.active && form.focus == AllocationField::Quantity,
    );
    render_error_row(f, app, rows[3], form.errors.first(FIELD_QUANTITY));
    render_error_row(f, app, rows[4], form.root_error.as_deref());

    let hint = if form.submit == SubmitState::Submitting {
        "Allocating…"
    } else if form.active {
        "[◂ ▸] pick asset  [Enter] allocate  [Esc] close"
    } else {
        "[n] open form"
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(app.theme.text_dim)),
        rows[5],
    );
}

fn render_form_row(
    f: &mut Frame<'_>,
    app: &App,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
) {
    let value_style = if focused {
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text)
    };
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(app.theme.secondary)),
        Span::styled(value.to_string(), value_style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_error_row(f: &mut Frame<'_>, app: &App, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        f.render_widget(
            Paragraph::new(message.to_string()).style(Style::default().fg(app.theme.error)),
            area,
        );
    }
}
