//! Client create/edit form view.

use crate::schemas::client::{FIELD_EMAIL, FIELD_NAME};
use crate::state::{App, ClientField, FetchState, FormMode, SubmitState};
use crate::views::helpers::centered;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let form = &app.client_form;
    let box_area = centered(area, 64, 16);

    let title = match form.mode {
        FormMode::Create => "New client",
        FormMode::Edit(_) => "Edit client",
    };
    let outer = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = outer.inner(box_area);
    f.render_widget(outer, box_area);

    if matches!(form.mode, FormMode::Edit(_)) && form.prefill.is_loading() {
        let loading = Paragraph::new("Loading client…").style(Style::default().fg(app.theme.info));
        f.render_widget(loading, inner);
        return;
    }
    if let FetchState::Failed(message) = &form.prefill {
        let failed = Paragraph::new(format!("Failed to load client: {}", message))
            .style(Style::default().fg(app.theme.error));
        f.render_widget(failed, inner);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // name
            Constraint::Length(1), // name error
            Constraint::Length(3), // email
            Constraint::Length(1), // email error
            Constraint::Length(3), // status
            Constraint::Length(1), // root error
            Constraint::Length(1), // submit hint
        ])
        .split(inner);

    render_text_field(f, app, rows[0], "Name", ClientField::Name);
    render_field_error(f, app, rows[1], form.errors.first(FIELD_NAME));
    render_text_field(f, app, rows[2], "Email", ClientField::Email);
    render_field_error(f, app, rows[3], form.errors.first(FIELD_EMAIL));
    render_status_field(f, app, rows[4]);
    render_field_error(f, app, rows[5], form.root_error.as_deref());

    let hint = match form.submit {
        SubmitState::Submitting => "Saving…",
        SubmitState::Idle => "[Enter] save   [Esc] cancel   [Tab] next field",
    };
    let hint_style = match form.submit {
        SubmitState::Submitting => Style::default().fg(app.theme.info),
        SubmitState::Idle => Style::default().fg(app.theme.text_dim),
    };
    f.render_widget(Paragraph::new(hint).style(hint_style), rows[6]);
}

fn render_text_field(f: &mut Frame<'_>, app: &App, area: Rect, title: &str, field: ClientField) {
    let form = &app.client_form;
    let focused = form.focus == field;
    let block = field_block(app, title, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let textarea = match field {
        ClientField::Name => &form.name,
        ClientField::Email => &form.email,
        ClientField::Status => return,
    };
    f.render_widget(textarea.widget(), inner);
}

fn render_status_field(f: &mut Frame<'_>, app: &App, area: Rect) {
    let form = &app.client_form;
    let focused = form.focus == ClientField::Status;
    let block = field_block(app, "Status", focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let label = format!("◂ {} ▸", form.status);
    let style = if focused {
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text)
    };
    f.render_widget(Paragraph::new(Line::styled(label, style)), inner);
}

fn field_block<'a>(app: &App, title: &'a str, focused: bool) -> Block<'a> {
    let border_style = if focused {
        Style::default().fg(app.theme.border_focus)
    } else {
        Style::default().fg(app.theme.border)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn render_field_error(f: &mut Frame<'_>, app: &App, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let widget =
            Paragraph::new(message.to_string()).style(Style::default().fg(app.theme.error));
        f.render_widget(widget, area);
    }
}
