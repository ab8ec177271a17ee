//! View rendering dispatch.

pub mod allocations;
pub mod assets;
pub mod client_form;
pub mod clients;
pub mod helpers;
pub mod overview;

use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::App;
use helpers::centered;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Overview => overview::render(f, app, layout[1]),
        View::ClientDirectory => clients::render(f, app, layout[1]),
        View::ClientForm => client_form::render(f, app, layout[1]),
        View::AssetBoard => assets::render(f, app, layout[1]),
        View::AllocationLedger => allocations::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);

    if let Some(modal) = &app.modal {
        render_modal(f, app, modal);
    }
    if app.help_visible {
        render_help(f, app);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let title = format!("FIDUS Advisory Console | {}", app.active_view.title());
    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        title,
        Style::default().fg(app.theme.primary),
    ));
    f.render_widget(block, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: ratatui::layout::Rect) {
    let help = match app.active_view {
        View::Overview => "j/k move • Enter open • Tab switch view • ? help • q quit",
        View::ClientDirectory => {
            "j/k move • Enter allocations • n new • e edit • d delete • r refresh • q quit"
        }
        View::ClientForm => "Tab next field • Enter save • Esc cancel",
        View::AssetBoard => "j/k move • r refresh • Tab switch view • q quit",
        View::AllocationLedger => "j/k move • n allocate • r refresh • Esc back • q quit",
    };
    let (text, style) = if let Some(note) = app.notifications.last() {
        let label = match note.level {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        };
        let color = match note.level {
            NotificationLevel::Info => app.theme.info,
            NotificationLevel::Warning => app.theme.warning,
            NotificationLevel::Error => app.theme.error,
            NotificationLevel::Success => app.theme.success,
        };
        (
            format!("{}: {}", label, note.message),
            Style::default().fg(color),
        )
    } else {
        (help.to_string(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

fn render_modal(f: &mut Frame<'_>, app: &App, modal: &crate::state::ConfirmModal) {
    let area = centered(f.size(), 60, 7);
    f.render_widget(Clear, area);
    let body = format!("{}\n\n[y] confirm   [n] cancel", modal.message);
    let widget = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(modal.title.as_str())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.warning)),
        );
    f.render_widget(widget, area);
}

fn render_help(f: &mut Frame<'_>, app: &App) {
    let area = centered(f.size(), 64, 12);
    f.render_widget(Clear, area);
    let body = concat!(
        "Navigation\n",
        "  Tab / Shift-Tab  cycle views     1-5  jump to view\n",
        "  j / k / arrows   move selection  Enter  open / confirm\n",
        "\n",
        "Clients\n",
        "  n  new client    e  edit client  d  delete client\n",
        "\n",
        "Misc\n",
        "  r  refresh view  ?  toggle help  q  quit",
    );
    let widget = Paragraph::new(body).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.primary)),
    );
    f.render_widget(widget, area);
}
