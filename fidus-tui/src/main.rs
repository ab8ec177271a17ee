//! FIDUS console entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fidus_cache::{CacheConfig, QueryCache};
use fidus_tui::api_client::RestClient;
use fidus_tui::config::TuiConfig;
use fidus_tui::error::TuiError;
use fidus_tui::events::{
    MutationFailure, MutationKind, MutationOutcome, MutationSuccess, TuiEvent,
};
use fidus_tui::gateway::Gateway;
use fidus_tui::keys::{map_key, Action};
use fidus_tui::nav::View;
use fidus_tui::persistence::{self, PersistedState};
use fidus_tui::state::{App, ClientSubmit, FetchState, FormMode, FormSignal, PendingAction};
use fidus_tui::views::render_view;
use fidus_tui::logging;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

type AppGateway = Gateway<RestClient>;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    let _log_guard = logging::init(&config.log_path)?;
    tracing::info!(api_base_url = %config.api_base_url, "console starting");

    let rest = RestClient::new(&config)?;
    let cache = Arc::new(QueryCache::new(
        CacheConfig::new().with_ttl(config.cache_ttl()),
    ));
    let gateway = Gateway::new(rest, cache);

    let mut app = App::new(config);
    if let Ok(Some(persisted)) = persistence::load(&app.config.persistence_path) {
        app.active_view = persisted.active_view;
        if let Some(client_id) = persisted.selected_client_id {
            app.ledger.open_for(client_id);
        }
    }
    // A form without its originating flow has no context to edit.
    if app.active_view == View::ClientForm {
        app.active_view = View::Overview;
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());
    refresh_active_view(&mut app, &gateway, &event_tx);

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                let _ = event_tx.send(TuiEvent::Tick).await;
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, &gateway, &event_tx, event) {
                    break;
                }
            }
        }
    }

    let persisted = PersistedState {
        active_view: if app.active_view == View::ClientForm {
            View::ClientDirectory
        } else {
            app.active_view
        },
        selected_client_id: app.ledger.client_id,
    };
    let _ = persistence::save(&app.config.persistence_path, &persisted);
    tracing::info!("console stopped");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                match evt {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        let _ = sender.blocking_send(TuiEvent::Input(key));
                    }
                    CrosstermEvent::Resize(width, height) => {
                        let _ = sender.blocking_send(TuiEvent::Resize { width, height });
                    }
                    _ => {}
                }
            }
        }
    });
}

/// Returns `true` when the app should quit.
fn handle_event(
    app: &mut App,
    gateway: &AppGateway,
    tx: &mpsc::Sender<TuiEvent>,
    event: TuiEvent,
) -> bool {
    match event {
        TuiEvent::Input(key) => return handle_input(app, gateway, tx, key),
        TuiEvent::ClientsLoaded { generation, result } => {
            app.directory.apply(generation, result);
        }
        TuiEvent::ClientPrefillLoaded { generation, result } => {
            app.client_form.apply_prefill(generation, result);
        }
        TuiEvent::LedgerClientLoaded { generation, result } => {
            app.ledger.apply_client(generation, result);
        }
        TuiEvent::AssetsLoaded { generation, result } => {
            app.asset_board.apply(generation, result);
        }
        TuiEvent::AllocationsLoaded {
            generation,
            client_id,
            result,
        } => {
            // A stale response for another client must not land here.
            if app.ledger.client_id == Some(client_id) {
                app.ledger.apply_allocations(generation, result);
            }
        }
        TuiEvent::MutationDone(outcome) => match outcome {
            MutationOutcome::Success(success) => {
                app.apply_mutation_success(&success);
                refresh_active_view(app, gateway, tx);
            }
            MutationOutcome::Failure(failure) => {
                tracing::warn!(kind = ?failure.kind, status = ?failure.status, "mutation failed");
                app.apply_mutation_failure(&failure);
            }
        },
        TuiEvent::Tick | TuiEvent::Resize { .. } => {}
    }
    false
}

fn handle_input(
    app: &mut App,
    gateway: &AppGateway,
    tx: &mpsc::Sender<TuiEvent>,
    key: KeyEvent,
) -> bool {
    if app.modal.is_some() {
        handle_modal_key(app, gateway, tx, key);
        return false;
    }
    if app.help_visible {
        app.help_visible = false;
        return false;
    }

    match app.active_view {
        View::ClientForm => {
            match app.client_form.handle_key(key) {
                FormSignal::Cancel => {
                    app.client_form.reset_for_create();
                    app.active_view = View::ClientDirectory;
                    refresh_active_view(app, gateway, tx);
                }
                FormSignal::Submit => submit_client_form(app, gateway, tx),
                FormSignal::Handled => {}
            }
            false
        }
        View::AllocationLedger if app.ledger.form.active => {
            let asset_count = app.asset_board.assets.as_ready().map_or(0, Vec::len);
            match app.ledger.form.handle_key(key, asset_count) {
                FormSignal::Cancel => app.ledger.form.active = false,
                FormSignal::Submit => submit_allocation_form(app, gateway, tx),
                FormSignal::Handled => {}
            }
            false
        }
        _ => match map_key(key) {
            Some(action) => handle_action(app, gateway, tx, action),
            None => false,
        },
    }
}

fn handle_action(
    app: &mut App,
    gateway: &AppGateway,
    tx: &mpsc::Sender<TuiEvent>,
    action: Action,
) -> bool {
    match action {
        Action::Quit => return true,
        Action::NextView => {
            app.active_view = app.active_view.next();
            refresh_active_view(app, gateway, tx);
        }
        Action::PrevView => {
            app.active_view = app.active_view.previous();
            refresh_active_view(app, gateway, tx);
        }
        Action::SwitchView(index) => {
            if let Some(view) = View::from_index(index) {
                app.active_view = view;
                refresh_active_view(app, gateway, tx);
            }
        }
        Action::MoveUp => app.select_previous(),
        Action::MoveDown => app.select_next(),
        Action::Confirm => match app.active_view {
            View::Overview => {
                app.active_view = app.overview.target();
                refresh_active_view(app, gateway, tx);
            }
            View::ClientDirectory => {
                let selected = app.directory.selected_client().map(|c| c.id);
                if let Some(client_id) = selected {
                    app.ledger.open_for(client_id);
                    app.active_view = View::AllocationLedger;
                    refresh_active_view(app, gateway, tx);
                }
            }
            _ => {}
        },
        Action::NewItem => match app.active_view {
            View::ClientDirectory => {
                app.client_form.reset_for_create();
                app.active_view = View::ClientForm;
            }
            View::AllocationLedger => {
                app.ledger.form.active = true;
                if app.asset_board.assets.is_idle() {
                    spawn_assets_load(app, gateway, tx);
                }
            }
            _ => {}
        },
        Action::EditItem => {
            if app.active_view == View::ClientDirectory {
                let selected = app.directory.selected_client().map(|c| c.id);
                if let Some(client_id) = selected {
                    let generation = app.client_form.begin_edit(client_id);
                    app.active_view = View::ClientForm;
                    spawn_prefill_load(gateway, tx, generation, client_id);
                }
            }
        }
        Action::DeleteItem => {
            if app.active_view == View::ClientDirectory {
                app.open_delete_modal();
            }
        }
        Action::Refresh => refresh_active_view(app, gateway, tx),
        Action::OpenHelp => app.help_visible = !app.help_visible,
        Action::Cancel => {
            if app.active_view == View::AllocationLedger {
                app.active_view = View::ClientDirectory;
                refresh_active_view(app, gateway, tx);
            }
        }
    }
    false
}

fn handle_modal_key(
    app: &mut App,
    gateway: &AppGateway,
    tx: &mpsc::Sender<TuiEvent>,
    key: KeyEvent,
) {
    use crossterm::event::KeyCode;
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            if let Some(modal) = app.modal.take() {
                match modal.action {
                    PendingAction::DeleteClient(client_id) => {
                        spawn_delete_client(gateway, tx, client_id);
                    }
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Esc => app.modal = None,
        _ => {}
    }
}

/// Kick off the fetches the active view depends on. Every fetch runs in a
/// spawned task and reports back over the event channel with the
/// generation it was started under.
fn refresh_active_view(app: &mut App, gateway: &AppGateway, tx: &mpsc::Sender<TuiEvent>) {
    match app.active_view {
        View::Overview => {}
        View::ClientDirectory => {
            let generation = app.directory.begin_load();
            let gateway = gateway.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = gateway.clients().await;
                let _ = tx
                    .send(TuiEvent::ClientsLoaded { generation, result })
                    .await;
            });
        }
        View::AssetBoard => spawn_assets_load(app, gateway, tx),
        View::AllocationLedger => {
            let Some(client_id) = app.ledger.client_id else {
                return;
            };
            let client_generation = app.ledger.begin_load_client();
            {
                let gateway = gateway.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = gateway.client(client_id).await;
                    let _ = tx
                        .send(TuiEvent::LedgerClientLoaded {
                            generation: client_generation,
                            result,
                        })
                        .await;
                });
            }
            let generation = app.ledger.begin_load_allocations();
            {
                let gateway = gateway.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = gateway.allocations(Some(client_id)).await;
                    let _ = tx
                        .send(TuiEvent::AllocationsLoaded {
                            generation,
                            client_id,
                            result,
                        })
                        .await;
                });
            }
            // The allocate form needs the asset catalogue as well.
            spawn_assets_load(app, gateway, tx);
        }
        View::ClientForm => {
            if let FormMode::Edit(client_id) = app.client_form.mode {
                if !matches!(app.client_form.prefill, FetchState::Ready(())) {
                    let generation = app.client_form.begin_edit(client_id);
                    spawn_prefill_load(gateway, tx, generation, client_id);
                }
            }
        }
    }
}

fn spawn_assets_load(app: &mut App, gateway: &AppGateway, tx: &mpsc::Sender<TuiEvent>) {
    let generation = app.asset_board.begin_load();
    let gateway = gateway.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = gateway.assets().await;
        let _ = tx
            .send(TuiEvent::AssetsLoaded { generation, result })
            .await;
    });
}

fn spawn_prefill_load(
    gateway: &AppGateway,
    tx: &mpsc::Sender<TuiEvent>,
    generation: u64,
    client_id: fidus_core::ClientId,
) {
    let gateway = gateway.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = gateway.client(client_id).await;
        let _ = tx
            .send(TuiEvent::ClientPrefillLoaded { generation, result })
            .await;
    });
}

fn spawn_delete_client(
    gateway: &AppGateway,
    tx: &mpsc::Sender<TuiEvent>,
    client_id: fidus_core::ClientId,
) {
    let gateway = gateway.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match gateway.delete_client(client_id).await {
            Ok(()) => MutationOutcome::Success(MutationSuccess::ClientDeleted(client_id)),
            Err(err) => MutationOutcome::Failure(MutationFailure::from_api(
                MutationKind::DeleteClient,
                &err,
            )),
        };
        let _ = tx.send(TuiEvent::MutationDone(outcome)).await;
    });
}

fn submit_client_form(app: &mut App, gateway: &AppGateway, tx: &mpsc::Sender<TuiEvent>) {
    let Some(submit) = app.client_form.build_submit() else {
        return;
    };
    let gateway = gateway.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match submit {
            ClientSubmit::Create(request) => match gateway.create_client(request).await {
                Ok(created) => MutationOutcome::Success(MutationSuccess::ClientCreated(created)),
                Err(err) => MutationOutcome::Failure(MutationFailure::from_api(
                    MutationKind::CreateClient,
                    &err,
                )),
            },
            ClientSubmit::Update(client_id, request) => {
                match gateway.update_client(client_id, request).await {
                    Ok(updated) => {
                        MutationOutcome::Success(MutationSuccess::ClientUpdated(updated))
                    }
                    Err(err) => MutationOutcome::Failure(MutationFailure::from_api(
                        MutationKind::UpdateClient,
                        &err,
                    )),
                }
            }
        };
        let _ = tx.send(TuiEvent::MutationDone(outcome)).await;
    });
}

fn submit_allocation_form(app: &mut App, gateway: &AppGateway, tx: &mpsc::Sender<TuiEvent>) {
    let Some(client_id) = app.ledger.client_id else {
        return;
    };
    let assets = app
        .asset_board
        .assets
        .as_ready()
        .cloned()
        .unwrap_or_default();
    let Some(request) = app.ledger.form.build_submit(&assets) else {
        return;
    };
    let gateway = gateway.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = match gateway.create_allocation(client_id, request).await {
            Ok(created) => MutationOutcome::Success(MutationSuccess::AllocationCreated(created)),
            Err(err) => MutationOutcome::Failure(MutationFailure::from_api(
                MutationKind::CreateAllocation,
                &err,
            )),
        };
        let _ = tx.send(TuiEvent::MutationDone(outcome)).await;
    });
}
