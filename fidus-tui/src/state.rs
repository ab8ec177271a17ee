//! Application state and view state definitions.

use crate::config::TuiConfig;
use crate::events::{MutationFailure, MutationKind, MutationSuccess};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::schemas::{allocation, client, FieldErrors};
use crate::theme::MidnightTheme;
use crossterm::event::{KeyCode, KeyEvent};
use fidus_api::types::{
    AllocationResponse, AssetResponse, ClientResponse, CreateAllocationRequest,
    CreateClientRequest, UpdateClientRequest,
};
use fidus_cache::QueryError;
use fidus_core::{ClientId, ClientStatus};
use ratatui::style::Style;
use tui_textarea::{CursorMove, TextArea};
use uuid::Uuid;

// ============================================================================
// READ / SUBMIT STATE MACHINES
// ============================================================================

/// Observable state of a read. `Idle` is the disabled "not yet loaded"
/// state; `Ready` distinguishes empty from populated by its contents.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn from_result(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(value) => FetchState::Ready(value),
            Err(err) => FetchState::Failed(err.message),
        }
    }
}

/// One-shot submission state; submission is disabled while `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

/// What a form did with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSignal {
    Handled,
    Submit,
    Cancel,
}

// ============================================================================
// APP
// ============================================================================

pub struct App {
    pub config: TuiConfig,
    pub theme: MidnightTheme,
    pub active_view: View,

    pub overview: OverviewState,
    pub directory: ClientDirectoryState,
    pub client_form: ClientFormState,
    pub asset_board: AssetBoardState,
    pub ledger: AllocationLedgerState,

    pub notifications: Vec<Notification>,
    pub modal: Option<ConfirmModal>,
    pub help_visible: bool,
}

impl App {
    pub fn new(config: TuiConfig) -> Self {
        Self {
            config,
            theme: MidnightTheme::midnight(),
            active_view: View::Overview,
            overview: OverviewState::new(),
            directory: ClientDirectoryState::new(),
            client_form: ClientFormState::new(),
            asset_board: AssetBoardState::new(),
            ledger: AllocationLedgerState::new(),
            notifications: Vec::new(),
            modal: None,
            help_visible: false,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn select_next(&mut self) {
        match self.active_view {
            View::Overview => self.overview.select_next(),
            View::ClientDirectory => {
                if let Some(clients) = self.directory.clients.as_ready() {
                    select_next_id(clients, &mut self.directory.selected);
                }
            }
            View::AssetBoard => {
                if let Some(assets) = self.asset_board.assets.as_ready() {
                    select_next_id(assets, &mut self.asset_board.selected);
                }
            }
            View::AllocationLedger => {
                if let Some(allocations) = self.ledger.allocations.as_ready() {
                    select_next_id(allocations, &mut self.ledger.selected);
                }
            }
            View::ClientForm => {}
        }
    }

    pub fn select_previous(&mut self) {
        match self.active_view {
            View::Overview => self.overview.select_previous(),
            View::ClientDirectory => {
                if let Some(clients) = self.directory.clients.as_ready() {
                    select_prev_id(clients, &mut self.directory.selected);
                }
            }
            View::AssetBoard => {
                if let Some(assets) = self.asset_board.assets.as_ready() {
                    select_prev_id(assets, &mut self.asset_board.selected);
                }
            }
            View::AllocationLedger => {
                if let Some(allocations) = self.ledger.allocations.as_ready() {
                    select_prev_id(allocations, &mut self.ledger.selected);
                }
            }
            View::ClientForm => {}
        }
    }

    /// Open the delete confirmation for the selected client, if any.
    pub fn open_delete_modal(&mut self) {
        if let Some(client) = self.directory.selected_client() {
            self.modal = Some(ConfirmModal {
                title: "Delete client".to_string(),
                message: format!(
                    "Delete {} <{}>? This cannot be undone.",
                    client.name, client.email
                ),
                action: PendingAction::DeleteClient(client.id),
            });
        }
    }

    /// Routes a finished mutation's failure to the view that started it.
    /// Never navigates: the form keeps its input for correction.
    pub fn apply_mutation_failure(&mut self, failure: &MutationFailure) {
        match failure.kind {
            MutationKind::CreateClient | MutationKind::UpdateClient => {
                self.client_form.set_submit_failure(failure);
            }
            MutationKind::CreateAllocation => {
                self.ledger.form.set_submit_failure(failure);
            }
            MutationKind::DeleteClient => {}
        }
        self.notify(NotificationLevel::Error, failure.message.clone());
    }

    /// Routes a finished mutation's success: notify, clear the form that
    /// started it, and navigate where the original flow goes next.
    pub fn apply_mutation_success(&mut self, success: &MutationSuccess) {
        match success {
            MutationSuccess::ClientCreated(created) => {
                self.notify(
                    NotificationLevel::Success,
                    format!("Client {} created.", created.name),
                );
                self.client_form.reset_for_create();
                self.directory.selected = Some(created.id.as_uuid());
                self.active_view = View::ClientDirectory;
            }
            MutationSuccess::ClientUpdated(updated) => {
                self.notify(
                    NotificationLevel::Success,
                    format!("Client {} updated.", updated.name),
                );
                self.client_form.reset_for_create();
                self.directory.selected = Some(updated.id.as_uuid());
                self.active_view = View::ClientDirectory;
            }
            MutationSuccess::ClientDeleted(_) => {
                self.notify(NotificationLevel::Success, "Client deleted.");
            }
            MutationSuccess::AllocationCreated(allocation) => {
                self.notify(
                    NotificationLevel::Success,
                    format!(
                        "Allocated {} × {}.",
                        allocation.quantity, allocation.asset.name
                    ),
                );
                self.ledger.form.reset();
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfirmModal {
    pub title: String,
    pub message: String,
    pub action: PendingAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    DeleteClient(ClientId),
}

// ============================================================================
// OVERVIEW
// ============================================================================

#[derive(Debug, Clone)]
pub struct OverviewState {
    pub selected: usize,
}

pub struct OverviewEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub target: View,
}

pub const OVERVIEW_ENTRIES: &[OverviewEntry] = &[
    OverviewEntry {
        title: "Manage clients",
        description: "Add, list, edit and delete the clients in your book.",
        target: View::ClientDirectory,
    },
    OverviewEntry {
        title: "View assets",
        description: "Browse the financial assets and their current values.",
        target: View::AssetBoard,
    },
];

impl OverviewState {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % OVERVIEW_ENTRIES.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = if self.selected == 0 {
            OVERVIEW_ENTRIES.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn target(&self) -> View {
        OVERVIEW_ENTRIES[self.selected % OVERVIEW_ENTRIES.len()].target
    }
}

// ============================================================================
// CLIENT DIRECTORY
// ============================================================================

#[derive(Debug, Clone)]
pub struct ClientDirectoryState {
    pub clients: FetchState<Vec<ClientResponse>>,
    pub selected: Option<Uuid>,
    pub generation: u64,
}

impl ClientDirectoryState {
    pub fn new() -> Self {
        Self {
            clients: FetchState::Idle,
            selected: None,
            generation: 0,
        }
    }

    /// Start a fetch; the returned generation tags its eventual result.
    pub fn begin_load(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.clients = FetchState::Loading;
        self.generation
    }

    /// Apply a fetch result, dropping it if a newer fetch superseded it.
    pub fn apply(&mut self, generation: u64, result: Result<Vec<ClientResponse>, QueryError>) {
        if generation != self.generation {
            return;
        }
        self.clients = FetchState::from_result(result);
        if let Some(clients) = self.clients.as_ready() {
            let keep = self
                .selected
                .filter(|id| clients.iter().any(|c| c.id.as_uuid() == *id));
            self.selected = keep.or_else(|| clients.first().map(|c| c.id.as_uuid()));
        }
    }

    pub fn selected_client(&self) -> Option<&ClientResponse> {
        let selected = self.selected?;
        self.clients
            .as_ready()?
            .iter()
            .find(|c| c.id.as_uuid() == selected)
    }
}

// ============================================================================
// CLIENT FORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ClientId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Email,
    Status,
}

/// Validated submission ready to hand to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientSubmit {
    Create(CreateClientRequest),
    Update(ClientId, UpdateClientRequest),
}

pub struct ClientFormState {
    pub mode: FormMode,
    pub name: TextArea<'static>,
    pub email: TextArea<'static>,
    pub status: ClientStatus,
    pub focus: ClientField,
    pub errors: FieldErrors,
    pub root_error: Option<String>,
    pub submit: SubmitState,
    /// Edit mode only: state of the prefill fetch.
    pub prefill: FetchState<()>,
    pub generation: u64,
}

impl ClientFormState {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            name: text_field(""),
            email: text_field(""),
            status: ClientStatus::Active,
            focus: ClientField::Name,
            errors: FieldErrors::new(),
            root_error: None,
            submit: SubmitState::Idle,
            prefill: FetchState::Idle,
            generation: 0,
        }
    }

    pub fn reset_for_create(&mut self) {
        let generation = self.generation;
        *self = Self::new();
        self.generation = generation;
    }

    /// Switch to edit mode for `id` and start the prefill fetch.
    pub fn begin_edit(&mut self, id: ClientId) -> u64 {
        self.reset_for_create();
        self.mode = FormMode::Edit(id);
        self.prefill = FetchState::Loading;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn apply_prefill(&mut self, generation: u64, result: Result<ClientResponse, QueryError>) {
        if generation != self.generation || !matches!(self.mode, FormMode::Edit(_)) {
            return;
        }
        match result {
            Ok(client) => {
                self.name = text_field(&client.name);
                self.email = text_field(&client.email);
                self.status = client.status;
                self.prefill = FetchState::Ready(());
            }
            Err(err) => {
                self.prefill = FetchState::Failed(err.message);
            }
        }
    }

    pub fn name_text(&self) -> String {
        self.name.lines().join("\n")
    }

    pub fn email_text(&self) -> String {
        self.email.lines().join("\n")
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            ClientField::Name => ClientField::Email,
            ClientField::Email => ClientField::Status,
            ClientField::Status => ClientField::Name,
        };
    }

    pub fn focus_previous(&mut self) {
        self.focus = match self.focus {
            ClientField::Name => ClientField::Status,
            ClientField::Email => ClientField::Name,
            ClientField::Status => ClientField::Email,
        };
    }

    /// Route one key event into the form.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormSignal {
        if self.submit == SubmitState::Submitting {
            return match key.code {
                KeyCode::Esc => FormSignal::Cancel,
                _ => FormSignal::Handled,
            };
        }
        match key.code {
            KeyCode::Esc => FormSignal::Cancel,
            KeyCode::Enter => FormSignal::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                FormSignal::Handled
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_previous();
                FormSignal::Handled
            }
            _ => {
                match self.focus {
                    ClientField::Name => {
                        self.name.input(key);
                    }
                    ClientField::Email => {
                        self.email.input(key);
                    }
                    ClientField::Status => {
                        if matches!(
                            key.code,
                            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                        ) {
                            self.status = self.status.toggled();
                        }
                    }
                }
                FormSignal::Handled
            }
        }
    }

    /// Validate the current input. On success the form moves to
    /// `Submitting` and the caller runs the mutation; on failure the field
    /// errors are set and nothing leaves the view.
    pub fn build_submit(&mut self) -> Option<ClientSubmit> {
        if self.submit == SubmitState::Submitting {
            return None;
        }
        if matches!(self.mode, FormMode::Edit(_)) && !matches!(self.prefill, FetchState::Ready(()))
        {
            self.root_error = Some("Client is still loading.".to_string());
            return None;
        }

        let name = self.name_text();
        let email = self.email_text();
        let input = client::ClientFormInput {
            name: &name,
            email: &email,
            status: self.status.as_str(),
        };
        match client::validate(&input) {
            Ok(draft) => {
                self.errors.clear();
                self.root_error = None;
                self.submit = SubmitState::Submitting;
                Some(match self.mode {
                    FormMode::Create => ClientSubmit::Create(draft.into()),
                    FormMode::Edit(id) => ClientSubmit::Update(id, draft.into()),
                })
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn set_submit_failure(&mut self, failure: &MutationFailure) {
        self.submit = SubmitState::Idle;
        if failure.is_conflict() {
            self.errors.push(client::FIELD_EMAIL, failure.message.clone());
        } else {
            self.root_error = Some(failure.message.clone());
        }
    }
}

// ============================================================================
// ASSET BOARD
// ============================================================================

#[derive(Debug, Clone)]
pub struct AssetBoardState {
    pub assets: FetchState<Vec<AssetResponse>>,
    pub selected: Option<Uuid>,
    pub generation: u64,
}

impl AssetBoardState {
    pub fn new() -> Self {
        Self {
            assets: FetchState::Idle,
            selected: None,
            generation: 0,
        }
    }

    pub fn begin_load(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        if self.assets.as_ready().is_none() {
            self.assets = FetchState::Loading;
        }
        self.generation
    }

    pub fn apply(&mut self, generation: u64, result: Result<Vec<AssetResponse>, QueryError>) {
        if generation != self.generation {
            return;
        }
        self.assets = FetchState::from_result(result);
        if let Some(assets) = self.assets.as_ready() {
            let keep = self
                .selected
                .filter(|id| assets.iter().any(|a| a.id.as_uuid() == *id));
            self.selected = keep.or_else(|| assets.first().map(|a| a.id.as_uuid()));
        }
    }

    pub fn selected_asset(&self) -> Option<&AssetResponse> {
        let selected = self.selected?;
        self.assets
            .as_ready()?
            .iter()
            .find(|a| a.id.as_uuid() == selected)
    }
}

// ============================================================================
// ALLOCATION LEDGER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationField {
    Asset,
    Quantity,
}

pub struct AllocationFormState {
    /// Whether keys are routed into the form instead of the list.
    pub active: bool,
    pub focus: AllocationField,
    pub asset_cursor: usize,
    pub quantity: TextArea<'static>,
    pub errors: FieldErrors,
    pub root_error: Option<String>,
    pub submit: SubmitState,
}

impl AllocationFormState {
    pub fn new() -> Self {
        Self {
            active: false,
            focus: AllocationField::Asset,
            asset_cursor: 0,
            quantity: text_field(""),
            errors: FieldErrors::new(),
            root_error: None,
            submit: SubmitState::Idle,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn selected_asset<'a>(&self, assets: &'a [AssetResponse]) -> Option<&'a AssetResponse> {
        if assets.is_empty() {
            return None;
        }
        assets.get(self.asset_cursor % assets.len())
    }

    pub fn handle_key(&mut self, key: KeyEvent, asset_count: usize) -> FormSignal {
        if self.submit == SubmitState::Submitting {
            return match key.code {
                KeyCode::Esc => FormSignal::Cancel,
                _ => FormSignal::Handled,
            };
        }
        match key.code {
            KeyCode::Esc => FormSignal::Cancel,
            KeyCode::Enter => FormSignal::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = match self.focus {
                    AllocationField::Asset => AllocationField::Quantity,
                    AllocationField::Quantity => AllocationField::Asset,
                };
                FormSignal::Handled
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = match self.focus {
                    AllocationField::Asset => AllocationField::Quantity,
                    AllocationField::Quantity => AllocationField::Asset,
                };
                FormSignal::Handled
            }
            KeyCode::Left if self.focus == AllocationField::Asset => {
                if asset_count > 0 {
                    self.asset_cursor = if self.asset_cursor == 0 {
                        asset_count - 1
                    } else {
                        self.asset_cursor - 1
                    };
                }
                FormSignal::Handled
            }
            KeyCode::Right if self.focus == AllocationField::Asset => {
                if asset_count > 0 {
                    self.asset_cursor = (self.asset_cursor + 1) % asset_count;
                }
                FormSignal::Handled
            }
            _ => {
                if self.focus == AllocationField::Quantity {
                    self.quantity.input(key);
                }
                FormSignal::Handled
            }
        }
    }

    pub fn quantity_text(&self) -> String {
        self.quantity.lines().join("\n")
    }

    /// Validate against the currently loaded assets; see
    /// [`ClientFormState::build_submit`] for the contract.
    pub fn build_submit(&mut self, assets: &[AssetResponse]) -> Option<CreateAllocationRequest> {
        if self.submit == SubmitState::Submitting {
            return None;
        }
        let asset_id = self
            .selected_asset(assets)
            .map(|asset| asset.id.to_string())
            .unwrap_or_default();
        let quantity = self.quantity_text();
        let input = allocation::AllocationFormInput {
            asset_id: &asset_id,
            quantity: &quantity,
        };
        match allocation::validate(&input) {
            Ok(draft) => {
                self.errors.clear();
                self.root_error = None;
                self.submit = SubmitState::Submitting;
                Some(draft.into())
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn set_submit_failure(&mut self, failure: &MutationFailure) {
        self.submit = SubmitState::Idle;
        self.root_error = Some(failure.message.clone());
    }
}

pub struct AllocationLedgerState {
    pub client_id: Option<ClientId>,
    pub client: FetchState<ClientResponse>,
    pub client_generation: u64,
    pub allocations: FetchState<Vec<AllocationResponse>>,
    pub generation: u64,
    pub selected: Option<Uuid>,
    pub form: AllocationFormState,
}

impl AllocationLedgerState {
    pub fn new() -> Self {
        Self {
            client_id: None,
            client: FetchState::Idle,
            client_generation: 0,
            allocations: FetchState::Idle,
            generation: 0,
            selected: None,
            form: AllocationFormState::new(),
        }
    }

    /// Point the ledger at a client; reads stay `Idle` until refreshed.
    pub fn open_for(&mut self, id: ClientId) {
        self.client_id = Some(id);
        self.client = FetchState::Idle;
        self.allocations = FetchState::Idle;
        self.selected = None;
        self.form.reset();
    }

    pub fn begin_load_client(&mut self) -> u64 {
        self.client_generation = self.client_generation.wrapping_add(1);
        self.client = FetchState::Loading;
        self.client_generation
    }

    pub fn apply_client(&mut self, generation: u64, result: Result<ClientResponse, QueryError>) {
        if generation != self.client_generation {
            return;
        }
        self.client = FetchState::from_result(result);
    }

    pub fn begin_load_allocations(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.allocations = FetchState::Loading;
        self.generation
    }

    pub fn apply_allocations(
        &mut self,
        generation: u64,
        result: Result<Vec<AllocationResponse>, QueryError>,
    ) {
        if generation != self.generation {
            return;
        }
        self.allocations = FetchState::from_result(result);
        if let Some(allocations) = self.allocations.as_ready() {
            let keep = self
                .selected
                .filter(|id| allocations.iter().any(|a| a.id.as_uuid() == *id));
            self.selected = keep.or_else(|| allocations.first().map(|a| a.id.as_uuid()));
        }
    }

    pub fn selected_allocation(&self) -> Option<&AllocationResponse> {
        let selected = self.selected?;
        self.allocations
            .as_ready()?
            .iter()
            .find(|a| a.id.as_uuid() == selected)
    }

    /// Total portfolio value across loaded allocations.
    pub fn total_value(&self) -> Option<f64> {
        self.allocations
            .as_ready()
            .map(|allocations| allocations.iter().map(|a| a.position_value()).sum())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn text_field(initial: &str) -> TextArea<'static> {
    let mut field = if initial.is_empty() {
        TextArea::default()
    } else {
        TextArea::new(vec![initial.to_string()])
    };
    field.set_cursor_line_style(Style::default());
    field.move_cursor(CursorMove::End);
    field
}

fn select_next_id<T: HasEntityId>(items: &[T], selected: &mut Option<Uuid>) {
    if items.is_empty() {
        *selected = None;
        return;
    }
    let index = selected
        .and_then(|id| items.iter().position(|item| item.entity_id() == id))
        .unwrap_or(usize::MAX);
    let next = if index == usize::MAX {
        0
    } else {
        (index + 1) % items.len()
    };
    *selected = Some(items[next].entity_id());
}

fn select_prev_id<T: HasEntityId>(items: &[T], selected: &mut Option<Uuid>) {
    if items.is_empty() {
        *selected = None;
        return;
    }
    let index = selected
        .and_then(|id| items.iter().position(|item| item.entity_id() == id))
        .unwrap_or(0);
    let prev = if index == 0 { items.len() - 1 } else { index - 1 };
    *selected = Some(items[prev].entity_id());
}

trait HasEntityId {
    fn entity_id(&self) -> Uuid;
}

impl HasEntityId for ClientResponse {
    fn entity_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl HasEntityId for AssetResponse {
    fn entity_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl HasEntityId for AllocationResponse {
    fn entity_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Default for OverviewState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ClientDirectoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ClientFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for AssetBoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for AllocationFormState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for AllocationLedgerState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;
    use chrono::Utc;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use fidus_core::{AllocationId, AssetId};

    // ========================================================================
    // Test Fixtures
    // ========================================================================

    fn base_config() -> TuiConfig {
        TuiConfig {
            api_base_url: "http://localhost:3333".to_string(),
            request_timeout_ms: 5_000,
            refresh_interval_ms: 2_000,
            cache_ttl_ms: 60_000,
            persistence_path: "tmp/fidus-tui.json".into(),
            log_path: "tmp/fidus-tui.log".into(),
            theme: ThemeConfig {
                name: "midnight".to_string(),
            },
        }
    }

    fn sample_client(name: &str, status: ClientStatus) -> ClientResponse {
        ClientResponse {
            id: ClientId::generate(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_ascii_lowercase().replace(' ', ".")),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_asset(name: &str, value: f64) -> AssetResponse {
        AssetResponse {
            id: AssetId::generate(),
            name: name.to_string(),
            current_value: value,
        }
    }

    fn sample_allocation(client_id: ClientId, asset: AssetResponse, quantity: i64) -> AllocationResponse {
        AllocationResponse {
            id: AllocationId::generate(),
            client_id,
            asset_id: asset.id,
            quantity,
            assigned_at: Utc::now(),
            asset,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    fn type_text(form: &mut ClientFormState, text: &str) {
        for c in text.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    // ========================================================================
    // FetchState Tests
    // ========================================================================

    #[test]
    fn test_fetch_state_accessors() {
        let idle: FetchState<Vec<u8>> = FetchState::Idle;
        assert!(idle.is_idle());
        assert!(idle.as_ready().is_none());

        let failed: FetchState<Vec<u8>> = FetchState::Failed("boom".to_string());
        assert_eq!(failed.error(), Some("boom"));

        let ready = FetchState::Ready(vec![1u8]);
        assert_eq!(ready.as_ready(), Some(&vec![1u8]));
    }

    // ========================================================================
    // Directory Tests
    // ========================================================================

    #[test]
    fn test_directory_load_lifecycle() {
        let mut directory = ClientDirectoryState::new();
        assert!(directory.clients.is_idle());

        let generation = directory.begin_load();
        assert!(directory.clients.is_loading());

        let clients = vec![sample_client("Ada Lovelace", ClientStatus::Active)];
        directory.apply(generation, Ok(clients.clone()));
        assert_eq!(directory.clients.as_ready().map(Vec::len), Some(1));
        assert_eq!(directory.selected, Some(clients[0].id.as_uuid()));
    }

    #[test]
    fn test_directory_drops_superseded_results() {
        let mut directory = ClientDirectoryState::new();
        let stale = directory.begin_load();
        let fresh = directory.begin_load();

        directory.apply(stale, Ok(vec![sample_client("Old", ClientStatus::Active)]));
        assert!(directory.clients.is_loading());

        directory.apply(fresh, Ok(vec![sample_client("New", ClientStatus::Active)]));
        let names: Vec<&str> = directory
            .clients
            .as_ready()
            .map(|clients| clients.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["New"]);
    }

    #[test]
    fn test_directory_failure_state() {
        let mut directory = ClientDirectoryState::new();
        let generation = directory.begin_load();
        directory.apply(generation, Err(QueryError::with_status(500, "boom")));
        assert_eq!(directory.clients.error(), Some("boom"));
    }

    #[test]
    fn test_directory_selection_wraps() {
        let mut app = App::new(base_config());
        app.active_view = View::ClientDirectory;
        let clients = vec![
            sample_client("First", ClientStatus::Active),
            sample_client("Second", ClientStatus::Inactive),
        ];
        let ids: Vec<Uuid> = clients.iter().map(|c| c.id.as_uuid()).collect();
        let generation = app.directory.begin_load();
        app.directory.apply(generation, Ok(clients));

        assert_eq!(app.directory.selected, Some(ids[0]));
        app.select_next();
        assert_eq!(app.directory.selected, Some(ids[1]));
        app.select_next();
        assert_eq!(app.directory.selected, Some(ids[0]));
        app.select_previous();
        assert_eq!(app.directory.selected, Some(ids[1]));
    }

    // ========================================================================
    // Client Form Tests
    // ========================================================================

    #[test]
    fn test_form_typing_and_valid_submit() {
        let mut form = ClientFormState::new();
        type_text(&mut form, "Ada Lovelace");
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "ada@example.com");

        let submit = form.build_submit().expect("valid input should submit");
        match submit {
            ClientSubmit::Create(req) => {
                assert_eq!(req.name, "Ada Lovelace");
                assert_eq!(req.email, "ada@example.com");
                assert_eq!(req.status, ClientStatus::Active);
            }
            other => panic!("unexpected submit: {:?}", other),
        }
        assert_eq!(form.submit, SubmitState::Submitting);
    }

    #[test]
    fn test_form_invalid_submit_sets_field_errors_and_stays_idle() {
        let mut form = ClientFormState::new();
        type_text(&mut form, "Al");

        assert!(form.build_submit().is_none());
        assert!(form.errors.contains(crate::schemas::client::FIELD_NAME));
        assert!(form.errors.contains(crate::schemas::client::FIELD_EMAIL));
        assert_eq!(form.submit, SubmitState::Idle);
    }

    #[test]
    fn test_form_resubmit_blocked_while_submitting() {
        let mut form = ClientFormState::new();
        type_text(&mut form, "Ada Lovelace");
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "ada@example.com");

        assert!(form.build_submit().is_some());
        assert!(form.build_submit().is_none());
    }

    #[test]
    fn test_form_status_toggle() {
        let mut form = ClientFormState::new();
        form.focus = ClientField::Status;
        form.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(form.status, ClientStatus::Inactive);
        form.handle_key(key(KeyCode::Left));
        assert_eq!(form.status, ClientStatus::Active);
    }

    #[test]
    fn test_form_edit_requires_prefill() {
        let mut form = ClientFormState::new();
        let generation = form.begin_edit(ClientId::generate());
        assert!(form.build_submit().is_none());
        assert!(form.root_error.is_some());

        let client = sample_client("Grace Hopper", ClientStatus::Inactive);
        form.apply_prefill(generation, Ok(client.clone()));
        assert_eq!(form.name_text(), "Grace Hopper");
        assert_eq!(form.status, ClientStatus::Inactive);

        let submit = form.build_submit().expect("prefilled edit should submit");
        match submit {
            ClientSubmit::Update(_, req) => assert_eq!(req.email, client.email),
            other => panic!("unexpected submit: {:?}", other),
        }
    }

    #[test]
    fn test_form_stale_prefill_is_dropped() {
        let mut form = ClientFormState::new();
        let stale = form.begin_edit(ClientId::generate());
        let _fresh = form.begin_edit(ClientId::generate());
        form.apply_prefill(stale, Ok(sample_client("Old", ClientStatus::Active)));
        assert_eq!(form.name_text(), "");
        assert!(form.prefill.is_loading());
    }

    // ========================================================================
    // Conflict Mapping (409 lands on the email field, no navigation)
    // ========================================================================

    #[test]
    fn test_conflict_failure_maps_to_email_field_without_navigation() {
        let mut app = App::new(base_config());
        app.active_view = View::ClientForm;
        type_text(&mut app.client_form, "Ada Lovelace");
        app.client_form.handle_key(key(KeyCode::Tab));
        type_text(&mut app.client_form, "ada@example.com");
        assert!(app.client_form.build_submit().is_some());

        let failure = MutationFailure {
            kind: MutationKind::CreateClient,
            status: Some(409),
            message: "email in use".to_string(),
        };
        app.apply_mutation_failure(&failure);

        assert_eq!(app.active_view, View::ClientForm);
        assert_eq!(
            app.client_form.errors.first(crate::schemas::client::FIELD_EMAIL),
            Some("email in use")
        );
        assert_eq!(app.client_form.submit, SubmitState::Idle);
        // Input is retained for correction.
        assert_eq!(app.client_form.name_text(), "Ada Lovelace");
        assert!(matches!(
            app.notifications.last().map(|n| n.level),
            Some(NotificationLevel::Error)
        ));
    }

    #[test]
    fn test_non_conflict_failure_sets_root_error() {
        let mut app = App::new(base_config());
        let failure = MutationFailure {
            kind: MutationKind::UpdateClient,
            status: Some(500),
            message: "backend exploded".to_string(),
        };
        app.apply_mutation_failure(&failure);
        assert_eq!(
            app.client_form.root_error.as_deref(),
            Some("backend exploded")
        );
        assert!(!app.client_form.errors.contains(crate::schemas::client::FIELD_EMAIL));
    }

    #[test]
    fn test_create_success_navigates_to_directory_and_clears_form() {
        let mut app = App::new(base_config());
        app.active_view = View::ClientForm;
        type_text(&mut app.client_form, "Ada Lovelace");

        let created = sample_client("Ada Lovelace", ClientStatus::Active);
        app.apply_mutation_success(&MutationSuccess::ClientCreated(created.clone()));

        assert_eq!(app.active_view, View::ClientDirectory);
        assert_eq!(app.client_form.name_text(), "");
        assert_eq!(app.directory.selected, Some(created.id.as_uuid()));
        assert!(matches!(
            app.notifications.last().map(|n| n.level),
            Some(NotificationLevel::Success)
        ));
    }

    // ========================================================================
    // Delete Modal Tests
    // ========================================================================

    #[test]
    fn test_delete_modal_requires_selection() {
        let mut app = App::new(base_config());
        app.open_delete_modal();
        assert!(app.modal.is_none());

        let clients = vec![sample_client("Ada Lovelace", ClientStatus::Active)];
        let id = clients[0].id;
        let generation = app.directory.begin_load();
        app.directory.apply(generation, Ok(clients));
        app.open_delete_modal();

        let modal = app.modal.expect("modal should open for selection");
        assert_eq!(modal.action, PendingAction::DeleteClient(id));
        assert!(modal.message.contains("Ada Lovelace"));
    }

    // ========================================================================
    // Allocation Ledger Tests
    // ========================================================================

    #[test]
    fn test_ledger_open_resets_to_disabled_reads() {
        let mut ledger = AllocationLedgerState::new();
        let id = ClientId::generate();
        ledger.open_for(id);
        assert_eq!(ledger.client_id, Some(id));
        assert!(ledger.allocations.is_idle());
        assert!(ledger.client.is_idle());
    }

    #[test]
    fn test_ledger_total_value() {
        let mut ledger = AllocationLedgerState::new();
        let client_id = ClientId::generate();
        ledger.open_for(client_id);
        let generation = ledger.begin_load_allocations();
        ledger.apply_allocations(
            generation,
            Ok(vec![
                sample_allocation(client_id, sample_asset("Equity Fund", 100.0), 3),
                sample_allocation(client_id, sample_asset("Bond Fund", 50.5), 2),
            ]),
        );
        let total = ledger.total_value().expect("loaded ledger has a total");
        assert!((total - 401.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_allocation_form_asset_cycling_and_submit() {
        let assets = vec![
            sample_asset("Equity Fund", 100.0),
            sample_asset("Bond Fund", 50.0),
        ];
        let mut form = AllocationFormState::new();
        form.active = true;

        form.handle_key(key(KeyCode::Right), assets.len());
        assert_eq!(form.asset_cursor, 1);
        form.handle_key(key(KeyCode::Right), assets.len());
        assert_eq!(form.asset_cursor, 0);

        form.handle_key(key(KeyCode::Tab), assets.len());
        assert_eq!(form.focus, AllocationField::Quantity);
        form.handle_key(key(KeyCode::Char('2')), assets.len());

        let request = form.build_submit(&assets).expect("valid allocation");
        assert_eq!(request.asset_id, assets[0].id);
        assert_eq!(request.quantity, 2);
        assert_eq!(form.submit, SubmitState::Submitting);
    }

    #[test]
    fn test_allocation_form_rejects_without_assets() {
        let mut form = AllocationFormState::new();
        form.handle_key(key(KeyCode::Tab), 0);
        form.handle_key(key(KeyCode::Char('1')), 0);
        assert!(form.build_submit(&[]).is_none());
        assert!(form
            .errors
            .contains(crate::schemas::allocation::FIELD_ASSET_ID));
    }

    // ========================================================================
    // Overview Tests
    // ========================================================================

    #[test]
    fn test_overview_selection_wraps_and_targets() {
        let mut overview = OverviewState::new();
        assert_eq!(overview.target(), View::ClientDirectory);
        overview.select_next();
        assert_eq!(overview.target(), View::AssetBoard);
        overview.select_next();
        assert_eq!(overview.target(), View::ClientDirectory);
        overview.select_previous();
        assert_eq!(overview.target(), View::AssetBoard);
    }
}
