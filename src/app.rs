//! Application state and event handling.
//!
//! `App` owns the navigation state, the reload bus and the synchronizers of
//! whatever view is live. Store calls run on spawned tokio tasks and report
//! back through an mpsc channel drained by [`App::handle_updates`].

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::constants::async_tasks::CHANNEL_BUFFER_SIZE;
use crate::input::{Form, FormOutcome};
use crate::invalidation::ReloadBus;
use crate::nav::Navigation;
use crate::store::types::{Event, Expense, Todo, Trip};
use crate::store::{Draft, HttpStore, Mutation, Record, RemoteStore, WriteOp, WriteOutcome};
use crate::sync::{ReadTicket, Synchronizer};
use crate::types::{Resource, Tab};
use crate::views;

/// Which live synchronizer a read result is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The trip list.
    TripList,
    /// The active tab of the selected trip.
    TabView,
}

/// Messages sent back from spawned store calls.
#[derive(Debug)]
pub enum AppUpdate {
    /// A read finished.
    Loaded {
        /// Target synchronizer.
        slot: Slot,
        /// Generation of the ticket that issued the read.
        generation: u64,
        /// Rows returned (empty on any failure).
        records: Vec<Record>,
    },
    /// A write finished.
    Written {
        /// What was sent.
        mutation: Mutation,
        /// How it went.
        outcome: WriteOutcome,
    },
}

/// Top-level application state.
pub struct App {
    pub config: Config,
    store: Option<Arc<dyn RemoteStore>>,
    pub nav: Navigation,
    pub bus: ReloadBus,
    pub trip_list: Option<Synchronizer>,
    pub tab_view: Option<Synchronizer>,
    /// Snapshot of the selected trip for the header.
    pub current_trip: Option<Trip>,
    pub trip_list_state: ListState,
    pub row_list_state: ListState,
    pub form: Option<Form>,
    pub pending_delete: Option<Event>,
    pub global_command_buffer: String,
    pub is_global_command_mode: bool,
    pub should_quit: bool,
    pub show_help: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub async_task_tx: mpsc::Sender<AppUpdate>,
    async_task_rx: mpsc::Receiver<AppUpdate>,
    in_flight: usize,
}

impl App {
    /// Build the app against the configured HTTP endpoint.
    ///
    /// A missing endpoint is shown as an error; the UI still runs with
    /// empty views.
    pub fn new(config: Config) -> Self {
        match HttpStore::new(&config) {
            Ok(store) => {
                tracing::info!(store = store.name(), endpoint = store.endpoint(), "using remote store");
                Self::with_store(config, Some(Arc::new(store)))
            }
            Err(e) => {
                tracing::warn!(error = %e, "starting without a remote store");
                let mut app = Self::with_store(config, None);
                app.error_message = Some(e.to_string());
                app
            }
        }
    }

    /// Build the app against any store. Must run inside a tokio runtime.
    pub fn with_store(config: Config, store: Option<Arc<dyn RemoteStore>>) -> Self {
        let (async_task_tx, async_task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            config,
            store,
            nav: Navigation::default(),
            bus: ReloadBus::new(),
            trip_list: None,
            tab_view: None,
            current_trip: None,
            trip_list_state: ListState::default(),
            row_list_state: ListState::default(),
            form: None,
            pending_delete: None,
            global_command_buffer: String::new(),
            is_global_command_mode: false,
            should_quit: false,
            show_help: false,
            error_message: None,
            status_message: None,
            async_task_tx,
            async_task_rx,
            in_flight: 0,
        };
        app.reconcile();
        app
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Store calls spawned but not yet applied.
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    // --- Synchronization -------------------------------------------------

    /// Make the live synchronizers match the navigation state and issue
    /// whatever reads their keys call for.
    pub fn reconcile(&mut self) {
        let ticket = match self.nav.live_resource() {
            Some((Resource::Trips, _)) => {
                self.tab_view = None;
                let token = self.bus.token(Resource::Trips);
                let sync = self.trip_list.get_or_insert_with(Synchronizer::new);
                sync.sync(Resource::Trips, None, token).map(|t| (Slot::TripList, t))
            }
            Some((resource, scope)) => {
                self.trip_list = None;
                let token = self.bus.token(resource);
                let sync = self.tab_view.get_or_insert_with(Synchronizer::new);
                sync.sync(resource, scope, token).map(|t| (Slot::TabView, t))
            }
            None => {
                self.trip_list = None;
                self.tab_view = None;
                None
            }
        };
        if let Some((slot, ticket)) = ticket {
            self.spawn_read(slot, ticket);
        }
    }

    /// Re-read every live collection.
    pub fn reload(&mut self) {
        let epoch = self.bus.publish_all();
        tracing::info!(epoch, "manual reload");
        self.reconcile();
    }

    fn spawn_read(&mut self, slot: Slot, ticket: ReadTicket) {
        let Some(store) = self.store.as_ref().map(Arc::clone) else {
            self.apply_loaded(slot, ticket.generation, Vec::new());
            return;
        };
        let tx = self.async_task_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let records = store.read(ticket.resource, ticket.scope.as_ref()).await;
            let update = AppUpdate::Loaded { slot, generation: ticket.generation, records };
            if tx.send(update).await.is_err() {
                tracing::debug!(?slot, "update channel closed before read landed");
            }
        });
    }

    /// Send a write; the affected resource is invalidated once it completes.
    pub fn submit_mutation(&mut self, mutation: Mutation) {
        let Some(store) = self.store.as_ref().map(Arc::clone) else {
            self.error_message = Some("No remote store configured; changes cannot be saved".to_string());
            return;
        };
        tracing::info!(resource = %mutation.resource, action = mutation.op.action(), "mutation issued");
        let tx = self.async_task_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let outcome = store.apply(&mutation).await;
            if tx.send(AppUpdate::Written { mutation, outcome }).await.is_err() {
                tracing::debug!("update channel closed before write landed");
            }
        });
    }

    /// Write a new record built from a validated draft.
    pub fn submit_draft(&mut self, draft: &Draft) {
        self.submit_mutation(Mutation::add(draft));
    }

    /// Apply every update that has already arrived.
    pub fn handle_updates(&mut self) {
        loop {
            match self.async_task_rx.try_recv() {
                Ok(update) => self.apply_update(update),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    tracing::warn!("update channel disconnected");
                    break;
                }
            }
        }
    }

    /// Wait for the next update and apply it. Returns `false` if the channel closed.
    pub async fn next_update(&mut self) -> bool {
        match self.async_task_rx.recv().await {
            Some(update) => {
                self.apply_update(update);
                true
            }
            None => false,
        }
    }

    /// Apply updates until nothing is in flight, including reads that
    /// invalidation triggers along the way.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            if !self.next_update().await {
                break;
            }
        }
    }

    fn apply_update(&mut self, update: AppUpdate) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match update {
            AppUpdate::Loaded { slot, generation, records } => {
                self.apply_loaded(slot, generation, records);
            }
            AppUpdate::Written { mutation, outcome } => self.apply_written(&mutation, outcome),
        }
    }

    fn apply_loaded(&mut self, slot: Slot, generation: u64, records: Vec<Record>) {
        let sync = match slot {
            Slot::TripList => self.trip_list.as_mut(),
            Slot::TabView => self.tab_view.as_mut(),
        };
        let Some(sync) = sync else {
            tracing::debug!(?slot, "read landed after its view closed");
            return;
        };
        if sync.complete(generation, records) {
            self.clamp_selection(slot);
        }
    }

    fn apply_written(&mut self, mutation: &Mutation, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Sent { echoed } => {
                let row = match (mutation.op, echoed) {
                    (WriteOp::Add, Some(echoed)) => mutation.merged_row(&echoed),
                    _ => None,
                };
                if let (Some(row), Some(sync)) = (row, self.live_sync_mut(mutation.resource)) {
                    sync.merge(row);
                }
            }
            WriteOutcome::Failed { reason } => {
                self.status_message = Some(format!("Could not save to {}: {reason}", mutation.resource));
            }
        }
        self.bus.publish(mutation.resource);
        self.reconcile();
    }

    fn live_sync_mut(&mut self, resource: Resource) -> Option<&mut Synchronizer> {
        [self.trip_list.as_mut(), self.tab_view.as_mut()]
            .into_iter()
            .flatten()
            .find(|s| s.resource() == Some(resource))
    }

    /// Whether the live view is waiting on a read.
    pub fn is_loading(&self) -> bool {
        self.trip_list.as_ref().is_some_and(Synchronizer::is_loading)
            || self.tab_view.as_ref().is_some_and(Synchronizer::is_loading)
    }

    // --- View data -------------------------------------------------------

    fn tab_records(&self, resource: Resource) -> &[Record] {
        self.tab_view
            .as_ref()
            .filter(|s| s.resource() == Some(resource))
            .map_or(&[] as &[Record], Synchronizer::records)
    }

    /// Trips, newest first.
    pub fn trips(&self) -> Vec<Trip> {
        self.trip_list
            .as_ref()
            .map(|s| views::trip_rows(s.records()))
            .unwrap_or_default()
    }

    /// Events of the selected trip, by time.
    pub fn events(&self) -> Vec<Event> {
        views::schedule_rows(self.tab_records(Resource::Events))
    }

    /// Expenses of the selected trip.
    pub fn expenses(&self) -> Vec<Expense> {
        views::expense_rows(self.tab_records(Resource::Expenses))
    }

    /// Todos of the selected trip.
    pub fn todos(&self) -> Vec<Todo> {
        views::todo_rows(self.tab_records(Resource::Todos))
    }

    fn row_count(&self) -> usize {
        match self.nav.tab() {
            Some(Tab::Schedule) => self.events().len(),
            Some(Tab::Expense) => self.expenses().len(),
            Some(Tab::Planning) => self.todos().len(),
            Some(Tab::Bookings) | None => 0,
        }
    }

    fn clamp_selection(&mut self, slot: Slot) {
        let (len, state) = match slot {
            Slot::TripList => (self.trips().len(), &mut self.trip_list_state),
            Slot::TabView => (self.row_count(), &mut self.row_list_state),
        };
        clamp(state, len);
    }

    // --- Navigation ------------------------------------------------------

    /// Open a trip on its schedule tab.
    pub fn select_trip(&mut self, trip: Trip) {
        if self.nav.select_trip(trip.id.clone()) {
            self.current_trip = Some(trip);
            self.row_list_state.select(None);
            self.reconcile();
        }
    }

    /// Switch tabs inside the open trip.
    pub fn select_tab(&mut self, tab: Tab) {
        if self.nav.tab() != Some(tab) && self.nav.select_tab(tab) {
            self.tab_changed();
        }
    }

    /// Cycle to the next tab.
    pub fn next_tab(&mut self) {
        if self.nav.next_tab() {
            self.tab_changed();
        }
    }

    /// Cycle to the previous tab.
    pub fn prev_tab(&mut self) {
        if self.nav.prev_tab() {
            self.tab_changed();
        }
    }

    fn tab_changed(&mut self) {
        self.row_list_state.select(None);
        self.pending_delete = None;
        self.reconcile();
    }

    /// Return to the trip list.
    pub fn go_back(&mut self) {
        if self.nav.back() {
            tracing::debug!("back to trip list");
            self.current_trip = None;
            self.pending_delete = None;
            self.row_list_state.select(None);
            self.reconcile();
        }
    }

    // --- Input -----------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        // An open form swallows every key
        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormOutcome::Pending | FormOutcome::Invalid(_) => {}
                FormOutcome::Cancelled => {
                    tracing::debug!("form cancelled");
                    self.form = None;
                }
                FormOutcome::Submitted(draft) => {
                    self.form = None;
                    self.submit_draft(&draft);
                }
            }
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        if self.error_message.is_some() {
            if key.code == KeyCode::Esc {
                self.error_message = None;
            }
            return;
        }

        if self.pending_delete.is_some() {
            match key.code {
                KeyCode::Char('y' | 'Y') => self.confirm_delete(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.pending_delete = None,
                _ => {}
            }
            return;
        }

        if self.status_message.is_some() {
            if key.code == KeyCode::Esc {
                self.status_message = None;
            }
            return;
        }

        if key.code == KeyCode::F(1) || key.code == KeyCode::Char('?') {
            self.show_help = true;
            return;
        }

        if self.is_global_command_mode {
            self.handle_global_command_input(key);
            return;
        }

        if key.code == KeyCode::Char(':') {
            self.is_global_command_mode = true;
            self.global_command_buffer.clear();
            return;
        }

        if self.nav.trip().is_some() {
            self.handle_trip_input(key);
        } else {
            self.handle_trip_list_input(key);
        }
    }

    fn handle_global_command_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.is_global_command_mode = false;
                self.global_command_buffer.clear();
            }
            KeyCode::Enter => {
                self.execute_global_command();
                self.is_global_command_mode = false;
                self.global_command_buffer.clear();
            }
            KeyCode::Backspace => {
                self.global_command_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.global_command_buffer.push(c);
            }
            _ => {}
        }
    }

    pub fn execute_global_command(&mut self) {
        match self.global_command_buffer.trim() {
            "q" | "quit" => self.quit(),
            "r" | "reload" => self.reload(),
            "back" => self.go_back(),
            "" => {}
            other => {
                self.status_message = Some(format!("Unknown command: {other}"));
            }
        }
    }

    fn handle_trip_list_input(&mut self, key: KeyEvent) {
        let len = self.trips().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => move_selection(&mut self.trip_list_state, len, -1),
            KeyCode::Down | KeyCode::Char('j') => move_selection(&mut self.trip_list_state, len, 1),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                let selected = self
                    .trip_list_state
                    .selected()
                    .and_then(|idx| self.trips().into_iter().nth(idx));
                if let Some(trip) = selected {
                    self.select_trip(trip);
                }
            }
            KeyCode::Char('a') => {
                self.form = Some(Form::new_trip(chrono::Local::now().date_naive()));
            }
            _ => {}
        }
    }

    fn handle_trip_input(&mut self, key: KeyEvent) {
        let Some(tab) = self.nav.tab() else {
            return;
        };
        let len = self.row_count();
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.go_back(),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.next_tab(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.prev_tab(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                if let Some(tab) = Tab::from_index(idx) {
                    self.select_tab(tab);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => move_selection(&mut self.row_list_state, len, -1),
            KeyCode::Down | KeyCode::Char('j') => move_selection(&mut self.row_list_state, len, 1),
            KeyCode::Char('a') => self.open_add_form(tab),
            KeyCode::Char('d') | KeyCode::Delete if tab == Tab::Schedule => {
                self.pending_delete = self
                    .row_list_state
                    .selected()
                    .and_then(|idx| self.events().into_iter().nth(idx));
            }
            KeyCode::Char(' ') | KeyCode::Enter if tab == Tab::Planning => self.toggle_selected_todo(),
            _ => {}
        }
    }

    fn open_add_form(&mut self, tab: Tab) {
        let Some(trip) = self.nav.trip().cloned() else {
            return;
        };
        self.form = match tab {
            Tab::Schedule => Some(Form::new_event(trip)),
            Tab::Expense => Some(Form::new_expense(trip)),
            Tab::Planning => Some(Form::new_todo(trip)),
            Tab::Bookings => None,
        };
    }

    fn confirm_delete(&mut self) {
        if let Some(event) = self.pending_delete.take() {
            self.submit_mutation(Mutation::delete(Resource::Events, &event.id));
        }
    }

    fn toggle_selected_todo(&mut self) {
        let selected = self
            .row_list_state
            .selected()
            .and_then(|idx| self.todos().into_iter().nth(idx));
        if let Some(todo) = selected {
            self.submit_mutation(Mutation::toggle_todo(&todo));
        }
    }
}

fn move_selection(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let next = match state.selected() {
        None => 0,
        Some(idx) => idx.saturating_add_signed(delta).min(len - 1),
    };
    state.select(Some(next));
}

fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        None => state.select(Some(0)),
        Some(idx) if idx >= len => state.select(Some(len - 1)),
        Some(_) => {}
    }
}
