//! End-to-end flows through `App` against an in-memory store.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{json, Value};
use tripboard::app::App;
use tripboard::config::Config;
use tripboard::store::types::NewEvent;
use tripboard::store::{Draft, Record, RemoteStore, WriteOp, WriteOutcome};
use tripboard::types::{Resource, Tab, TripId};

/// Sheet-like store that keeps rows in memory and counts reads.
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<HashMap<Resource, Vec<Record>>>,
    reads: Mutex<Vec<(Resource, Option<TripId>)>>,
    next_id: AtomicU64,
    fail_writes: bool,
    /// Answer adds with `{status, id}` only, as a script endpoint does.
    bare_replies: bool,
}

impl MemoryStore {
    fn seeded() -> Self {
        let store = Self::default();
        store.insert(Resource::Trips, json!({ "id": "T1", "title": "Kyoto", "startDate": "2024-12-30", "createdAt": "2024-01-01" }));
        store.insert(Resource::Trips, json!({ "id": "T2", "title": "Seoul", "startDate": "2025-04-01", "createdAt": "2024-03-01" }));
        store.insert(Resource::Events, json!({ "id": "e1", "tripId": "T1", "title": "Market", "time": "09:00", "location": "Nishiki" }));
        store.insert(Resource::Events, json!({ "id": "e2", "tripId": "T1", "title": "Shrine", "time": "07:00", "location": "Fushimi" }));
        store.insert(Resource::Events, json!({ "id": "e3", "tripId": "T2", "title": "Palace", "time": "08:30", "location": "Seoul" }));
        store.insert(Resource::Expenses, json!({ "id": "x1", "tripId": "T1", "amount": "100", "item": "Tea", "payer": "Me" }));
        store.insert(Resource::Todos, json!({ "id": "d1", "tripId": "T1", "text": "Passport", "done": "FALSE" }));
        store
    }

    fn failing() -> Self {
        Self { fail_writes: true, ..Self::seeded() }
    }

    fn bare() -> Self {
        Self { bare_replies: true, ..Self::seeded() }
    }

    fn insert(&self, resource: Resource, value: Value) {
        let mut record = Record::from_value(value).unwrap();
        record.normalize(resource);
        self.rows.lock().unwrap().entry(resource).or_default().push(record);
    }

    fn read_count(&self, resource: Resource) -> usize {
        self.reads.lock().unwrap().iter().filter(|(r, _)| *r == resource).count()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn read(&self, resource: Resource, scope: Option<&TripId>) -> Vec<Record> {
        self.reads.lock().unwrap().push((resource, scope.cloned()));
        let rows = self.rows.lock().unwrap();
        rows.get(&resource)
            .map(|rows| {
                rows.iter()
                    .filter(|r| scope.map_or(true, |t| r.text("tripId").as_deref() == Some(t.as_str())))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn write(&self, op: WriteOp, resource: Resource, payload: &Value) -> WriteOutcome {
        if self.fail_writes {
            return WriteOutcome::Failed { reason: "connection refused".to_string() };
        }
        let mut rows = self.rows.lock().unwrap();
        let sheet = rows.entry(resource).or_default();
        let id = payload.get("id").and_then(Value::as_str).map(str::to_string);
        match op {
            WriteOp::Add => {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst);
                let mut record = Record::from_value(payload.clone()).unwrap();
                record.set("id", json!(format!("m{n}")));
                record.set("createdAt", json!(format!("2099-01-{:02}", n + 1)));
                record.normalize(resource);
                let echoed = if self.bare_replies {
                    Record::from_value(json!({ "status": "success", "id": record.get("id") }))
                } else {
                    Some(record.clone())
                };
                sheet.push(record);
                WriteOutcome::Sent { echoed }
            }
            WriteOp::Update => {
                let updates = payload.get("updates").and_then(Value::as_object).cloned().unwrap_or_default();
                for row in sheet.iter_mut().filter(|r| r.text("id") == id) {
                    for (field, value) in &updates {
                        row.set(field.clone(), value.clone());
                    }
                    row.normalize(resource);
                }
                WriteOutcome::Sent { echoed: None }
            }
            WriteOp::Delete => {
                sheet.retain(|r| r.text("id") != id);
                WriteOutcome::Sent { echoed: None }
            }
        }
    }

    fn name(&self) -> &'static str {
        "MemoryStore"
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
}

fn clear_field(app: &mut App) {
    app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
}

async fn app_with(store: &Arc<MemoryStore>) -> App {
    let dyn_store: Arc<dyn RemoteStore> = Arc::<MemoryStore>::clone(store);
    let mut app = App::with_store(Config::default(), Some(dyn_store));
    app.settle().await;
    app
}

async fn open_trip(app: &mut App, id: &str) {
    let trip = app.trips().into_iter().find(|t| t.id.as_str() == id).unwrap();
    app.select_trip(trip);
    app.settle().await;
}

fn temple() -> Draft {
    Draft::Event(NewEvent {
        trip_id: TripId::new("T1"),
        title: "Temple".to_string(),
        time: "08:00".to_string(),
        kind: "spot".to_string(),
        location: "Kyoto".to_string(),
    })
}

/// Apply updates until the pending write has landed, leaving its reload unapplied.
async fn until_written(app: &mut App) {
    while app.bus.epoch() == 0 {
        assert!(app.next_update().await);
    }
}

fn times(app: &App) -> Vec<String> {
    app.events().into_iter().map(|e| e.time).collect()
}

#[tokio::test]
async fn trip_list_loads_newest_first() {
    let store = Arc::new(MemoryStore::seeded());
    let app = app_with(&store).await;

    let titles: Vec<String> = app.trips().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, ["Seoul", "Kyoto"]);
    assert_eq!(store.read_count(Resource::Trips), 1);
    assert_eq!(app.trip_list_state.selected(), Some(0));
}

#[tokio::test]
async fn adding_an_event_reloads_the_schedule() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    assert_eq!(app.nav.tab(), Some(Tab::Schedule));
    assert_eq!(times(&app), ["07:00", "09:00"]);
    assert_eq!(store.read_count(Resource::Events), 1);
    assert_eq!(app.bus.epoch(), 0);

    app.handle_key(key(KeyCode::Char('a')));
    assert!(app.form.is_some());
    type_text(&mut app, "Temple");
    app.handle_key(key(KeyCode::Enter));
    clear_field(&mut app);
    type_text(&mut app, "08:00");
    app.handle_key(key(KeyCode::Enter));
    clear_field(&mut app);
    type_text(&mut app, "Kyoto");
    app.handle_key(key(KeyCode::Enter));
    assert!(app.form.is_none());

    app.settle().await;

    assert_eq!(app.bus.epoch(), 1);
    assert_eq!(store.read_count(Resource::Events), 2);
    assert_eq!(times(&app), ["07:00", "08:00", "09:00"]);
    let temple = app.events().into_iter().find(|e| e.title == "Temple").unwrap();
    assert_eq!(temple.location, "Kyoto");
    assert_eq!(temple.trip_id, Some(TripId::new("T1")));
}

#[tokio::test]
async fn cancelled_form_writes_nothing() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    app.handle_key(key(KeyCode::Char('a')));
    type_text(&mut app, "Temple");
    app.handle_key(key(KeyCode::Esc));

    assert!(app.form.is_none());
    assert_eq!(app.in_flight(), 0);
    assert_eq!(app.bus.epoch(), 0);
}

#[tokio::test]
async fn unrelated_invalidation_does_not_reread() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    app.bus.publish(Resource::Expenses);
    app.reconcile();
    assert_eq!(app.in_flight(), 0);
    assert_eq!(store.read_count(Resource::Events), 1);

    app.bus.publish(Resource::Events);
    app.reconcile();
    assert_eq!(app.in_flight(), 1);
    app.settle().await;
    assert_eq!(store.read_count(Resource::Events), 2);
}

#[tokio::test]
async fn failed_write_is_reported_and_still_invalidates() {
    let store = Arc::new(MemoryStore::failing());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    app.submit_draft(&temple());
    app.settle().await;

    let status = app.status_message.clone().unwrap();
    assert!(status.contains("events"));
    assert!(status.contains("connection refused"));
    assert_eq!(app.bus.epoch(), 1);
    assert_eq!(store.read_count(Resource::Events), 2);
    assert_eq!(times(&app), ["07:00", "09:00"]);
}

#[tokio::test]
async fn switching_tabs_reads_once_per_tab() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    app.handle_key(key(KeyCode::Tab));
    assert_eq!(app.nav.tab(), Some(Tab::Bookings));
    assert!(app.tab_view.is_none());
    assert_eq!(app.in_flight(), 0);

    app.handle_key(key(KeyCode::Char('3')));
    assert_eq!(app.nav.tab(), Some(Tab::Expense));
    assert_eq!(app.in_flight(), 1);
    app.settle().await;

    assert_eq!(store.read_count(Resource::Expenses), 1);
    assert_eq!(app.expenses().len(), 1);
    assert!(app.events().is_empty());

    // Re-selecting the same tab is a no-op
    app.select_tab(Tab::Expense);
    assert_eq!(app.in_flight(), 0);
}

#[tokio::test]
async fn leaving_and_reentering_resets_to_schedule() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    app.select_tab(Tab::Planning);
    app.settle().await;
    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.nav.trip(), None);
    assert!(app.current_trip.is_none());
    app.settle().await;
    assert_eq!(store.read_count(Resource::Trips), 2);

    open_trip(&mut app, "T1").await;
    assert_eq!(app.nav.tab(), Some(Tab::Schedule));
    assert_eq!(times(&app), ["07:00", "09:00"]);
}

#[tokio::test]
async fn space_toggles_the_selected_todo() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;
    app.select_tab(Tab::Planning);
    app.settle().await;

    assert!(!app.todos()[0].done);
    assert_eq!(app.row_list_state.selected(), Some(0));

    app.handle_key(key(KeyCode::Char(' ')));
    app.settle().await;
    assert!(app.todos()[0].done);
}

#[tokio::test]
async fn delete_needs_confirmation() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    app.handle_key(key(KeyCode::Char('d')));
    let pending = app.pending_delete.clone().unwrap();
    assert_eq!(pending.title, "Shrine");

    app.handle_key(key(KeyCode::Char('n')));
    assert!(app.pending_delete.is_none());
    assert_eq!(app.in_flight(), 0);

    app.handle_key(key(KeyCode::Char('d')));
    app.handle_key(key(KeyCode::Char('y')));
    app.settle().await;
    assert_eq!(times(&app), ["09:00"]);
}

#[tokio::test]
async fn reload_command_rereads_the_live_view() {
    let store = Arc::new(MemoryStore::seeded());
    let mut app = app_with(&store).await;

    app.handle_key(key(KeyCode::Char(':')));
    type_text(&mut app, "reload");
    app.handle_key(key(KeyCode::Enter));
    app.settle().await;

    assert_eq!(store.read_count(Resource::Trips), 2);
    assert_eq!(app.trips().len(), 2);
}

#[tokio::test]
async fn bare_reply_merges_the_sent_fields() {
    let store = Arc::new(MemoryStore::bare());
    let mut app = app_with(&store).await;
    open_trip(&mut app, "T1").await;

    app.submit_draft(&temple());
    until_written(&mut app).await;

    // Visible before the reload lands, with the fields that were sent
    let added = app.events().into_iter().find(|e| e.id.as_str() == "m0").unwrap();
    assert_eq!(added.title, "Temple");
    assert_eq!(added.location, "Kyoto");
    assert_eq!(added.trip_id, Some(TripId::new("T1")));
    assert_eq!(times(&app), ["07:00", "08:00", "09:00"]);

    app.settle().await;
    assert_eq!(times(&app), ["07:00", "08:00", "09:00"]);
}

#[tokio::test]
async fn write_landing_after_trip_switch_stays_out_of_the_new_trip() {
    let store = Arc::new(MemoryStore::bare());
    let mut app = app_with(&store).await;
    let seoul = app.trips().into_iter().find(|t| t.id.as_str() == "T2").unwrap();
    open_trip(&mut app, "T1").await;

    app.submit_draft(&temple());
    app.go_back();
    app.select_trip(seoul);
    until_written(&mut app).await;

    assert_eq!(app.nav.trip(), Some(&TripId::new("T2")));
    assert!(app.events().iter().all(|e| e.id.as_str() != "m0" && e.title != "Temple"));

    app.settle().await;
    assert_eq!(times(&app), ["08:30"]);
}
