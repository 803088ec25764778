//! Remote store data types.
//!
//! Records arrive as loosely typed JSON objects. `Record` keeps them opaque;
//! the typed projections (`Trip`, `Event`, `Expense`, `Todo`) pull out only the
//! fields the views depend on and coerce them the same way everywhere.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::defaults;
use crate::types::{RecordId, Resource, TripId};

/// One row of a sheet, kept as a field-name to value mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wrap a JSON value; only objects are records.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Raw field access.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Overwrite a field.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// A scalar field rendered as text. Strings, numbers and booleans qualify.
    pub fn text(&self, field: &str) -> Option<String> {
        scalar_text(self.get(field)?)
    }

    /// Text of a field, or the empty string.
    pub fn text_or_empty(&self, field: &str) -> String {
        self.text(field).unwrap_or_default()
    }

    /// Store-assigned id, if present.
    pub fn id(&self) -> Option<RecordId> {
        self.text("id").filter(|s| !s.is_empty()).map(RecordId::from)
    }

    /// Creation timestamp; missing sorts as the empty string.
    pub fn created_at(&self) -> String {
        self.text_or_empty("createdAt")
    }

    /// Rewrite loosely typed fields into their canonical JSON shape.
    ///
    /// Todo `done` flags become real booleans here so nothing downstream has
    /// to know the sheet may hand back `"TRUE"`.
    pub fn normalize(&mut self, resource: Resource) {
        if resource == Resource::Todos {
            let done = is_truthy(self.get("done"));
            self.set("done", Value::Bool(done));
        }
    }

    /// Borrow the underlying map.
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `true` for boolean true or the exact sheet literal `"TRUE"`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "TRUE",
        _ => false,
    }
}

/// Numeric value of a field; anything unparseable counts as zero.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

/// A trip as shown in the trip list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    pub start_date: String,
    pub cover_emoji: String,
    pub created_at: String,
}

impl Trip {
    /// Project a record; `None` when it has no id.
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            id: record.id()?.into(),
            title: record.text_or_empty("title"),
            start_date: record.text_or_empty("startDate"),
            cover_emoji: record.text_or_empty("coverEmoji"),
            created_at: record.created_at(),
        })
    }
}

/// A schedule entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: RecordId,
    pub trip_id: Option<TripId>,
    pub title: String,
    pub time: String,
    pub location: String,
}

impl Event {
    /// Project a record; `None` when it has no id.
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            id: record.id()?,
            trip_id: record.text("tripId").map(TripId::from),
            title: record.text_or_empty("title"),
            time: record.text_or_empty("time"),
            location: record.text_or_empty("location"),
        })
    }
}

/// A ledger line.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: RecordId,
    pub trip_id: Option<TripId>,
    pub amount: f64,
    pub item: String,
    pub payer: String,
}

impl Expense {
    /// Project a record; `None` when it has no id.
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            id: record.id()?,
            trip_id: record.text("tripId").map(TripId::from),
            amount: coerce_number(record.get("amount")),
            item: record.text_or_empty("item"),
            payer: record.text_or_empty("payer"),
        })
    }
}

/// A checklist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: RecordId,
    pub trip_id: Option<TripId>,
    pub text: String,
    pub done: bool,
}

impl Todo {
    /// Project a record; `None` when it has no id.
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            id: record.id()?,
            trip_id: record.text("tripId").map(TripId::from),
            text: record.text_or_empty("text"),
            done: is_truthy(record.get("done")),
        })
    }
}

/// Write operation understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOp {
    Add,
    Update,
    Delete,
}

impl WriteOp {
    /// Wire name of the operation.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Body of a write request.
#[derive(Debug, Clone, Serialize)]
pub struct WriteRequest<'a> {
    pub action: WriteOp,
    pub sheet: &'a str,
    pub data: &'a Value,
}

/// What came back from a write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The request completed; the store may have echoed the written row.
    Sent {
        /// Row echoed by the store, when the response carried one.
        echoed: Option<Record>,
    },
    /// The request did not complete.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

/// A fully described write, ready to hand to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub op: WriteOp,
    pub resource: Resource,
    pub payload: Value,
}

impl Mutation {
    /// Insert a new row built from a draft.
    pub fn add(draft: &Draft) -> Self {
        Self {
            op: WriteOp::Add,
            resource: draft.resource(),
            payload: draft.payload(),
        }
    }

    /// Remove a row by id.
    pub fn delete(resource: Resource, id: &RecordId) -> Self {
        Self {
            op: WriteOp::Delete,
            resource,
            payload: serde_json::json!({ "id": id.as_str() }),
        }
    }

    /// Row to fold into a live view once an add lands.
    ///
    /// Starts from the fields that were sent, so the row always carries its
    /// `tripId`, then lays whatever the store echoed on top. The reply
    /// envelope's `status` is not a column and is dropped.
    pub fn merged_row(&self, echoed: &Record) -> Option<Record> {
        let mut row = Record::from_value(self.payload.clone())?;
        for (field, value) in echoed.fields() {
            if field != "status" {
                row.set(field.clone(), value.clone());
            }
        }
        row.normalize(self.resource);
        Some(row)
    }

    /// Flip a todo's completion flag.
    pub fn toggle_todo(todo: &Todo) -> Self {
        Self {
            op: WriteOp::Update,
            resource: Resource::Todos,
            payload: serde_json::json!({
                "id": todo.id.as_str(),
                "updates": { "done": !todo.done },
            }),
        }
    }
}

/// New trip payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub title: String,
    pub start_date: String,
    pub cover_emoji: String,
}

impl NewTrip {
    /// Build a trip draft with a random cover emoji.
    pub fn new(title: impl Into<String>, start_date: impl Into<String>) -> Self {
        use rand::seq::SliceRandom;
        let cover_emoji = defaults::COVER_EMOJIS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(defaults::COVER_EMOJIS[0])
            .to_string();
        Self {
            title: title.into(),
            start_date: start_date.into(),
            cover_emoji,
        }
    }
}

/// New schedule entry payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub trip_id: TripId,
    pub title: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
}

/// New expense payload. `amount` stays a string, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub trip_id: TripId,
    pub amount: String,
    pub item: String,
    pub payer: String,
}

/// New todo payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub trip_id: TripId,
    pub text: String,
    pub done: bool,
}

/// Any validated new-record payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Trip(NewTrip),
    Event(NewEvent),
    Expense(NewExpense),
    Todo(NewTodo),
}

impl Draft {
    /// Sheet the draft is written to.
    #[must_use]
    pub const fn resource(&self) -> Resource {
        match self {
            Self::Trip(_) => Resource::Trips,
            Self::Event(_) => Resource::Events,
            Self::Expense(_) => Resource::Expenses,
            Self::Todo(_) => Resource::Todos,
        }
    }

    /// JSON payload for the `data` field.
    pub fn payload(&self) -> Value {
        let value = match self {
            Self::Trip(d) => serde_json::to_value(d),
            Self::Event(d) => serde_json::to_value(d),
            Self::Expense(d) => serde_json::to_value(d),
            Self::Todo(d) => serde_json::to_value(d),
        };
        // Plain structs of strings and bools always serialize.
        value.unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn done_flag_accepts_bool_and_sheet_literal() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!("TRUE"))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!("FALSE"))));
        assert!(!is_truthy(None));
    }

    #[test]
    fn only_the_exact_sheet_literal_counts_as_done() {
        assert!(!is_truthy(Some(&json!("true"))));
        assert!(!is_truthy(Some(&json!("True"))));
        assert!(!is_truthy(Some(&json!(" TRUE "))));
        assert!(!is_truthy(Some(&json!(1))));
    }

    #[test]
    fn merged_row_keeps_sent_fields_under_a_bare_reply() {
        let draft = Draft::Event(NewEvent {
            trip_id: TripId::new("T1"),
            title: "Temple".to_string(),
            time: "08:00".to_string(),
            kind: "spot".to_string(),
            location: "Kyoto".to_string(),
        });
        let mutation = Mutation::add(&draft);
        let reply = record(json!({ "status": "success", "id": "m1" }));

        let row = mutation.merged_row(&reply).unwrap();
        assert_eq!(row.id(), Some(RecordId::new("m1")));
        assert_eq!(row.text("tripId").as_deref(), Some("T1"));
        assert_eq!(row.text("title").as_deref(), Some("Temple"));
        assert!(row.get("status").is_none());
    }

    #[test]
    fn merged_row_prefers_echoed_values_and_normalizes() {
        let draft = Draft::Todo(NewTodo { trip_id: TripId::new("T1"), text: "Pack".to_string(), done: false });
        let reply = record(json!({ "id": "d9", "done": "TRUE", "createdAt": "2024-05-01" }));

        let row = Mutation::add(&draft).merged_row(&reply).unwrap();
        assert_eq!(row.get("done"), Some(&json!(true)));
        assert_eq!(row.created_at(), "2024-05-01");
    }

    #[test]
    fn normalize_rewrites_todo_done_to_bool() {
        let mut todo = record(json!({ "id": "t1", "text": "Pack", "done": "TRUE" }));
        todo.normalize(Resource::Todos);
        assert_eq!(todo.get("done"), Some(&json!(true)));

        let mut missing = record(json!({ "id": "t2", "text": "Visa" }));
        missing.normalize(Resource::Todos);
        assert_eq!(missing.get("done"), Some(&json!(false)));

        let mut event = record(json!({ "id": "e1", "done": "TRUE" }));
        event.normalize(Resource::Events);
        assert_eq!(event.get("done"), Some(&json!("TRUE")));
    }

    #[test]
    fn numeric_ids_render_as_text() {
        let trip = Trip::from_record(&record(json!({ "id": 42, "title": "Tokyo" }))).unwrap();
        assert_eq!(trip.id.as_str(), "42");
        assert!(Trip::from_record(&record(json!({ "title": "No id" }))).is_none());
    }

    #[test]
    fn amounts_coerce_to_zero_when_unparseable() {
        assert!((coerce_number(Some(&json!("100"))) - 100.0).abs() < f64::EPSILON);
        assert!((coerce_number(Some(&json!(12.5))) - 12.5).abs() < f64::EPSILON);
        assert!(coerce_number(Some(&json!("abc"))).abs() < f64::EPSILON);
        assert!(coerce_number(Some(&json!("NaN"))).abs() < f64::EPSILON);
        assert!(coerce_number(None).abs() < f64::EPSILON);
    }

    #[test]
    fn event_draft_uses_sheet_field_names() {
        let draft = Draft::Event(NewEvent {
            trip_id: TripId::new("T1"),
            title: "Temple".into(),
            time: "08:00".into(),
            kind: defaults::EVENT_TYPE.into(),
            location: "Kyoto".into(),
        });
        let mutation = Mutation::add(&draft);
        assert_eq!(mutation.resource, Resource::Events);
        assert_eq!(
            mutation.payload,
            json!({ "tripId": "T1", "title": "Temple", "time": "08:00", "type": "spot", "location": "Kyoto" })
        );
    }

    #[test]
    fn toggle_negates_normalized_flag() {
        let todo = Todo::from_record(&record(json!({ "id": "t1", "done": "TRUE" }))).unwrap();
        let mutation = Mutation::toggle_todo(&todo);
        assert_eq!(mutation.op, WriteOp::Update);
        assert_eq!(mutation.payload, json!({ "id": "t1", "updates": { "done": false } }));
    }

    #[test]
    fn new_trip_picks_a_known_cover() {
        let trip = NewTrip::new("Tokyo NYE", "2024-12-30");
        assert!(defaults::COVER_EMOJIS.contains(&trip.cover_emoji.as_str()));
        let payload = Draft::Trip(trip).payload();
        assert_eq!(payload["startDate"], json!("2024-12-30"));
    }
}
