//! Structured input capture.
//!
//! A `Form` collects the fields of one new record from key events and yields
//! either a validated [`Draft`] or an explicit cancellation. Nothing is sent
//! to the store until a draft comes out.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::constants::defaults;
use crate::store::types::{Draft, NewEvent, NewExpense, NewTodo, NewTrip};
use crate::types::TripId;

/// Result of feeding a key to a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Still editing.
    Pending,
    /// Submit rejected; the form stays open with this message.
    Invalid(String),
    /// The user gave up; no write happens.
    Cancelled,
    /// Validated payload ready to write.
    Submitted(Draft),
}

/// What the form creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    /// A new trip.
    Trip,
    /// A schedule entry for a trip.
    Event(TripId),
    /// An expense for a trip.
    Expense(TripId),
    /// A to-do for a trip.
    Todo(TripId),
}

/// One labelled text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Label shown next to the input.
    pub label: &'static str,
    /// Current text.
    pub value: String,
    /// Whether submit requires a non-blank value.
    pub required: bool,
}

impl FormField {
    fn required(label: &'static str) -> Self {
        Self { label, value: String::new(), required: true }
    }

    fn optional(label: &'static str, prefill: impl Into<String>) -> Self {
        Self { label, value: prefill.into(), required: false }
    }

    fn trimmed(&self) -> &str {
        self.value.trim()
    }
}

/// An in-progress record entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    kind: FormKind,
    fields: Vec<FormField>,
    focus: usize,
    /// Last validation message, cleared on the next edit.
    pub message: Option<String>,
}

impl Form {
    /// Form for a new trip, start date prefilled with `today`.
    pub fn new_trip(today: NaiveDate) -> Self {
        Self::with_fields(FormKind::Trip, vec![
            FormField::required("Trip name"),
            FormField::optional("Start date (YYYY-MM-DD)", today.format("%Y-%m-%d").to_string()),
        ])
    }

    /// Form for a schedule entry.
    pub fn new_event(trip: TripId) -> Self {
        Self::with_fields(FormKind::Event(trip), vec![
            FormField::required("Title"),
            FormField::optional("Time (HH:MM)", defaults::EVENT_TIME),
            FormField::optional("Location", defaults::EVENT_LOCATION),
        ])
    }

    /// Form for an expense.
    pub fn new_expense(trip: TripId) -> Self {
        Self::with_fields(FormKind::Expense(trip), vec![
            FormField::required("Amount"),
            FormField::optional("Item", ""),
        ])
    }

    /// Form for a to-do.
    pub fn new_todo(trip: TripId) -> Self {
        Self::with_fields(FormKind::Todo(trip), vec![FormField::required("To-do")])
    }

    fn with_fields(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self { kind, fields, focus: 0, message: None }
    }

    /// Modal title.
    pub const fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Trip => "New trip",
            FormKind::Event(_) => "New schedule item",
            FormKind::Expense(_) => "New expense",
            FormKind::Todo(_) => "New to-do",
        }
    }

    /// Fields in display order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Index of the focused field.
    pub const fn focus(&self) -> usize {
        self.focus
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancelled,
            KeyCode::Enter => {
                if self.focus + 1 < self.fields.len() {
                    self.focus += 1;
                } else {
                    return self.submit();
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
            }
            KeyCode::Backspace => {
                self.message = None;
                self.fields[self.focus].value.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.message = None;
                self.fields[self.focus].value.clear();
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.submit();
            }
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.message = None;
                self.fields[self.focus].value.push(c);
            }
            _ => {}
        }
        FormOutcome::Pending
    }

    /// Validate and build the draft.
    pub fn submit(&mut self) -> FormOutcome {
        if let Some(idx) = self.fields.iter().position(|f| f.required && f.trimmed().is_empty()) {
            let message = format!("{} is required", self.fields[idx].label);
            self.focus = idx;
            self.message = Some(message.clone());
            return FormOutcome::Invalid(message);
        }

        let value = |idx: usize, fallback: &str| -> String {
            let text = self.fields.get(idx).map_or("", FormField::trimmed);
            if text.is_empty() { fallback.to_string() } else { text.to_string() }
        };

        let draft = match &self.kind {
            FormKind::Trip => {
                let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
                Draft::Trip(NewTrip::new(value(0, ""), value(1, &today)))
            }
            FormKind::Event(trip) => Draft::Event(NewEvent {
                trip_id: trip.clone(),
                title: value(0, ""),
                time: value(1, defaults::EVENT_TIME),
                kind: defaults::EVENT_TYPE.to_string(),
                location: value(2, defaults::EVENT_LOCATION),
            }),
            FormKind::Expense(trip) => Draft::Expense(NewExpense {
                trip_id: trip.clone(),
                amount: value(0, ""),
                item: value(1, defaults::EXPENSE_ITEM),
                payer: defaults::EXPENSE_PAYER.to_string(),
            }),
            FormKind::Todo(trip) => Draft::Todo(NewTodo {
                trip_id: trip.clone(),
                text: value(0, ""),
                done: false,
            }),
        };
        FormOutcome::Submitted(draft)
    }
}
