//! Core type definitions for compile-time safety.
//!
//! Newtype wrappers keep trip ids and record ids from being mixed up, and
//! the closed enums below name every sheet and tab the application knows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named collection in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Trip list; the only unscoped resource.
    Trips,
    /// Schedule items of one trip.
    Events,
    /// Expenses of one trip.
    Expenses,
    /// To-do items of one trip.
    Todos,
}

impl Resource {
    /// Returns all resources in a stable order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Trips, Self::Events, Self::Expenses, Self::Todos]
    }

    /// Sheet name used on the wire.
    #[must_use]
    pub const fn sheet(self) -> &'static str {
        match self {
            Self::Trips => "trips",
            Self::Events => "events",
            Self::Expenses => "expenses",
            Self::Todos => "todos",
        }
    }

    /// Whether reads and writes need a trip id.
    #[must_use]
    pub const fn requires_scope(self) -> bool {
        !matches!(self, Self::Trips)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet())
    }
}

/// Tabs available inside a selected trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Time-ordered itinerary.
    #[default]
    Schedule,
    /// Placeholder; has no data behind it.
    Bookings,
    /// Expense ledger.
    Expense,
    /// To-do checklist.
    Planning,
}

impl Tab {
    /// Returns all tabs in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Schedule, Self::Bookings, Self::Expense, Self::Planning]
    }

    /// Returns the human-readable label of this tab.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Schedule => "Schedule",
            Self::Bookings => "Bookings",
            Self::Expense => "Expenses",
            Self::Planning => "Planning",
        }
    }

    /// The resource a tab is backed by, if any.
    #[must_use]
    pub const fn resource(self) -> Option<Resource> {
        match self {
            Self::Schedule => Some(Resource::Events),
            Self::Bookings => None,
            Self::Expense => Some(Resource::Expenses),
            Self::Planning => Some(Resource::Todos),
        }
    }

    /// Position in display order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Schedule => 0,
            Self::Bookings => 1,
            Self::Expense => 2,
            Self::Planning => 3,
        }
    }

    /// Tab at a display position.
    #[must_use]
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::all().get(idx).copied()
    }

    /// Cycle to next tab (Tab key).
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Schedule => Self::Bookings,
            Self::Bookings => Self::Expense,
            Self::Expense => Self::Planning,
            Self::Planning => Self::Schedule,
        }
    }

    /// Cycle to previous tab (Shift-Tab).
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Schedule => Self::Planning,
            Self::Bookings => Self::Schedule,
            Self::Expense => Self::Bookings,
            Self::Planning => Self::Expense,
        }
    }
}

/// Remote store trip identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId(pub String);

impl TripId {
    /// Create a new `TripId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TripId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TripId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque, store-assigned identifier of any record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a new `RecordId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<RecordId> for TripId {
    fn from(id: RecordId) -> Self {
        Self(id.0)
    }
}
