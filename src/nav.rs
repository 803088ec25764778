//! Navigation state machine.
//!
//! Decides which view is live: the trip list, or one tab of a selected trip.
//! Transitions never look at data-loading state.

use crate::types::{Resource, Tab, TripId};

/// Where the user is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Trip list.
    #[default]
    NoTripSelected,
    /// Inside a trip, looking at one tab.
    TripSelected {
        /// Selected trip.
        trip: TripId,
        /// Active tab.
        tab: Tab,
    },
}

impl Navigation {
    /// Enter a trip. Always lands on the schedule tab.
    ///
    /// Returns `false` (and changes nothing) if a trip is already selected.
    pub fn select_trip(&mut self, trip: TripId) -> bool {
        match self {
            Self::NoTripSelected => {
                tracing::info!(%trip, "trip selected");
                *self = Self::TripSelected { trip, tab: Tab::Schedule };
                true
            }
            Self::TripSelected { .. } => false,
        }
    }

    /// Switch tabs within the selected trip.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        match self {
            Self::TripSelected { tab: active, .. } => {
                *active = tab;
                true
            }
            Self::NoTripSelected => false,
        }
    }

    /// Move to the next tab in display order.
    pub fn next_tab(&mut self) -> bool {
        self.tab().is_some_and(|tab| self.select_tab(tab.next()))
    }

    /// Move to the previous tab in display order.
    pub fn prev_tab(&mut self) -> bool {
        self.tab().is_some_and(|tab| self.select_tab(tab.prev()))
    }

    /// Leave the trip. The active tab is forgotten.
    pub fn back(&mut self) -> bool {
        match self {
            Self::TripSelected { .. } => {
                *self = Self::NoTripSelected;
                true
            }
            Self::NoTripSelected => false,
        }
    }

    /// Selected trip, if any.
    pub const fn trip(&self) -> Option<&TripId> {
        match self {
            Self::TripSelected { trip, .. } => Some(trip),
            Self::NoTripSelected => None,
        }
    }

    /// Active tab, if a trip is selected.
    pub const fn tab(&self) -> Option<Tab> {
        match self {
            Self::TripSelected { tab, .. } => Some(*tab),
            Self::NoTripSelected => None,
        }
    }

    /// The collection that should be live in this state, with its scope.
    ///
    /// `None` for the bookings placeholder.
    pub const fn live_resource(&self) -> Option<(Resource, Option<&TripId>)> {
        match self {
            Self::NoTripSelected => Some((Resource::Trips, None)),
            Self::TripSelected { trip, tab } => match tab.resource() {
                Some(resource) => Some((resource, Some(trip))),
                None => None,
            },
        }
    }
}
