//! Trip list view.

use crate::store::types::Trip;
use crate::store::Record;

/// Trips in the order the synchronizer holds them (newest first).
pub fn trip_rows(records: &[Record]) -> Vec<Trip> {
    records.iter().filter_map(Trip::from_record).collect()
}
