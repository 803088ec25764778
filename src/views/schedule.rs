//! Schedule view: events in time order.

use crate::store::types::Event;
use crate::store::Record;

/// Events sorted by `time` ascending. Ties keep their incoming order.
pub fn schedule_rows(records: &[Record]) -> Vec<Event> {
    let mut events: Vec<Event> = records.iter().filter_map(Event::from_record).collect();
    events.sort_by(|a, b| a.time.cmp(&b.time));
    events
}
