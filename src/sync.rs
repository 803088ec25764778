//! Resource synchronizer.
//!
//! A `Synchronizer` holds one collection for as long as its view is live.
//! The owner feeds it the current `(resource, scope, token)` on every pass;
//! when that key changes it hands back a [`ReadTicket`] describing exactly one
//! read to perform. Results come back through [`Synchronizer::complete`] and
//! are accepted only if their generation is the latest one issued, so a slow
//! stale read can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::store::Record;
use crate::types::{Resource, TripId};

/// Generations are unique across all synchronizers, so a result addressed to
/// a dropped-and-recreated view can't be mistaken for a current one.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// The inputs whose change triggers a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncKey {
    pub resource: Resource,
    pub scope: Option<TripId>,
    pub token: u64,
}

/// A read the owner must perform and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTicket {
    pub resource: Resource,
    pub scope: Option<TripId>,
    pub generation: u64,
}

/// One live, reloadable collection.
#[derive(Debug, Default)]
pub struct Synchronizer {
    key: Option<SyncKey>,
    latest: Option<u64>,
    records: Vec<Record>,
    loading: bool,
}

impl Synchronizer {
    /// A fresh, inactive synchronizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the synchronizer up to date with its inputs.
    ///
    /// Returns a ticket when a read must be issued, `None` when the key is
    /// unchanged or the resource needs a scope that wasn't given.
    pub fn sync(&mut self, resource: Resource, scope: Option<&TripId>, token: u64) -> Option<ReadTicket> {
        let key = SyncKey { resource, scope: scope.cloned(), token };
        if self.key.as_ref() == Some(&key) {
            return None;
        }

        // A different collection: never show the old one under the new key.
        let same_collection = self
            .key
            .as_ref()
            .is_some_and(|k| k.resource == key.resource && k.scope == key.scope);
        if !same_collection {
            self.records.clear();
        }
        self.key = Some(key);

        if resource.requires_scope() && scope.is_none() {
            tracing::debug!(%resource, "no scope, skipping read");
            self.latest = None;
            self.records.clear();
            self.loading = false;
            return None;
        }

        Some(self.issue(resource, scope.cloned()))
    }

    fn issue(&mut self, resource: Resource, scope: Option<TripId>) -> ReadTicket {
        let generation = next_generation();
        self.latest = Some(generation);
        self.loading = true;
        tracing::trace!(%resource, generation, "read issued");
        ReadTicket { resource, scope, generation }
    }

    /// Accept the result of a read. Returns `false` if it was stale and dropped.
    pub fn complete(&mut self, generation: u64, mut records: Vec<Record>) -> bool {
        if self.latest != Some(generation) {
            tracing::debug!(generation, latest = ?self.latest, "discarding stale read");
            return false;
        }
        sort_default(&mut records);
        self.records = records;
        self.loading = false;
        true
    }

    /// Fold a record echoed by a write into the held collection.
    ///
    /// Replaces the row with the same id or inserts it. Under a trip scope
    /// the record must name that trip in `tripId`. Returns whether the
    /// collection changed.
    pub fn merge(&mut self, record: Record) -> bool {
        let Some(key) = &self.key else {
            return false;
        };
        let Some(id) = record.id() else {
            return false;
        };
        if let Some(scope) = &key.scope {
            if record.text("tripId").as_deref() != Some(scope.as_str()) {
                tracing::debug!(%scope, "echoed record belongs elsewhere, not merged");
                return false;
            }
        }

        match self.records.iter_mut().find(|r| r.id().as_ref() == Some(&id)) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        sort_default(&mut self.records);
        true
    }

    /// Currently held collection.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Whether the latest issued read is still outstanding.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Resource being tracked, if active.
    pub fn resource(&self) -> Option<Resource> {
        self.key.as_ref().map(|k| k.resource)
    }
}

/// Default ordering: `createdAt` descending, missing values last.
pub fn sort_default(records: &mut [Record]) {
    records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    fn rec(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn trip() -> TripId {
        TripId::new("T1")
    }

    #[test]
    fn scoped_resource_without_scope_never_reads() {
        for resource in Resource::all().iter().filter(|r| r.requires_scope()) {
            let mut sync = Synchronizer::new();
            assert!(sync.sync(*resource, None, 0).is_none());
            assert!(sync.records().is_empty());
            assert!(!sync.is_loading());
            assert!(sync.sync(*resource, None, 1).is_none());
        }
    }

    #[test]
    fn trips_read_without_scope() {
        let mut sync = Synchronizer::new();
        let ticket = sync.sync(Resource::Trips, None, 0).unwrap();
        assert_eq!(ticket.resource, Resource::Trips);
        assert_eq!(ticket.scope, None);
        assert!(sync.is_loading());
    }

    #[test]
    fn unchanged_key_does_not_read_again() {
        let mut sync = Synchronizer::new();
        assert!(sync.sync(Resource::Events, Some(&trip()), 0).is_some());
        assert!(sync.sync(Resource::Events, Some(&trip()), 0).is_none());
        assert!(sync.sync(Resource::Events, Some(&trip()), 0).is_none());
    }

    #[test]
    fn each_token_change_issues_exactly_one_read() {
        let mut sync = Synchronizer::new();
        let mut reads = 0;
        for token in [0, 0, 1, 1, 1, 2, 3, 3] {
            if sync.sync(Resource::Events, Some(&trip()), token).is_some() {
                reads += 1;
            }
        }
        assert_eq!(reads, 4);
    }

    #[test]
    fn completion_sorts_by_created_at_descending() {
        let mut sync = Synchronizer::new();
        let ticket = sync.sync(Resource::Trips, None, 0).unwrap();
        let rows = vec![
            rec(json!({ "id": "a", "createdAt": "2024-01-01" })),
            rec(json!({ "id": "b", "createdAt": "2024-03-01" })),
            rec(json!({ "id": "c", "createdAt": "" })),
        ];
        assert!(sync.complete(ticket.generation, rows));
        let order: Vec<_> = sync.records().iter().map(Record::created_at).collect();
        assert_eq!(order, vec!["2024-03-01", "2024-01-01", ""]);
        assert!(!sync.is_loading());
    }

    #[test]
    fn missing_created_at_sorts_last() {
        let mut rows = vec![rec(json!({ "id": "x" })), rec(json!({ "id": "y", "createdAt": "2023-05-05" }))];
        sort_default(&mut rows);
        assert_eq!(rows[0].id().unwrap().as_str(), "y");
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut sync = Synchronizer::new();
        let first = sync.sync(Resource::Events, Some(&trip()), 0).unwrap();
        let second = sync.sync(Resource::Events, Some(&trip()), 1).unwrap();

        assert!(sync.complete(second.generation, vec![rec(json!({ "id": "new" }))]));
        assert!(!sync.complete(first.generation, vec![rec(json!({ "id": "old" }))]));
        assert_eq!(sync.records()[0].id().unwrap().as_str(), "new");
    }

    #[test]
    fn ticket_carries_the_synced_key() {
        let mut sync = Synchronizer::new();
        let ticket = sync.sync(Resource::Expenses, Some(&trip()), 3).unwrap();
        assert_eq!(ticket.resource, Resource::Expenses);
        assert_eq!(ticket.scope, Some(trip()));
    }

    #[test]
    fn unscoped_merge_accepts_rows_without_trip() {
        let mut sync = Synchronizer::new();
        let t = sync.sync(Resource::Trips, None, 0).unwrap();
        sync.complete(t.generation, Vec::new());
        assert!(sync.merge(rec(json!({ "id": "T9", "title": "Lisbon" }))));
    }

    #[test]
    fn loading_stays_until_latest_read_lands() {
        let mut sync = Synchronizer::new();
        let first = sync.sync(Resource::Todos, Some(&trip()), 0).unwrap();
        let _second = sync.sync(Resource::Todos, Some(&trip()), 1).unwrap();
        sync.complete(first.generation, Vec::new());
        assert!(sync.is_loading());
    }

    #[test]
    fn switching_collection_drops_held_rows() {
        let mut sync = Synchronizer::new();
        let t = sync.sync(Resource::Events, Some(&trip()), 0).unwrap();
        sync.complete(t.generation, vec![rec(json!({ "id": "e1" }))]);

        // Token-only change keeps rows visible while reloading.
        sync.sync(Resource::Events, Some(&trip()), 1);
        assert_eq!(sync.records().len(), 1);

        sync.sync(Resource::Expenses, Some(&trip()), 0);
        assert!(sync.records().is_empty());
    }

    #[test]
    fn merge_inserts_or_replaces_by_id() {
        let mut sync = Synchronizer::new();
        let t = sync.sync(Resource::Events, Some(&trip()), 0).unwrap();
        sync.complete(t.generation, vec![rec(json!({ "id": "e1", "title": "Old", "tripId": "T1" }))]);

        assert!(sync.merge(rec(json!({ "id": "e1", "title": "New", "tripId": "T1" }))));
        assert!(sync.merge(rec(json!({ "id": "e2", "title": "Temple", "tripId": "T1" }))));
        assert!(!sync.merge(rec(json!({ "id": "e3", "tripId": "T2" }))));
        assert!(!sync.merge(rec(json!({ "title": "no id" }))));
        assert!(!sync.merge(rec(json!({ "id": "m1", "status": "success" }))));

        assert_eq!(sync.records().len(), 2);
        assert!(sync.records().iter().any(|r| r.text("title").as_deref() == Some("New")));
    }

    #[test]
    fn token_bump_keeps_rows_until_the_new_read_lands() {
        let mut sync = Synchronizer::new();
        let first = sync.sync(Resource::Trips, None, 0).unwrap();
        sync.complete(first.generation, vec![rec(json!({ "id": "a", "createdAt": "2024-01-01" }))]);

        let again = sync.sync(Resource::Trips, None, 1).unwrap();
        assert_ne!(first.generation, again.generation);
        assert_eq!(sync.records().len(), 1);
        assert!(sync.is_loading());
        assert!(!sync.complete(first.generation, Vec::new()));
    }
}
