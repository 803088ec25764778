//! Reload bus.
//!
//! Mutations publish the resource they touched; every live synchronizer uses
//! its resource's counter as part of its reload key, so a publish causes
//! exactly the affected views to read again. The process-wide epoch counts
//! every publish and never goes down.

use std::collections::HashMap;

use crate::types::Resource;

/// Monotonic invalidation counters, one per resource plus a global epoch.
#[derive(Debug, Clone, Default)]
pub struct ReloadBus {
    epoch: u64,
    versions: HashMap<Resource, u64>,
}

impl ReloadBus {
    /// Create a bus with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of publishes so far.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Reload token for synchronizers tracking `resource`.
    pub fn token(&self, resource: Resource) -> u64 {
        self.versions.get(&resource).copied().unwrap_or(0)
    }

    /// Announce that `resource` was mutated. Returns the new epoch.
    pub fn publish(&mut self, resource: Resource) -> u64 {
        self.epoch += 1;
        *self.versions.entry(resource).or_default() += 1;
        tracing::debug!(%resource, epoch = self.epoch, "invalidated");
        self.epoch
    }

    /// Invalidate every resource at once.
    pub fn publish_all(&mut self) -> u64 {
        self.epoch += 1;
        for resource in Resource::all() {
            *self.versions.entry(*resource).or_default() += 1;
        }
        tracing::debug!(epoch = self.epoch, "invalidated all resources");
        self.epoch
    }
}
