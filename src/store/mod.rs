//! Remote store integration.
//!
//! Provides the facade over the spreadsheet-backed endpoint: the
//! `RemoteStore` seam, its HTTP client, and the record types that cross it.

/// Store trait and HTTP client
pub mod api;
/// Record and payload types
pub mod types;

// Re-export key components
pub use api::{HttpStore, RemoteStore};
pub use types::{Draft, Mutation, Record, WriteOp, WriteOutcome};
