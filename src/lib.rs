//! `Tripboard` - terminal trip planner backed by a spreadsheet web app.
//!
//! Trips, schedules, expenses and to-dos live in a remote store reached over
//! HTTP. The crate keeps each visible collection in sync with that store and
//! renders it with ratatui.

// Re-export public modules for use in integration tests and as a library
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod invalidation;
pub mod logging;
pub mod nav;
pub mod store;
pub mod sync;
pub mod types;
pub mod ui;
pub mod views;
