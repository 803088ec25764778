//! View models.
//!
//! Each view turns the records held by its synchronizer into typed rows and
//! applies its own ordering or aggregation on top of the default order.

pub mod expenses;
pub mod schedule;
pub mod todos;
pub mod trips;

pub use expenses::{expense_rows, format_amount, total};
pub use schedule::schedule_rows;
pub use todos::{progress, todo_rows};
pub use trips::trip_rows;
