//! To-do checklist view.

use crate::store::types::Todo;
use crate::store::Record;

/// Todos in held order.
pub fn todo_rows(records: &[Record]) -> Vec<Todo> {
    records.iter().filter_map(Todo::from_record).collect()
}

/// `(done, total)` counts.
pub fn progress(todos: &[Todo]) -> (usize, usize) {
    (todos.iter().filter(|t| t.done).count(), todos.len())
}
