use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::task::Task;

/// Total order for task listings, by key:
///
/// 1. incomplete before completed
/// 2. due date ascending, tasks without one last
/// 3. priority by its stored string value ("high" < "low" < "medium")
/// 4. newest `created_at` first
///
/// The priority key deliberately compares the stored strings, not the enum
/// declaration order.
pub fn task_order(a: &Task, b: &Task) -> Ordering {
    a.is_completed
        .cmp(&b.is_completed)
        .then_with(|| due_order(a.due_at, b.due_at))
        .then_with(|| a.priority.as_str().cmp(b.priority.as_str()))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Sorts in place. `sort_by` is stable, so tasks with identical key tuples
/// keep their incoming relative order.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(task_order);
}

fn due_order(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
