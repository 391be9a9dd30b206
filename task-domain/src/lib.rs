//! Domain model for the task tracker.
//!
//! Pure state and rules: the [`Task`] entity, draft validation, the list
//! ordering, and the completion toggle. No I/O and no web types live here.

pub mod error;
pub mod ordering;
pub mod task;

pub use error::FieldError;
pub use ordering::{sort_tasks, task_order};
pub use task::{validate_title, Priority, Task, TaskDraft, TaskId, TITLE_MAX_LEN};
