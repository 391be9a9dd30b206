use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use task_domain::{validate_title, FieldError, Priority, TaskDraft};

/// Accepted `due_at` shapes, matching an HTML `datetime-local` input.
const DUE_AT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Raw form values exactly as submitted. Everything stays a string so a
/// failed validation can echo back what the user typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub due_at: String,
}

impl TaskForm {
    /// Blank form rendered alongside the task list.
    pub fn empty() -> Self {
        Self {
            priority: Priority::default().as_str().to_string(),
            ..Self::default()
        }
    }

    /// Validates every field and reports all failures in one pass.
    pub fn validate(&self) -> Result<TaskDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_title(&self.title) {
            errors.push(e);
        }
        let priority = match self.parse_priority() {
            Ok(p) => p,
            Err(e) => {
                errors.push(e);
                Priority::default()
            }
        };
        let due_at = match self.parse_due_at() {
            Ok(d) => d,
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        TaskDraft::new(&self.title, &self.description, priority, due_at)
    }

    /// A blank priority means the default; anything else must be a known
    /// wire value.
    fn parse_priority(&self) -> Result<Priority, FieldError> {
        let raw = self.priority.trim();
        if raw.is_empty() {
            return Ok(Priority::default());
        }
        Priority::parse(raw).ok_or_else(|| {
            FieldError::new("priority", "Select a valid priority: low, medium or high")
        })
    }

    fn parse_due_at(&self) -> Result<Option<DateTime<Utc>>, FieldError> {
        let raw = self.due_at.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        for format in DUE_AT_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Some(naive.and_utc()));
            }
        }
        Err(FieldError::new(
            "due_at",
            "Enter a valid date and time (YYYY-MM-DDTHH:MM)",
        ))
    }
}
