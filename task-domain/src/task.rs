use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::FieldError;

/// Maximum accepted title length, in characters.
pub const TITLE_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wraps an identifier that came from storage or a request path.
    /// Lookup decides whether it actually exists.
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// The wire/storage value, also the string the list ordering compares.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One to-do item. The sole aggregate; nothing owns it and it owns nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub priority: Priority,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for create and update. Constructing one through
/// [`TaskDraft::new`] is the only path, so a draft always carries a
/// non-empty title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: String,
    priority: Priority,
    due_at: Option<DateTime<Utc>>,
}

/// Checks the title rule shared by create and update: non-empty after
/// trimming, at most [`TITLE_MAX_LEN`] characters. Returns the trimmed title.
pub fn validate_title(raw: &str) -> Result<String, FieldError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(FieldError::new("title", "Title is required"));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(FieldError::new(
            "title",
            format!("Title is longer than {TITLE_MAX_LEN} characters"),
        ));
    }
    Ok(title.to_string())
}

impl TaskDraft {
    pub fn new(
        title: &str,
        description: &str,
        priority: Priority,
        due_at: Option<DateTime<Utc>>,
    ) -> Result<Self, Vec<FieldError>> {
        let title = validate_title(title).map_err(|e| vec![e])?;
        Ok(Self {
            title,
            description: description.trim().to_string(),
            priority,
            due_at,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Task {
    pub fn create(id: TaskId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            is_completed: false,
            priority: draft.priority,
            due_at: draft.due_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full update: replaces every editable field and refreshes `updated_at`.
    /// `is_completed` is not editable here; only [`Task::toggle`] changes it.
    pub fn apply(&mut self, draft: TaskDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.priority = draft.priority;
        self.due_at = draft.due_at;
        self.updated_at = now;
    }

    /// Flips the completion flag and refreshes `updated_at`.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        self.updated_at = now;
    }
}
