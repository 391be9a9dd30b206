use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use task_domain::{sort_tasks, Priority, Task, TaskId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

/// SQLite-backed task store. Every operation is a single statement, so a
/// failed write leaves no partial state behind.
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: String,
    is_completed: bool,
    priority: String,
    due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, StoreError> {
        let priority = Priority::parse(&row.priority).ok_or_else(|| StoreError::CorruptRow {
            id: row.id.clone(),
            reason: format!("unknown priority {:?}", row.priority),
        })?;
        Ok(Task {
            id: TaskId::from_string(row.id),
            title: row.title,
            description: row.description,
            is_completed: row.is_completed,
            priority,
            due_at: row.due_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters for the administrative listing. All optional and combined with AND.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct TaskFilter {
    /// Case-insensitive substring over title and description.
    pub q: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl TaskStore {
    /// Connects and creates the schema if it is not there yet.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new().max_connections(5).connect(url).await?;
        Self::init_schema(pool).await
    }

    /// In-memory store for tests and local experiments. Pinned to a single
    /// connection that never expires: an idle-closed connection would drop
    /// the whole database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::init_schema(pool).await
    }

    async fn init_schema(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                 id           TEXT PRIMARY KEY,
                 title        TEXT NOT NULL,
                 description  TEXT NOT NULL DEFAULT '',
                 is_completed INTEGER NOT NULL DEFAULT 0,
                 priority     TEXT NOT NULL DEFAULT 'medium',
                 due_at       TEXT,
                 created_at   TEXT NOT NULL,
                 updated_at   TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    /// All tasks in listing order. The order is computed here rather than in
    /// SQL so the nulls-last and priority-string rules live in one place.
    pub async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks")
            .fetch_all(&self.pool)
            .await?;
        let mut tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    /// Listing-order tasks restricted by the admin filters.
    pub async fn search(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.list().await?;
        if let Some(ref q) = filter.q {
            let q = q.to_lowercase();
            tasks.retain(|t| {
                t.title.to_lowercase().contains(&q) || t.description.to_lowercase().contains(&q)
            });
        }
        if let Some(priority) = filter.priority {
            tasks.retain(|t| t.priority == priority);
        }
        if let Some(completed) = filter.completed {
            tasks.retain(|t| t.is_completed == completed);
        }
        Ok(tasks)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    pub async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tasks
                 (id, title, description, is_completed, priority, due_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.as_str())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .bind(task.priority.as_str())
        .bind(task.due_at)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persists the current field values of an already-loaded task.
    /// Returns false when the row is gone.
    pub async fn update(&self, task: &Task) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE tasks
             SET title = ?, description = ?, is_completed = ?, priority = ?,
                 due_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .bind(task.priority.as_str())
        .bind(task.due_at)
        .bind(task.updated_at)
        .bind(task.id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. Returns false when the row did not exist, so a repeated
    /// delete of the same id reports NotFound rather than succeeding.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
