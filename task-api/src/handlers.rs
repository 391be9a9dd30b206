use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Serialize;

use task_domain::{FieldError, Task, TaskId};

use crate::error::ApiError;
use crate::forms::TaskForm;
use crate::store::TaskFilter;
use crate::AppState;

/// GET /tasks response: the ordered list plus a blank create form.
#[derive(Debug, Serialize)]
pub struct TaskListPage {
    pub tasks: Vec<Task>,
    pub form: TaskForm,
}

/// Re-rendered form after a validation failure: the submitted values come
/// back untouched next to the field-level messages.
#[derive(Debug, Serialize)]
struct FormWithErrors {
    values: TaskForm,
    errors: Vec<FieldError>,
}

fn rerender(values: TaskForm, errors: Vec<FieldError>) -> Response {
    (StatusCode::OK, Json(FormWithErrors { values, errors })).into_response()
}

fn back_to_list() -> Redirect {
    Redirect::to("/tasks")
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<TaskListPage>, ApiError> {
    let tasks = state.store.list().await?;
    Ok(Json(TaskListPage {
        tasks,
        form: TaskForm::empty(),
    }))
}

pub async fn create_task(
    State(state): State<AppState>,
    Form(form): Form<TaskForm>,
) -> Result<Response, ApiError> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return Ok(rerender(form, errors)),
    };
    let task = Task::create(TaskId::new(), draft, Utc::now());
    state.store.insert(&task).await?;
    tracing::info!(id = %task.id, "task created");
    Ok(back_to_list().into_response())
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Response, ApiError> {
    let mut task = state.store.get(&id).await?.ok_or(ApiError::NotFound)?;
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => return Ok(rerender(form, errors)),
    };
    task.apply(draft, Utc::now());
    if !state.store.update(&task).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id = %task.id, "task updated");
    Ok(back_to_list().into_response())
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    if !state.store.delete(&id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(%id, "task deleted");
    Ok(back_to_list())
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let mut task = state.store.get(&id).await?.ok_or(ApiError::NotFound)?;
    task.toggle(Utc::now());
    if !state.store.update(&task).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id = %task.id, completed = task.is_completed, "task toggled");
    Ok(back_to_list())
}

/// Administrative listing: same store, same ordering, plus the search and
/// filter parameters.
pub async fn admin_list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.store.search(&filter).await?))
}
