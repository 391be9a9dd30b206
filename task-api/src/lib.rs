//! HTTP layer for the task tracker.
//!
//! Thin axum wiring over `task-domain`: the handlers validate input, call
//! the store, and redirect back to the list. All ordering and state rules
//! live in the domain crate.

use axum::{
    routing::{get, post},
    Router,
};

pub mod error;
pub mod forms;
pub mod handlers;
pub mod store;

use store::TaskStore;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub store: TaskStore,
}

pub fn app(store: TaskStore) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/:id", post(handlers::update_task))
        .route("/tasks/:id/delete", post(handlers::delete_task))
        .route("/tasks/:id/toggle", post(handlers::toggle_task))
        .route("/admin/tasks", get(handlers::admin_list_tasks))
        .with_state(AppState { store })
}
