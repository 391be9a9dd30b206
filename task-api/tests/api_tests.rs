use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use task_api::{app, store::TaskStore};

async fn test_app() -> (Router, TaskStore) {
    let store = TaskStore::in_memory().await.expect("in-memory store");
    (app(store.clone()), store)
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Lists tasks through the endpoint and returns the `tasks` array.
async fn list(app: &Router) -> Vec<serde_json::Value> {
    let response = app.clone().oneshot(get("/tasks")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    page["tasks"].as_array().unwrap().clone()
}

async fn create(app: &Router, body: &str) {
    let response = app.clone().oneshot(form_post("/tasks", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/tasks");
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = test_app().await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn create_then_list_contains_the_task() {
    let (app, _) = test_app().await;
    create(&app, "title=New%20task&priority=high").await;

    let tasks = list(&app).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "New task");
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["is_completed"], false);
    assert_eq!(tasks[0]["description"], "");
    assert!(tasks[0]["due_at"].is_null());
}

#[tokio::test]
async fn list_includes_a_blank_create_form() {
    let (app, _) = test_app().await;
    let response = app.oneshot(get("/tasks")).await.unwrap();
    let page = json_body(response).await;
    assert_eq!(page["form"]["title"], "");
    assert_eq!(page["form"]["priority"], "medium");
}

#[tokio::test]
async fn create_with_empty_title_rerenders_and_persists_nothing() {
    let (app, store) = test_app().await;
    let response = app
        .clone()
        .oneshot(form_post("/tasks", "title=&description=details"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["errors"][0]["field"], "title");
    assert_eq!(body["values"]["description"], "details");
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn create_with_bad_due_at_rerenders_and_persists_nothing() {
    let (app, store) = test_app().await;
    let response = app
        .clone()
        .oneshot(form_post("/tasks", "title=t&due_at=tomorrow"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["errors"][0]["field"], "due_at");
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn list_orders_incomplete_dated_undated_completed() {
    let (app, _) = test_app().await;

    // A is created first and then completed; B has a due date at high
    // priority; C has no due date at low priority. Expected order: B, C, A.
    create(&app, "title=A").await;
    let a_id = list(&app).await[0]["id"].as_str().unwrap().to_string();
    let toggle = app
        .clone()
        .oneshot(form_post(&format!("/tasks/{a_id}/toggle"), ""))
        .await
        .unwrap();
    assert_eq!(toggle.status(), StatusCode::SEE_OTHER);

    let due = (Utc::now() + Duration::hours(1)).format("%Y-%m-%dT%H:%M").to_string();
    create(&app, &format!("title=B&priority=high&due_at={due}")).await;
    create(&app, "title=C&priority=low").await;

    let titles: Vec<String> = list(&app)
        .await
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["B", "C", "A"]);
}

#[tokio::test]
async fn update_replaces_fields_and_redirects() {
    let (app, _) = test_app().await;
    create(&app, "title=Before").await;
    let id = list(&app).await[0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(form_post(
            &format!("/tasks/{id}"),
            "title=After&description=changed&priority=low",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let tasks = list(&app).await;
    assert_eq!(tasks[0]["title"], "After");
    assert_eq!(tasks[0]["description"], "changed");
    assert_eq!(tasks[0]["priority"], "low");
}

#[tokio::test]
async fn update_with_invalid_fields_leaves_the_task_untouched() {
    let (app, _) = test_app().await;
    create(&app, "title=Original").await;
    let id = list(&app).await[0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(form_post(&format!("/tasks/{id}"), "title=&priority=urgent"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["title", "priority"]);

    assert_eq!(list(&app).await[0]["title"], "Original");
}

#[tokio::test]
async fn update_of_missing_id_is_404() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(form_post("/tasks/01JABSENT0000000000000000", "title=x"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggle_flips_completion_both_ways() {
    let (app, _) = test_app().await;
    create(&app, "title=Flip").await;
    let id = list(&app).await[0]["id"].as_str().unwrap().to_string();
    let created_at = list(&app).await[0]["created_at"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(form_post(&format!("/tasks/{id}/toggle"), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let after_first = list(&app).await;
    assert_eq!(after_first[0]["is_completed"], true);

    let response = app
        .clone()
        .oneshot(form_post(&format!("/tasks/{id}/toggle"), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let after_second = list(&app).await;
    assert_eq!(after_second[0]["is_completed"], false);
    assert_eq!(after_second[0]["title"], "Flip");
    assert_eq!(after_second[0]["created_at"].as_str().unwrap(), created_at);
    let created = chrono::DateTime::parse_from_rfc3339(&created_at).unwrap();
    let updated =
        chrono::DateTime::parse_from_rfc3339(after_second[0]["updated_at"].as_str().unwrap())
            .unwrap();
    assert!(updated >= created);
}

#[tokio::test]
async fn toggle_of_missing_id_is_404() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(form_post("/tasks/01JABSENT0000000000000000/toggle", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_and_second_delete_is_404() {
    let (app, _) = test_app().await;
    create(&app, "title=Gone").await;
    let id = list(&app).await[0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(form_post(&format!("/tasks/{id}/delete"), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(list(&app).await.is_empty());

    let response = app
        .clone()
        .oneshot(form_post(&format!("/tasks/{id}/delete"), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_list_filters_by_text_priority_and_completion() {
    let (app, _) = test_app().await;
    create(&app, "title=Pay%20rent&description=bank%20transfer&priority=high").await;
    create(&app, "title=Walk%20dog&priority=low").await;
    let dog_id = list(&app)
        .await
        .iter()
        .find(|t| t["title"] == "Walk dog")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let toggle = app
        .clone()
        .oneshot(form_post(&format!("/tasks/{dog_id}/toggle"), ""))
        .await
        .unwrap();
    assert_eq!(toggle.status(), StatusCode::SEE_OTHER);

    // Substring search hits the description too.
    let response = app.clone().oneshot(get("/admin/tasks?q=transfer")).await.unwrap();
    let found = json_body(response).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Pay rent");

    let response = app.clone().oneshot(get("/admin/tasks?priority=low")).await.unwrap();
    let found = json_body(response).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Walk dog");

    let response = app.clone().oneshot(get("/admin/tasks?completed=false")).await.unwrap();
    let found = json_body(response).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Pay rent");
}
