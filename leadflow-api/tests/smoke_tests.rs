//! End-to-end smoke tests for the LeadFlow HTTP API

#![cfg(feature = "db-tests")]

#[path = "support/db.rs"]
mod test_db_support;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use leadflow_api::constants::MSG_RESET_OK;
use leadflow_api::{create_api_router, ApiConfig, ApiResult};
use leadflow_test_utils::fixtures::{create_activity_body, create_lead_body, create_task_body};
use serde_json::{json, Value};
use test_db_support::ScratchDb;
use tower::ServiceExt;

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn smoke_test_full_crud_chain() -> ApiResult<()> {
    let scratch = ScratchDb::bootstrapped().await;
    let router = create_api_router(scratch.db(), &ApiConfig::default())?;

    // Lead
    let (status, lead) = call(&router, Method::POST, "/api/leads", Some(create_lead_body("ACME"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lead["status"], "new");
    let lead_id = lead["id"].as_str().expect("lead id").to_string();

    // Task with a date-only due date
    let lead_uuid = lead_id.parse().ok();
    let (status, task) = call(
        &router,
        Method::POST,
        "/api/tasks",
        Some(create_task_body("Send proposal", lead_uuid, Some("2030-03-10"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["due_date"], "2030-03-10");
    assert_eq!(task["progress"], 0);
    let task_id = task["id"].as_str().expect("task id").to_string();

    // Comment and attachment
    let (status, _) = call(
        &router,
        Method::POST,
        &format!("/api/tasks/{}/comments", task_id),
        Some(json!({ "comment": "Draft ready" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, attachment) = call(
        &router,
        Method::POST,
        &format!("/api/tasks/{}/attachments", task_id),
        Some(json!({ "filename": "p.pdf", "file_url": "https://files.example.com/p.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Board view carries lead name and counts
    let (status, tasks) = call(&router, Method::GET, "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks[0]["lead_name"], "ACME");
    assert_eq!(tasks[0]["comment_count"], 1);
    assert_eq!(tasks[0]["attachment_count"], 1);

    // Kanban move to completed
    let (status, moved) = call(
        &router,
        Method::PUT,
        &format!("/api/tasks/{}/status", task_id),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["progress"], 100);
    assert!(moved["completed_at"].is_string());

    // Activity scheduled on the task blocks its deletion
    let task_uuid = task_id.parse().ok();
    let (status, activity) = call(
        &router,
        Method::POST,
        "/api/activities",
        Some(create_activity_body("Review call", task_uuid)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(&router, Method::DELETE, &format!("/api/tasks/{}", task_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("possui"));

    // Unwind
    let activity_id = activity["id"].as_str().expect("activity id");
    let (status, _) = call(&router, Method::DELETE, &format!("/api/activities/{}", activity_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let attachment_id = attachment["id"].as_str().expect("attachment id");
    let (status, _) = call(
        &router,
        Method::DELETE,
        &format!("/api/tasks/{}/attachments/{}", task_id, attachment_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&router, Method::DELETE, &format!("/api/tasks/{}", task_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&router, Method::DELETE, &format!("/api/leads/{}", lead_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&router, Method::GET, &format!("/api/leads/{}", lead_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    scratch.drop().await;
    Ok(())
}

#[tokio::test]
async fn smoke_test_reset_and_readiness() -> ApiResult<()> {
    let scratch = ScratchDb::bootstrapped().await;
    let router = create_api_router(scratch.db(), &ApiConfig::default())?;

    call(&router, Method::POST, "/api/leads", Some(create_lead_body("Globex"))).await;

    let (status, body) = call(&router, Method::POST, "/api/reset-database", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], MSG_RESET_OK);

    let (_, leads) = call(&router, Method::GET, "/api/leads", None).await;
    assert_eq!(leads, json!([]));

    let (status, ready) = call(&router, Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["database"]["healthy"], true);

    scratch.drop().await;
    Ok(())
}
