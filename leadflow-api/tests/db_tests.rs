//! Repository tests against a live PostgreSQL with the UUID layout.
//!
//! Run with `cargo test -p leadflow-api --features db-tests`.

#![cfg(feature = "db-tests")]

#[path = "support/db.rs"]
mod test_db_support;

use leadflow_api::constants::{MSG_LEAD_HAS_DEPENDENTS, MSG_TASK_NOT_FOUND};
use leadflow_api::{
    ApiError, CreateActivityRequest, CreateLeadRequest, CreateNoteRequest,
    CreateTaskAttachmentRequest, CreateTaskCommentRequest, CreateTaskRequest, DbClient, ErrorCode,
    TaskFilter, UpdateActivityRequest, UpdateTaskRequest,
};
use leadflow_core::{Lead, Task, TaskStatus};
use leadflow_test_utils::assertions::assert_task_consistent;
use leadflow_test_utils::fixtures::{create_activity_body, create_lead_body, create_task_body};
use serde_json::json;
use test_db_support::ScratchDb;
use uuid::Uuid;

async fn create_lead(db: &DbClient, name: &str) -> Lead {
    let req: CreateLeadRequest =
        serde_json::from_value(create_lead_body(name)).expect("invalid lead body");
    db.lead_create(&req).await.expect("lead create failed")
}

async fn create_task(db: &DbClient, title: &str, lead_id: Option<Uuid>) -> Task {
    let req: CreateTaskRequest =
        serde_json::from_value(create_task_body(title, lead_id, Some("2030-02-28")))
            .expect("invalid task body");
    db.task_create(&req).await.expect("task create failed")
}

fn assert_business_rule(err: &ApiError) {
    assert_eq!(err.code, ErrorCode::BusinessRuleViolation, "{:?}", err);
    assert!(err.message.contains("possui"), "{}", err.message);
}

#[tokio::test]
async fn test_task_created_completed_is_fully_progressed() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();

    let req: CreateTaskRequest = serde_json::from_value(json!({
        "title": "Send contract",
        "status": "completed",
        "progress": 10
    }))
    .expect("invalid task body");
    let task = db.task_create(&req).await.expect("task create failed");

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress, 100);
    assert!(task.completed_at.is_some());
    assert_task_consistent(&task);

    scratch.drop().await;
}

#[tokio::test]
async fn test_status_change_tracks_completion_timestamp() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let task = create_task(&db, "Follow up", None).await;
    assert!(task.completed_at.is_none());
    assert_eq!(task.due_date.map(|d| d.to_string()).as_deref(), Some("2030-02-28"));

    let done = db
        .task_update_status(task.id, TaskStatus::Completed)
        .await
        .expect("status update failed");
    assert_eq!(done.progress, 100);
    assert!(done.completed_at.is_some());

    let reopened = db
        .task_update_status(task.id, TaskStatus::InProgress)
        .await
        .expect("status update failed");
    assert!(reopened.completed_at.is_none());
    assert_eq!(reopened.progress, 100);
    assert_task_consistent(&reopened);

    scratch.drop().await;
}

#[tokio::test]
async fn test_update_clears_due_date_with_empty_string() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let task = create_task(&db, "Quote", None).await;

    let updated = db
        .task_update(
            task.id,
            &UpdateTaskRequest {
                due_date: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .expect("task update failed");
    assert!(updated.due_date.is_none());
    assert_eq!(updated.title, "Quote");

    scratch.drop().await;
}

#[tokio::test]
async fn test_missing_task_reports_not_found() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();

    let err = db.task_get(Uuid::new_v4()).await.expect_err("task should not exist");
    assert_eq!(err.code, ErrorCode::EntityNotFound);
    assert_eq!(err.message, MSG_TASK_NOT_FOUND);

    let err = db
        .task_update_progress(Uuid::new_v4(), 50)
        .await
        .expect_err("task should not exist");
    assert_eq!(err.message, MSG_TASK_NOT_FOUND);

    scratch.drop().await;
}

#[tokio::test]
async fn test_task_with_unknown_lead_is_rejected() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();

    let req: CreateTaskRequest =
        serde_json::from_value(create_task_body("Orphan", Some(Uuid::new_v4()), None))
            .expect("invalid task body");
    let err = db.task_create(&req).await.expect_err("dangling lead accepted");
    assert_business_rule(&err);
    assert_eq!(scratch.count("tasks").await, 0);

    scratch.drop().await;
}

#[tokio::test]
async fn test_task_delete_blocked_by_activity() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let task = create_task(&db, "Demo", None).await;
    let activity: CreateActivityRequest =
        serde_json::from_value(create_activity_body("Demo call", Some(task.id)))
            .expect("invalid activity body");
    let activity = db.activity_create(&activity).await.expect("activity create failed");

    let err = db.task_delete(task.id).await.expect_err("delete should be blocked");
    assert_business_rule(&err);
    assert!(db.task_get(task.id).await.is_ok());

    db.activity_delete(activity.id).await.expect("activity delete failed");
    db.task_delete(task.id).await.expect("task delete failed");

    scratch.drop().await;
}

#[tokio::test]
async fn test_new_tasks_go_to_the_end_of_their_column() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();

    let first = create_task(&db, "First", None).await;
    let second = create_task(&db, "Second", None).await;
    let req: CreateTaskRequest =
        serde_json::from_value(json!({ "title": "Done already", "status": "completed" }))
            .expect("invalid task body");
    let done = db.task_create(&req).await.expect("task create failed");

    assert_eq!(first.status, TaskStatus::Pending);
    assert_eq!(first.sort_order, 0);
    assert_eq!(second.sort_order, 1);
    assert_eq!(done.sort_order, 0);

    scratch.drop().await;
}

#[tokio::test]
async fn test_activity_update_can_unlink_task() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let lead = create_lead(&db, "Umbrella").await;
    let task = create_task(&db, "Demo", Some(lead.id)).await;
    let activity: CreateActivityRequest =
        serde_json::from_value(create_activity_body("Demo call", Some(task.id)))
            .expect("invalid activity body");
    let activity = db.activity_create(&activity).await.expect("activity create failed");

    let linked: UpdateActivityRequest =
        serde_json::from_value(json!({ "lead_id": lead.id, "title": "Demo call (moved)" }))
            .expect("invalid update body");
    let linked = db
        .activity_update(activity.id, &linked)
        .await
        .expect("activity update failed");
    assert_eq!(linked.task_id, Some(task.id));
    assert_eq!(linked.lead_id, Some(lead.id));

    let unlink: UpdateActivityRequest =
        serde_json::from_value(json!({ "task_id": null })).expect("invalid update body");
    let unlinked = db
        .activity_update(activity.id, &unlink)
        .await
        .expect("activity update failed");
    assert_eq!(unlinked.task_id, None);
    assert_eq!(unlinked.lead_id, Some(lead.id));
    assert_eq!(unlinked.title, "Demo call (moved)");

    // Nothing references the task any more.
    db.task_delete(task.id).await.expect("task delete failed");

    scratch.drop().await;
}

#[tokio::test]
async fn test_task_delete_cascades_comments_and_attachments() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let task = create_task(&db, "Proposal", None).await;

    db.task_comment_create(
        task.id,
        &CreateTaskCommentRequest {
            comment: "Draft sent".to_string(),
            user_id: None,
        },
    )
    .await
    .expect("comment create failed");
    db.task_attachment_create(
        task.id,
        &CreateTaskAttachmentRequest {
            filename: "proposal.pdf".to_string(),
            file_url: "https://files.example.com/proposal.pdf".to_string(),
            file_size: Some(2048),
            mime_type: Some("application/pdf".to_string()),
            uploaded_by: None,
        },
    )
    .await
    .expect("attachment create failed");

    let summaries = db.task_list_with_counts().await.expect("task list failed");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].comment_count, 1);
    assert_eq!(summaries[0].attachment_count, 1);

    db.task_delete(task.id).await.expect("task delete failed");
    assert_eq!(scratch.count("task_comments").await, 0);
    assert_eq!(scratch.count("task_attachments").await, 0);

    scratch.drop().await;
}

#[tokio::test]
async fn test_attachment_delete_checks_owning_task() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let owner = create_task(&db, "Owner", None).await;
    let other = create_task(&db, "Other", None).await;
    let attachment = db
        .task_attachment_create(
            owner.id,
            &CreateTaskAttachmentRequest {
                filename: "a.txt".to_string(),
                file_url: "https://files.example.com/a.txt".to_string(),
                file_size: None,
                mime_type: None,
                uploaded_by: None,
            },
        )
        .await
        .expect("attachment create failed");

    let err = db
        .attachment_delete(attachment.id, Some(other.id))
        .await
        .expect_err("deleted through the wrong task");
    assert_eq!(err.code, ErrorCode::EntityNotFound);

    db.attachment_delete(attachment.id, Some(owner.id))
        .await
        .expect("attachment delete failed");
    assert_eq!(scratch.count("task_attachments").await, 0);

    scratch.drop().await;
}

#[tokio::test]
async fn test_lead_delete_blocked_by_task_but_not_by_notes() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let lead = create_lead(&db, "ACME").await;
    db.note_create(&CreateNoteRequest {
        lead_id: lead.id,
        content: "Prefers e-mail".to_string(),
        author: None,
    })
    .await
    .expect("note create failed");
    let task = create_task(&db, "Call back", Some(lead.id)).await;

    let err = db.lead_delete(lead.id).await.expect_err("delete should be blocked");
    assert_eq!(err.code, ErrorCode::BusinessRuleViolation);
    assert_eq!(err.message, MSG_LEAD_HAS_DEPENDENTS);

    db.task_delete(task.id).await.expect("task delete failed");
    db.lead_delete(lead.id).await.expect("lead delete failed");
    assert_eq!(scratch.count("notes").await, 0);

    scratch.drop().await;
}

#[tokio::test]
async fn test_filtered_task_list() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let lead = create_lead(&db, "Globex").await;
    create_task(&db, "Mine", Some(lead.id)).await;
    create_task(&db, "Unassigned", None).await;

    let filter: TaskFilter =
        serde_json::from_value(json!({ "lead_id": lead.id })).expect("invalid filter");
    let tasks = db.task_list_filtered(&filter).await.expect("filtered list failed");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task.title, "Mine");
    assert_eq!(tasks[0].lead_name.as_deref(), Some("Globex"));

    scratch.drop().await;
}

#[tokio::test]
async fn test_reset_empties_every_table() {
    let scratch = ScratchDb::bootstrapped().await;
    let db = scratch.db();
    let lead = create_lead(&db, "Initech").await;
    let task = create_task(&db, "Kickoff", Some(lead.id)).await;
    db.task_comment_create(
        task.id,
        &CreateTaskCommentRequest {
            comment: "ok".to_string(),
            user_id: None,
        },
    )
    .await
    .expect("comment create failed");

    db.reset_database().await.expect("reset failed");

    for table in [
        "leads",
        "tasks",
        "activities",
        "logs",
        "notes",
        "task_comments",
        "task_attachments",
    ] {
        assert_eq!(scratch.count(table).await, 0, "{} not empty", table);
    }

    scratch.drop().await;
}

#[tokio::test]
async fn test_bootstrap_refuses_integer_keys() {
    let scratch = ScratchDb::legacy().await;

    let err = scratch
        .db()
        .initialize_schema()
        .await
        .expect_err("bootstrap accepted integer keys");
    assert_eq!(err.code, ErrorCode::ServiceUnavailable);

    scratch.drop().await;
}
