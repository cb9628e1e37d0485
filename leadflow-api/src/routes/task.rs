//! Task REST API Routes
//!
//! Board operations (status, progress and order updates) plus the comments
//! and attachments that hang off a task.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use leadflow_core::{Task, TaskAttachment, TaskComment, TaskSummary};

use crate::{
    db::DbClient,
    error::{ApiResult, ErrorBody},
    extractors::{JsonBody, PathId, PathIds},
    state::AppState,
    types::{
        CreateTaskAttachmentRequest, CreateTaskCommentRequest, CreateTaskRequest, TaskFilter,
        UpdateTaskOrderRequest, UpdateTaskProgressRequest, UpdateTaskRequest,
        UpdateTaskStatusRequest,
    },
};

// ============================================================================
// TASK HANDLERS
// ============================================================================

/// GET /api/tasks - Every task with its lead name and child counts
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    responses(
        (status = 200, description = "Tasks ordered by status column and position", body = Vec<TaskSummary>),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
)]
pub async fn list_tasks(State(db): State<DbClient>) -> ApiResult<Json<Vec<TaskSummary>>> {
    Ok(Json(db.task_list_with_counts().await?))
}

/// POST /api/tasks - Create a new task
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, description = "Invalid request or due date", body = ErrorBody),
    ),
)]
pub async fn create_task(
    State(db): State<DbClient>,
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let task = db.task_create(&req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/filtered - Tasks matching the query filters
#[utoipa::path(
    get,
    path = "/api/tasks/filtered",
    tag = "Tasks",
    params(TaskFilter),
    responses(
        (status = 200, description = "Matching tasks", body = Vec<TaskSummary>),
        (status = 400, description = "Invalid filter", body = ErrorBody),
    ),
)]
pub async fn list_tasks_filtered(
    State(db): State<DbClient>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<TaskSummary>>> {
    Ok(Json(db.task_list_filtered(&filter).await?))
}

/// PUT /api/tasks/:id - Update the given fields of a task
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 400, description = "Invalid request or due date", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
    ),
)]
pub async fn update_task(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;
    Ok(Json(db.task_update(id, &req).await?))
}

/// PUT /api/tasks/:id/status - Move a task to another column
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/status",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Task),
        (status = 404, description = "Task not found", body = ErrorBody),
    ),
)]
pub async fn update_task_status(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateTaskStatusRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(db.task_update_status(id, req.status).await?))
}

/// PUT /api/tasks/:id/progress - Set the completion percentage
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/progress",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    request_body = UpdateTaskProgressRequest,
    responses(
        (status = 200, description = "Progress updated", body = Task),
        (status = 400, description = "Progress outside 0..=100", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
    ),
)]
pub async fn update_task_progress(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateTaskProgressRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;
    Ok(Json(db.task_update_progress(id, req.progress).await?))
}

/// PUT /api/tasks/:id/order - Set the position within the column
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/order",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    request_body = UpdateTaskOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = Task),
        (status = 400, description = "Negative position", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
    ),
)]
pub async fn update_task_order(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateTaskOrderRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;
    Ok(Json(db.task_update_order(id, req.sort_order).await?))
}

/// DELETE /api/tasks/:id - Delete a task with its comments and attachments
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 400, description = "Activities still reference the task", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
    ),
)]
pub async fn delete_task(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    db.task_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// COMMENT HANDLERS
// ============================================================================

/// GET /api/tasks/:id/comments - Comments of a task, newest first
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/comments",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Comments of the task", body = Vec<TaskComment>),
    ),
)]
pub async fn list_task_comments(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<Json<Vec<TaskComment>>> {
    Ok(Json(db.task_comment_list(id).await?))
}

/// POST /api/tasks/:id/comments - Add a comment to a task
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/comments",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    request_body = CreateTaskCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = TaskComment),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
    ),
)]
pub async fn create_task_comment(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<CreateTaskCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let comment = db.task_comment_create(id, &req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// ============================================================================
// ATTACHMENT HANDLERS
// ============================================================================

/// GET /api/tasks/:id/attachments - Attachments of a task, newest first
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/attachments",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Attachments of the task", body = Vec<TaskAttachment>),
    ),
)]
pub async fn list_task_attachments(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<Json<Vec<TaskAttachment>>> {
    Ok(Json(db.task_attachment_list(id).await?))
}

/// POST /api/tasks/:id/attachments - Register a file attached to a task
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/attachments",
    tag = "Tasks",
    params(("id" = uuid::Uuid, Path, description = "Task id")),
    request_body = CreateTaskAttachmentRequest,
    responses(
        (status = 201, description = "Attachment created", body = TaskAttachment),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody),
    ),
)]
pub async fn create_task_attachment(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<CreateTaskAttachmentRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let attachment = db.task_attachment_create(id, &req).await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// DELETE /api/tasks/:task_id/attachments/:id - Delete an attachment of this task
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}/attachments/{id}",
    tag = "Tasks",
    params(
        ("task_id" = uuid::Uuid, Path, description = "Task id"),
        ("id" = uuid::Uuid, Path, description = "Attachment id"),
    ),
    responses(
        (status = 204, description = "Attachment deleted"),
        (status = 404, description = "Attachment not found on this task", body = ErrorBody),
    ),
)]
pub async fn delete_task_attachment(
    State(db): State<DbClient>,
    PathIds(task_id, id): PathIds,
) -> ApiResult<StatusCode> {
    db.attachment_delete(id, Some(task_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

// Sibling routes must share a parameter name at the same position, so the
// task segment is `:id` everywhere.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/filtered", get(list_tasks_filtered))
        .route("/:id", put(update_task).delete(delete_task))
        .route("/:id/status", put(update_task_status))
        .route("/:id/progress", put(update_task_progress))
        .route("/:id/order", put(update_task_order))
        .route(
            "/:id/comments",
            get(list_task_comments).post(create_task_comment),
        )
        .route(
            "/:id/attachments",
            get(list_task_attachments).post(create_task_attachment),
        )
        .route("/:id/attachments/:attachment_id", delete(delete_task_attachment))
}
