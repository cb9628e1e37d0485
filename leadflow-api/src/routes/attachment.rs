//! Attachment REST API Routes
//!
//! Cross-task attachment listing. Creation goes through
//! `/api/tasks/:id/attachments`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use leadflow_core::AttachmentSummary;

use crate::{
    db::DbClient,
    error::{ApiResult, ErrorBody},
    extractors::PathId,
    state::AppState,
};

/// GET /api/attachments - Every attachment with the title of its task
#[utoipa::path(
    get,
    path = "/api/attachments",
    tag = "Attachments",
    responses(
        (status = 200, description = "List of attachments", body = Vec<AttachmentSummary>),
    ),
)]
pub async fn list_attachments(
    State(db): State<DbClient>,
) -> ApiResult<Json<Vec<AttachmentSummary>>> {
    Ok(Json(db.attachment_list_all().await?))
}

/// DELETE /api/attachments/:id - Delete an attachment
#[utoipa::path(
    delete,
    path = "/api/attachments/{id}",
    tag = "Attachments",
    params(("id" = uuid::Uuid, Path, description = "Attachment id")),
    responses(
        (status = 204, description = "Attachment deleted"),
        (status = 404, description = "Attachment not found", body = ErrorBody),
    ),
)]
pub async fn delete_attachment(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    db.attachment_delete(id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_attachments))
        .route("/:id", delete(delete_attachment))
}
