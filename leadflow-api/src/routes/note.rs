//! Note REST API Routes
//!
//! Notes of a single lead are listed under `/api/leads/:id/notes`.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use leadflow_core::Note;

use crate::{
    db::DbClient,
    error::{ApiResult, ErrorBody},
    extractors::{JsonBody, PathId},
    state::AppState,
    types::CreateNoteRequest,
};

/// GET /api/notes - Every note, newest first
#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "Notes",
    responses(
        (status = 200, description = "List of notes", body = Vec<Note>),
    ),
)]
pub async fn list_notes(State(db): State<DbClient>) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(db.note_list_all().await?))
}

/// POST /api/notes - Add a note to a lead
#[utoipa::path(
    post,
    path = "/api/notes",
    tag = "Notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Invalid request or unknown lead", body = ErrorBody),
    ),
)]
pub async fn create_note(
    State(db): State<DbClient>,
    JsonBody(req): JsonBody<CreateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let note = db.note_create(&req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// DELETE /api/notes/:id - Delete a note
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    tag = "Notes",
    params(("id" = uuid::Uuid, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found", body = ErrorBody),
    ),
)]
pub async fn delete_note(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    db.note_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/:id", delete(delete_note))
}
