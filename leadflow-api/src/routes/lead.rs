//! Lead REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use leadflow_core::{Lead, Note};

use crate::{
    db::DbClient,
    error::{ApiResult, ErrorBody},
    extractors::{JsonBody, PathId},
    state::AppState,
    types::{CreateLeadRequest, UpdateLeadRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/leads - List all leads, newest first
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    responses(
        (status = 200, description = "List of leads", body = Vec<Lead>),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
)]
pub async fn list_leads(State(db): State<DbClient>) -> ApiResult<Json<Vec<Lead>>> {
    Ok(Json(db.lead_list().await?))
}

/// POST /api/leads - Create a new lead
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created successfully", body = Lead),
        (status = 400, description = "Invalid request", body = ErrorBody),
    ),
)]
pub async fn create_lead(
    State(db): State<DbClient>,
    JsonBody(req): JsonBody<CreateLeadRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let lead = db.lead_create(&req).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /api/leads/:id - Get a lead by id
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = uuid::Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead details", body = Lead),
        (status = 404, description = "Lead not found", body = ErrorBody),
    ),
)]
pub async fn get_lead(State(db): State<DbClient>, PathId(id): PathId) -> ApiResult<Json<Lead>> {
    Ok(Json(db.lead_get(id).await?))
}

/// PUT /api/leads/:id - Update the given fields of a lead
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = uuid::Uuid, Path, description = "Lead id")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated successfully", body = Lead),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Lead not found", body = ErrorBody),
    ),
)]
pub async fn update_lead(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateLeadRequest>,
) -> ApiResult<Json<Lead>> {
    req.validate()?;
    Ok(Json(db.lead_update(id, &req).await?))
}

/// DELETE /api/leads/:id - Delete a lead
///
/// Notes go with the lead; tasks, activities and logs block the delete.
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = uuid::Uuid, Path, description = "Lead id")),
    responses(
        (status = 204, description = "Lead deleted successfully"),
        (status = 400, description = "Lead still has dependent records", body = ErrorBody),
        (status = 404, description = "Lead not found", body = ErrorBody),
    ),
)]
pub async fn delete_lead(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    db.lead_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/leads/:id/notes - Notes of a lead, newest first
#[utoipa::path(
    get,
    path = "/api/leads/{id}/notes",
    tag = "Leads",
    params(("id" = uuid::Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Notes of the lead", body = Vec<Note>),
        (status = 400, description = "Invalid id", body = ErrorBody),
    ),
)]
pub async fn list_lead_notes(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(db.note_list_by_lead(id).await?))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leads).post(create_lead))
        .route("/:id", get(get_lead).put(update_lead).delete(delete_lead))
        .route("/:id/notes", get(list_lead_notes))
}
