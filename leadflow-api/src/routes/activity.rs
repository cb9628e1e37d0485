//! Activity REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use leadflow_core::Activity;

use crate::{
    db::DbClient,
    error::{ApiResult, ErrorBody},
    extractors::{JsonBody, PathId},
    state::AppState,
    types::{CreateActivityRequest, UpdateActivityRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/activities - Activities, soonest scheduled first
#[utoipa::path(
    get,
    path = "/api/activities",
    tag = "Activities",
    responses(
        (status = 200, description = "List of activities", body = Vec<Activity>),
    ),
)]
pub async fn list_activities(State(db): State<DbClient>) -> ApiResult<Json<Vec<Activity>>> {
    Ok(Json(db.activity_list().await?))
}

/// POST /api/activities - Schedule an activity
#[utoipa::path(
    post,
    path = "/api/activities",
    tag = "Activities",
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity created", body = Activity),
        (status = 400, description = "Invalid request", body = ErrorBody),
    ),
)]
pub async fn create_activity(
    State(db): State<DbClient>,
    JsonBody(req): JsonBody<CreateActivityRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let activity = db.activity_create(&req).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// PUT /api/activities/:id - Update the given fields of an activity
#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    tag = "Activities",
    params(("id" = uuid::Uuid, Path, description = "Activity id")),
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Activity updated", body = Activity),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Activity not found", body = ErrorBody),
    ),
)]
pub async fn update_activity(
    State(db): State<DbClient>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateActivityRequest>,
) -> ApiResult<Json<Activity>> {
    req.validate()?;
    Ok(Json(db.activity_update(id, &req).await?))
}

/// DELETE /api/activities/:id - Delete an activity
#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    tag = "Activities",
    params(("id" = uuid::Uuid, Path, description = "Activity id")),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 404, description = "Activity not found", body = ErrorBody),
    ),
)]
pub async fn delete_activity(
    State(db): State<DbClient>,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    db.activity_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_activities).post(create_activity))
        .route("/:id", put(update_activity).delete(delete_activity))
}
