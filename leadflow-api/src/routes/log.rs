//! Audit Log REST API Routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use leadflow_core::LogEntry;

use crate::{
    db::DbClient,
    error::{ApiResult, ErrorBody},
    extractors::JsonBody,
    state::AppState,
    types::{CreateLogRequest, LogFilter},
};

/// GET /api/logs - Log entries, newest first
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    params(LogFilter),
    responses(
        (status = 200, description = "Log entries", body = Vec<LogEntry>),
        (status = 400, description = "Invalid filter", body = ErrorBody),
    ),
)]
pub async fn list_logs(
    State(db): State<DbClient>,
    Query(filter): Query<LogFilter>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    filter.validate()?;
    Ok(Json(db.log_list(&filter).await?))
}

/// POST /api/logs - Append a log entry
#[utoipa::path(
    post,
    path = "/api/logs",
    tag = "Logs",
    request_body = CreateLogRequest,
    responses(
        (status = 201, description = "Log entry created", body = LogEntry),
        (status = 400, description = "Invalid request", body = ErrorBody),
    ),
)]
pub async fn create_log(
    State(db): State<DbClient>,
    JsonBody(req): JsonBody<CreateLogRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;
    let entry = db.log_create(&req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(list_logs).post(create_log))
}
