//! Administrative Routes

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use crate::{
    config::ApiConfig,
    constants::{MSG_RESET_DISABLED, MSG_RESET_OK},
    db::DbClient,
    error::{ApiError, ApiResult, ErrorBody},
    state::AppState,
    types::ResetResponse,
};

/// POST /api/reset-database - Remove every row from every table
///
/// Refused unless `LEADFLOW_ALLOW_RESET` is on (the default outside
/// production).
#[utoipa::path(
    post,
    path = "/api/reset-database",
    tag = "Admin",
    responses(
        (status = 200, description = "All tables emptied", body = ResetResponse),
        (status = 403, description = "Reset disabled in this environment", body = ErrorBody),
    ),
)]
pub async fn reset_database(
    State(db): State<DbClient>,
    State(config): State<Arc<ApiConfig>>,
) -> ApiResult<Json<ResetResponse>> {
    if !config.allow_reset {
        tracing::warn!(environment = %config.environment, "Database reset refused");
        return Err(ApiError::forbidden(MSG_RESET_DISABLED));
    }

    db.reset_database().await?;

    Ok(Json(ResetResponse {
        success: true,
        message: MSG_RESET_OK.to_string(),
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/reset-database", post(reset_database))
}
