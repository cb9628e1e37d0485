//! Health Check Endpoints
//!
//! - `/health` - liveness, never touches the database
//! - `/health/ready` - database connectivity check
//!
//! No authentication required for health endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{
    constants::HEALTH_STATUS_OK, db::DbClient, state::AppState, types::HealthResponse,
};

// ============================================================================
// TYPES
// ============================================================================

/// Readiness response with database details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadinessResponse {
    pub status: String,
    pub database: ComponentHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComponentHealth {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health - Process liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = HealthResponse),
    ),
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: HEALTH_STATUS_OK.to_string(),
        timestamp: Utc::now(),
    })
}

/// GET /health/ready - Readiness check (database connectivity)
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service is not ready", body = ReadinessResponse),
    ),
)]
pub async fn readiness(
    State(db): State<DbClient>,
    State(start_time): State<Instant>,
) -> impl IntoResponse {
    let database = match check_database(&db).await {
        Ok(latency) => ComponentHealth {
            healthy: true,
            latency_ms: Some(latency),
            error: None,
        },
        Err(e) => ComponentHealth {
            healthy: false,
            latency_ms: None,
            error: Some(e),
        },
    };

    let status_code = if database.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = ReadinessResponse {
        status: if database.healthy { HEALTH_STATUS_OK } else { "UNAVAILABLE" }.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
    };

    (status_code, Json(response))
}

async fn check_database(db: &DbClient) -> Result<u64, String> {
    let start = Instant::now();
    match db.health_check().await {
        Ok(()) => Ok(start.elapsed().as_millis() as u64),
        Err(e) => Err(format!("Database check failed: {}", e.message)),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/ready", get(readiness))
}
