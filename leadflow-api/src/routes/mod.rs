//! REST API Routes Module
//!
//! Route handlers organized by entity type, plus the router builder that
//! wires them together with CORS, request tracing and static file serving
//! for the web client.

pub mod activity;
pub mod admin;
pub mod attachment;
pub mod health;
pub mod lead;
pub mod log;
pub mod note;
pub mod task;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::db::DbClient;
use crate::error::ApiResult;
use crate::openapi::ApiDoc;
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use activity::create_router as activity_router;
pub use admin::create_router as admin_router;
pub use attachment::create_router as attachment_router;
pub use health::create_router as health_router;
pub use lead::create_router as lead_router;
pub use log::create_router as log_router;
pub use note::create_router as note_router;
pub use task::create_router as task_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Handler for /openapi.yaml endpoint.
async fn openapi_yaml() -> impl IntoResponse {
    use axum::http::StatusCode;

    match ApiDoc::to_yaml() {
        Ok(yaml) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/yaml")], yaml),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            format!("Failed to generate YAML: {}", e),
        ),
    }
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

/// Warn about configuration that is unusual for a production deployment.
fn validate_api_config_for_production(config: &ApiConfig) {
    if config.cors_origins.is_empty() {
        tracing::warn!(
            "CORS origins not configured for production - all origins are allowed.\n\
             Set LEADFLOW_CORS_ORIGINS to restrict them."
        );
    }
    if config.allow_reset {
        tracing::warn!(
            "POST /api/reset-database is enabled in production.\n\
             Unset LEADFLOW_ALLOW_RESET to disable it."
        );
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed; otherwise only the
/// listed ones.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Routes with their state applied, without the outer layers.
fn build_routes(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::create_router())
        .nest("/api/leads", lead::create_router())
        .nest("/api/tasks", task::create_router())
        .nest("/api/logs", log::create_router())
        .nest("/api/activities", activity::create_router())
        .nest("/api/notes", note::create_router())
        .nest("/api/attachments", attachment::create_router())
        .nest("/api", admin::create_router())
        .route("/openapi.json", get(openapi_json))
        .route("/openapi.yaml", get(openapi_yaml))
        .with_state(state)
}

/// Create the complete API router.
///
/// - Entity routes under `/api/*`
/// - Health checks at `/health` and `/health/ready`
/// - OpenAPI document at `/openapi.json` and `/openapi.yaml`
/// - The web client from `static_dir` for every other path, when configured
pub fn create_api_router(db: DbClient, config: &ApiConfig) -> ApiResult<Router> {
    if config.is_production() {
        validate_api_config_for_production(config);
    }

    let cors = build_cors_layer(config);
    let mut router = build_routes(AppState::new(db, config.clone()));

    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "Serving static files");
        router = router.fallback_service(ServeDir::new(dir));
    }

    Ok(router.layer(TraceLayer::new_for_http()).layer(cors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MSG_INVALID_DUE_DATE, MSG_RESET_DISABLED};
    use crate::db::DbConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    /// Router over a pool that never connects: requests rejected before
    /// touching the database still get their real responses.
    fn test_router(config: ApiConfig) -> Router {
        let db = DbClient::from_config(&DbConfig {
            port: 1,
            ..Default::default()
        })
        .expect("lazy pool");
        create_api_router(db, &config).expect("router")
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn test_health_does_not_need_database() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(test_router(ApiConfig::default()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_create_task_with_malformed_due_date() {
        let request = json_request(
            Method::POST,
            "/api/tasks",
            serde_json::json!({ "title": "Follow up", "due_date": "not-a-date" }),
        );
        let (status, body) = send(test_router(ApiConfig::default()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": MSG_INVALID_DUE_DATE }));
    }

    #[tokio::test]
    async fn test_progress_out_of_range_is_rejected() {
        let uri = format!("/api/tasks/{}/progress", uuid::Uuid::new_v4());
        let request = json_request(Method::PUT, &uri, serde_json::json!({ "progress": 150 }));
        let (status, body) = send(test_router(ApiConfig::default()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let request = Request::builder()
            .uri("/api/leads/123")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(test_router(ApiConfig::default()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_status_value_is_bad_request() {
        let request = json_request(
            Method::POST,
            "/api/leads",
            serde_json::json!({ "name": "ACME", "status": "archived" }),
        );
        let (status, _) = send(test_router(ApiConfig::default()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reset_disabled_is_forbidden() {
        let config = ApiConfig {
            allow_reset: false,
            ..Default::default()
        };
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/reset-database")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(test_router(config), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, serde_json::json!({ "error": MSG_RESET_DISABLED }));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let request = Request::builder()
            .uri("/openapi.json")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(test_router(ApiConfig::default()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/tasks"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_without_static_dir() {
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .expect("request");
        let (status, _) = send(test_router(ApiConfig::default()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
