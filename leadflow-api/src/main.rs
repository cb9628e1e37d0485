//! LeadFlow API Server Entry Point
//!
//! Bootstraps configuration, prepares the schema and starts the Axum HTTP
//! server.

use axum::Router;
use leadflow_api::telemetry::{init_tracing, TelemetryConfig};
use leadflow_api::{create_api_router, ApiConfig, ApiError, ApiResult, DbClient, DbConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;
    let api_config = ApiConfig::from_env();

    if api_config.bootstrap_schema {
        db.initialize_schema().await?;
    } else {
        tracing::info!("Schema bootstrap skipped");
    }

    let app: Router = create_api_router(db, &api_config)?;

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, environment = %api_config.environment, "Starting LeadFlow API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
