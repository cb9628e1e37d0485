//! LeadFlow API - REST Layer and Key Migration Tooling
//!
//! Axum endpoints for leads, tasks and their child records, backed by
//! PostgreSQL through a deadpool connection pool. The `migration` module
//! converts a database with integer keys to UUID keys in one transaction.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod migration;
pub mod openapi;
pub mod routes;
pub mod schema;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorBody, ErrorCode};
pub use migration::{
    MigrationError, MigrationPlan, MigrationResult, MigrationStep, Migrator, PlanKind,
};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use schema::KeyShape;
pub use state::AppState;
pub use types::*;
