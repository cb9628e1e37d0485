//! Audit log API types

use leadflow_core::EntityId;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use crate::error::ApiResult;
use crate::validation::{ValidateNonEmpty, ValidateRange};

/// Request to append a log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateLogRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub lead_id: Option<EntityId>,
    /// Short action tag, e.g. `lead_created`
    pub action: String,
    pub description: Option<String>,
    pub user_name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<serde_json::Value>,
}

impl CreateLogRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.action.validate_non_empty("action")
    }
}

/// Query parameters of `GET /api/logs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct LogFilter {
    #[cfg_attr(feature = "openapi", param(value_type = Option<String>, format = "uuid"))]
    pub lead_id: Option<EntityId>,
    pub action: Option<String>,
    /// Maximum number of entries, newest first (default 100, max 1000)
    pub limit: Option<i64>,
}

impl LogFilter {
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(limit) = self.limit {
            limit.validate_range("limit", 1, MAX_LOG_LIMIT)?;
        }
        Ok(())
    }

    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LOG_LIMIT)
    }
}
