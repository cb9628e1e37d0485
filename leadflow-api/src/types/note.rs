//! Note-related API types

use leadflow_core::EntityId;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::validation::ValidateNonEmpty;

/// Request to create a note on a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateNoteRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub lead_id: EntityId,
    pub content: String,
    pub author: Option<String>,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.content.validate_non_empty("content")
    }
}
