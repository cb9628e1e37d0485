//! UUID path extractors.
//!
//! `axum::extract::Path<Uuid>` rejects malformed ids with a plain-text body.
//! These wrappers reject with an `ApiError` instead, so a bad id in the URL
//! looks like every other 400 the API returns.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use leadflow_core::EntityId;

use crate::error::ApiError;

/// Extractor for a single entity id from the path.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_lead(
///     State(db): State<DbClient>,
///     PathId(id): PathId,
/// ) -> ApiResult<Json<Lead>> {
///     Ok(Json(db.lead_get(id).await?))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub EntityId);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<EntityId> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(path = %parts.uri.path(), error = %e, "Invalid id in path");
                ApiError::invalid_format("id", "um UUID válido")
            })?;
        Ok(PathId(id))
    }
}

/// Extractor for two entity ids, e.g. `/tasks/:task_id/attachments/:id`.
#[derive(Debug, Clone, Copy)]
pub struct PathIds(pub EntityId, pub EntityId);

#[async_trait]
impl<S> FromRequestParts<S> for PathIds
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)): Path<(EntityId, EntityId)> =
            Path::from_request_parts(parts, state).await.map_err(|e| {
                tracing::debug!(path = %parts.uri.path(), error = %e, "Invalid ids in path");
                ApiError::invalid_format("id", "um UUID válido")
            })?;
        Ok(PathIds(first, second))
    }
}
