//! Request validation helpers shared by the request types in [`crate::types`].
//!
//! Field names passed in here end up in the error message returned to the
//! web client, so they use the client's spelling (`sortOrder`, `file_url`).

use crate::error::{ApiError, ApiResult};

/// Required text fields. Whitespace-only input counts as missing.
pub trait ValidateNonEmpty {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

/// `None` is missing too; callers that treat absence as "unchanged" check
/// `is_some()` first.
impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Inclusive numeric bounds (log limits, kanban positions).
pub trait ValidateRange: Sized {
    fn validate_range(&self, field_name: &str, min: Self, max: Self) -> ApiResult<()>;
}

macro_rules! impl_validate_range {
    ($($t:ty),*) => {
        $(
            impl ValidateRange for $t {
                fn validate_range(&self, field_name: &str, min: Self, max: Self) -> ApiResult<()> {
                    if *self < min || *self > max {
                        return Err(ApiError::invalid_range(field_name, min as i64, max as i64));
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_validate_range!(i32, i64);

/// Partial-update requests. An update that sets nothing is rejected rather
/// than silently bumping `updated_at`.
pub trait HasUpdates {
    fn has_any_updates(&self) -> bool;

    fn validate_has_updates(&self) -> ApiResult<()> {
        if !self.has_any_updates() {
            return Err(ApiError::validation_failed(
                "Informe ao menos um campo para atualizar",
            ));
        }
        Ok(())
    }
}
