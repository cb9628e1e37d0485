//! Error types for LeadFlow domain operations

use thiserror::Error;
use uuid::Uuid;

/// Input validation errors raised at the request boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid date for {field}: {value}")]
    InvalidDate { field: String, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },
}

/// Business-rule and lookup failures raised by the data access layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// The entity still owns rows that are not removed by cascade.
    #[error("{entity} {id} has {count} dependent {dependents}")]
    HasDependents {
        entity: &'static str,
        id: Uuid,
        dependents: &'static str,
        count: i64,
    },

    #[error("Referenced {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: Uuid },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::OutOfRange {
            field: "progress".to_string(),
            min: 0,
            max: 100,
            value: 140,
        };
        assert_eq!(err.to_string(), "progress must be between 0 and 100, got 140");
    }

    #[test]
    fn test_domain_error_wraps_validation() {
        let err: DomainError = ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        }
        .into();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().contains("title"));
    }
}
