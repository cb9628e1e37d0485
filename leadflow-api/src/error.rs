//! Error Types for LeadFlow API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct carrying a code and a client-facing message
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation producing `{"error": "..."}` bodies
//!
//! Client-facing messages are in Portuguese, matching the web client.
//! Server errors never leak details to the client; they are logged instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leadflow_core::{DomainError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_postgres::error::SqlState;

use crate::constants::{
    MSG_BUSINESS_RULE_REFERENCE, MSG_INTERNAL_ERROR, MSG_INVALID_DUE_DATE, MSG_SERVICE_UNAVAILABLE,
    MSG_TASK_NOT_FOUND,
};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Required field is missing from request
    MissingField,

    /// Field value is out of valid range
    InvalidRange,

    /// Field format is incorrect (dates, UUIDs, enums)
    InvalidFormat,

    /// Operation violates a referential or business rule
    BusinessRuleViolation,

    // ========================================================================
    // Authorization (403)
    // ========================================================================
    /// Operation disabled by configuration
    Forbidden,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange
            | ErrorCode::InvalidFormat
            | ErrorCode::BusinessRuleViolation => StatusCode::BAD_REQUEST,

            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the client for server-side failures.
    fn public_message(&self) -> &'static str {
        match self {
            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                MSG_SERVICE_UNAVAILABLE
            }
            _ => MSG_INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Error returned by every handler and by the data access layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable message. Sent to the client only for 4xx errors.
    pub message: String,
}

/// Wire format of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Body sent to the client.
    pub fn body(&self) -> ErrorBody {
        let status = self.status_code();
        let error = if status.is_server_error() {
            self.code.public_message().to_string()
        } else {
            self.message.clone()
        };
        ErrorBody { error }
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Campo obrigatório ausente: {}", field),
        )
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("O campo '{}' deve estar entre {} e {}", field, min, max),
        )
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("O campo '{}' tem formato inválido, esperado {}", field, expected),
        )
    }

    /// The due date could not be parsed or was rejected by the database.
    pub fn invalid_due_date() -> Self {
        Self::new(ErrorCode::InvalidFormat, MSG_INVALID_DUE_DATE)
    }

    /// Create a BusinessRuleViolation error.
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BusinessRuleViolation, message)
    }

    /// Create an EntityNotFound error.
    pub fn entity_not_found(entity_label: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} {} não encontrado(a)", entity_label, id),
        )
    }

    /// Tasks have a fixed not-found message the web client matches on.
    pub fn task_not_found() -> Self {
        Self::new(ErrorCode::EntityNotFound, MSG_TASK_NOT_FOUND)
    }

    /// Create a Forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a DatabaseError.
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Create a ConnectionPoolExhausted error.
    pub fn connection_pool_exhausted() -> Self {
        Self::new(
            ErrorCode::ConnectionPoolExhausted,
            "Connection pool exhausted",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM STANDARD ERRORS
// ============================================================================

/// Convert from tokio_postgres::Error to ApiError.
///
/// Date/time format errors and foreign-key violations are client errors;
/// everything else is a generic database error.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        match err.code() {
            Some(code)
                if *code == SqlState::INVALID_DATETIME_FORMAT
                    || *code == SqlState::DATETIME_FIELD_OVERFLOW =>
            {
                ApiError::invalid_due_date()
            }
            Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
                tracing::debug!("Foreign key violation: {:?}", err);
                ApiError::business_rule(MSG_BUSINESS_RULE_REFERENCE)
            }
            Some(code) if *code == SqlState::CHECK_VIOLATION => {
                ApiError::validation_failed("Valor fora das regras permitidas")
            }
            _ => {
                // Log the full error for debugging
                tracing::error!("Database error: {:?}", err);
                ApiError::database_error(format!("Database operation failed: {}", err))
            }
        }
    }
}

/// Convert from deadpool_postgres::PoolError to ApiError.
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Database connection pool is closed")
            }
            _ => ApiError::database_error("Failed to acquire database connection"),
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::validation_failed(format!("JSON inválido: {}", err))
    }
}

/// Convert from uuid::Error to ApiError.
impl From<uuid::Error> for ApiError {
    fn from(_: uuid::Error) -> Self {
        ApiError::invalid_format("id", "um UUID válido")
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidDate { ref field, .. } if field == "due_date" => {
                ApiError::invalid_due_date()
            }
            ValidationError::InvalidDate { field, .. } => {
                ApiError::invalid_format(&field, "uma data válida")
            }
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::OutOfRange { field, min, max, .. } => {
                ApiError::invalid_range(&field, min, max)
            }
            ValidationError::InvalidValue { field, reason } => {
                ApiError::validation_failed(format!("Valor inválido para '{}': {}", field, reason))
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity: "Tarefa", .. } => ApiError::task_not_found(),
            DomainError::NotFound { entity, id } => ApiError::entity_not_found(entity, id),
            DomainError::HasDependents {
                entity,
                dependents,
                count,
                ..
            } => ApiError::business_rule(format!(
                "Não é possível excluir: {} possui {} {}",
                entity.to_lowercase(),
                count,
                dependents
            )),
            DomainError::MissingReference { entity, id } => ApiError::business_rule(format!(
                "{} {} referenciado(a) não existe",
                entity, id
            )),
            DomainError::Validation(inner) => inner.into(),
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
