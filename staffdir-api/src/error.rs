//! Error types for the staffdir API.
//!
//! Defines the structured `ApiError` response, the `ErrorCode` enum that maps
//! the domain's failure taxonomy onto HTTP status codes, and the Axum
//! `IntoResponse` implementation. All errors serialize as JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use staffdir_core::DomainError;
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// The status mapping is deliberate about the 400 family: conflicts,
/// self-modification, owner protection, and rejected no-op updates all
/// surface as plain bad requests, matching the admin console's inline
/// error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authorization boundary (401, 403)
    // ========================================================================
    /// Request lacks valid session credentials
    Unauthorized,

    /// Request is authenticated but the caller is not an owner
    Forbidden,

    /// Session token is invalid or malformed
    InvalidToken,

    /// Session token has expired
    TokenExpired,

    // ========================================================================
    // User-correctable input errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Required field is missing from request
    MissingField,

    /// Field format is incorrect
    InvalidFormat,

    /// Attempt to create a column under a reserved name
    ReservedName,

    /// Attempt to drop or reconfigure a protected column
    ProtectedColumn,

    /// Uniqueness violation (duplicate column or username)
    Conflict,

    /// Update carried no effective changes
    NoUpdates,

    /// Caller attempted to mutate their own account
    SelfModification,

    /// Target account carries the owner role and cannot be deleted
    OwnerProtected,

    // ========================================================================
    // Not found (404)
    // ========================================================================
    /// Referenced entity does not exist
    NotFound,

    // ========================================================================
    // Server errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            ErrorCode::ValidationFailed
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat
            | ErrorCode::ReservedName
            | ErrorCode::ProtectedColumn
            | ErrorCode::Conflict
            | ErrorCode::NoUpdates
            | ErrorCode::SelfModification
            | ErrorCode::OwnerProtected => StatusCode::BAD_REQUEST,

            ErrorCode::NotFound => StatusCode::NOT_FOUND,

            ErrorCode::ConnectionPoolExhausted => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::Forbidden => "Owner access required",
            ErrorCode::InvalidToken => "Invalid session token",
            ErrorCode::TokenExpired => "Session token has expired",
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::ReservedName => "This column name is reserved",
            ErrorCode::ProtectedColumn => "This column cannot be modified",
            ErrorCode::Conflict => "Entity already exists",
            ErrorCode::NoUpdates => "No fields to update",
            ErrorCode::SelfModification => "You cannot modify your own account",
            ErrorCode::OwnerProtected => "Owner accounts cannot be deleted",
            ErrorCode::NotFound => "Entity not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ConnectionPoolExhausted => "Connection pool exhausted",
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

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn reserved_name(name: &str) -> Self {
        Self::new(
            ErrorCode::ReservedName,
            format!("Column name '{}' is reserved", name),
        )
    }

    pub fn protected_column(name: &str) -> Self {
        Self::new(
            ErrorCode::ProtectedColumn,
            format!("Column '{}' is protected and cannot be modified", name),
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn no_updates() -> Self {
        Self::from_code(ErrorCode::NoUpdates)
    }

    pub fn self_modification() -> Self {
        Self::from_code(ErrorCode::SelfModification)
    }

    pub fn owner_protected() -> Self {
        Self::from_code(ErrorCode::OwnerProtected)
    }

    pub fn not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} {} not found", entity_type, id),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
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
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidValue { .. } => {
                ApiError::new(ErrorCode::ValidationFailed, err.to_string())
            }
            DomainError::ReservedName { name } => ApiError::reserved_name(&name),
            DomainError::ProtectedColumn { name } => ApiError::protected_column(&name),
        }
    }
}

/// Convert from tokio_postgres::Error to ApiError.
///
/// The storage engine's message goes to the log; the caller gets a generic
/// database error so internals never leak into responses.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        ApiError::database_error("Database operation failed")
    }
}

/// Convert from deadpool_postgres::PoolError to ApiError.
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::database_error("Database connection pool is closed")
            }
            _ => ApiError::database_error("Failed to acquire database connection"),
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::validation_failed(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_guardrail_codes_map_to_bad_request() {
        // The admin console renders these inline; they are all 400s, not 409s
        for code in [
            ErrorCode::Conflict,
            ErrorCode::ReservedName,
            ErrorCode::ProtectedColumn,
            ErrorCode::NoUpdates,
            ErrorCode::SelfModification,
            ErrorCode::OwnerProtected,
        ] {
            assert_eq!(code.status_code(), StatusCode::BAD_REQUEST, "{:?}", code);
        }
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::unauthorized("Invalid credentials");
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.message, "Invalid credentials");

        let err = ApiError::not_found("Employee", 123);
        assert!(err.message.contains("Employee"));
        assert!(err.message.contains("123"));

        let err = ApiError::reserved_name("id");
        assert_eq!(err.code, ErrorCode::ReservedName);
        assert!(err.message.contains("id"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: ApiError = DomainError::ProtectedColumn {
            name: "full_name".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ProtectedColumn);

        let err: ApiError = DomainError::InvalidValue {
            field: "column_name".to_string(),
            reason: "bad".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::unauthorized("Invalid token");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("UNAUTHORIZED"));
        assert!(json.contains("Invalid token"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
