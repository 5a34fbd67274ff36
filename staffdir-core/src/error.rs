//! Domain error taxonomy.

use thiserror::Error;

/// Errors produced by domain-level validation.
///
/// The API layer maps these onto structured HTTP error responses; see the
/// `ErrorCode` enum in `staffdir-api`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed or missing input; user-correctable.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Attempt to create a column under a reserved name.
    #[error("Column name '{name}' is reserved")]
    ReservedName { name: String },

    /// Attempt to alter or drop a protected column.
    #[error("Column '{name}' is protected and cannot be modified")]
    ProtectedColumn { name: String },
}
