//! Staffdir Core - Domain Types
//!
//! Pure data structures and validation rules for the employee directory.
//! This crate holds the entity types, the dynamic-column vocabulary, and the
//! error taxonomy shared by the API layer. No I/O lives here.

pub mod columns;
pub mod entities;
pub mod enums;
pub mod error;
pub mod value;

pub use columns::{
    is_protected_column, validate_column_name, ColumnName, DEFAULT_SORT_ORDER, PROTECTED_COLUMNS,
    RECORD_TABLE,
};
pub use entities::{AdminAccount, AuditEntry, ColumnDefinition};
pub use enums::{ActionKind, DataType, Role};
pub use error::DomainError;
pub use value::{FieldValue, Record};

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Row identifier for directory entities (SERIAL / BIGSERIAL columns).
pub type RecordId = i64;
