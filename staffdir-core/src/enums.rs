//! Enumerations shared across the directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

// ============================================================================
// ADMINISTRATOR ROLES
// ============================================================================

/// Role carried by an administrator account.
///
/// `Owner` is the only role allowed to manage other administrator accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => Err(DomainError::InvalidValue {
                field: "role".to_string(),
                reason: format!("unknown role '{}'", other),
            }),
        }
    }
}

// ============================================================================
// COLUMN DATA TYPES
// ============================================================================

/// Declared type of a dynamic column.
///
/// The enumeration is closed: callers pick from this set instead of supplying
/// raw SQL types, so the schema mutator never interpolates caller-controlled
/// type text into DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Single-line text, VARCHAR(255)
    ShortText,
    /// Unbounded text, TEXT
    LongText,
    /// 32-bit integer
    Integer,
    /// Double-precision number
    Decimal,
    /// Calendar date
    Date,
    /// Timestamp with timezone
    Timestamp,
    /// Boolean flag
    Boolean,
}

impl DataType {
    /// The physical PostgreSQL type used for columns of this kind.
    pub fn sql_type(&self) -> &'static str {
        match self {
            DataType::ShortText => "VARCHAR(255)",
            DataType::LongText => "TEXT",
            DataType::Integer => "INTEGER",
            DataType::Decimal => "DOUBLE PRECISION",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMPTZ",
            DataType::Boolean => "BOOLEAN",
        }
    }

    /// Default expression used when a column is created NOT NULL, so
    /// existing rows get a value.
    pub fn sql_default(&self) -> &'static str {
        match self {
            DataType::ShortText | DataType::LongText => "''",
            DataType::Integer | DataType::Decimal => "0",
            DataType::Date => "CURRENT_DATE",
            DataType::Timestamp => "CURRENT_TIMESTAMP",
            DataType::Boolean => "FALSE",
        }
    }

    /// Map an `information_schema.columns.data_type` string back to the
    /// declared type. Unknown storage types fall back to `LongText` so a
    /// hand-altered table still lists.
    pub fn from_information_schema(s: &str) -> DataType {
        match s {
            "character varying" | "character" => DataType::ShortText,
            "text" => DataType::LongText,
            "smallint" | "integer" | "bigint" => DataType::Integer,
            "double precision" | "real" | "numeric" => DataType::Decimal,
            "date" => DataType::Date,
            "timestamp with time zone" | "timestamp without time zone" => DataType::Timestamp,
            "boolean" => DataType::Boolean,
            _ => DataType::LongText,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

// ============================================================================
// AUDIT ACTION KINDS
// ============================================================================

/// Kind of administrative action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    ColumnChange,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
            ActionKind::Login => "login",
            ActionKind::Logout => "logout",
            ActionKind::ColumnChange => "column_change",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ActionKind::Create),
            "update" => Ok(ActionKind::Update),
            "delete" => Ok(ActionKind::Delete),
            "login" => Ok(ActionKind::Login),
            "logout" => Ok(ActionKind::Logout),
            "column_change" => Ok(ActionKind::ColumnChange),
            other => Err(DomainError::InvalidValue {
                field: "action_kind".to_string(),
                reason: format!("unknown action kind '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Owner.as_str(), "owner");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_data_type_sql_mapping() {
        assert_eq!(DataType::ShortText.sql_type(), "VARCHAR(255)");
        assert_eq!(DataType::Boolean.sql_type(), "BOOLEAN");
        assert_eq!(
            DataType::from_information_schema("character varying"),
            DataType::ShortText
        );
        assert_eq!(
            DataType::from_information_schema("timestamp with time zone"),
            DataType::Timestamp
        );
        // Unknown storage types degrade to LongText rather than failing the listing
        assert_eq!(DataType::from_information_schema("jsonb"), DataType::LongText);
    }

    #[test]
    fn test_action_kind_serialization() {
        let json = serde_json::to_string(&ActionKind::ColumnChange).unwrap();
        assert_eq!(json, "\"column_change\"");
        assert_eq!(
            "column_change".parse::<ActionKind>().unwrap(),
            ActionKind::ColumnChange
        );
    }
}
