//! Entity types persisted by the directory.

use serde::{Deserialize, Serialize};

use crate::enums::{ActionKind, DataType, Role};
use crate::{RecordId, Timestamp};

// ============================================================================
// COLUMN DEFINITION
// ============================================================================

/// One dynamic column of the record table, as seen through the registry.
///
/// Merged at read time from `information_schema` and the metadata table:
/// `column_name`, `data_type`, `is_nullable`, and `ordinal_position` come
/// from the physical schema; the rest from the metadata row (or its
/// defaults when none exists yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ColumnDefinition {
    /// Physical identifier, immutable once created
    pub column_name: String,
    /// Human-readable label
    pub display_name: String,
    /// Declared type, fixed at creation
    pub data_type: DataType,
    /// Whether the physical column accepts NULL
    pub is_nullable: bool,
    /// Whether the column appears in listings
    pub is_visible: bool,
    /// Display ordering, ascending; ties broken by physical position
    pub sort_order: i32,
    /// When true the column is omitted from anonymous reads
    pub admin_only: bool,
    /// Physical position in the table, used as the ordering tie-breaker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordinal_position: Option<i32>,
}

// ============================================================================
// ADMINISTRATOR ACCOUNT
// ============================================================================

/// An administrator identity. The password hash never leaves the API layer;
/// this public shape is what listings and responses carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminAccount {
    pub id: RecordId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: Role,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub updated_at: Timestamp,
}

// ============================================================================
// AUDIT ENTRY
// ============================================================================

/// One immutable row of the append-only audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditEntry {
    pub id: RecordId,
    /// Username of the acting administrator
    pub actor: String,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    /// Snapshot before the mutation, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub old_values: Option<serde_json::Value>,
    /// Snapshot after the mutation, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub new_values: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_column_definition_serialization() {
        let def = ColumnDefinition {
            column_name: "department".to_string(),
            display_name: "Department".to_string(),
            data_type: DataType::ShortText,
            is_nullable: true,
            is_visible: true,
            sort_order: 3,
            admin_only: false,
            ordinal_position: Some(5),
        };

        let json = serde_json::to_string(&def).unwrap();
        assert!(json.contains("\"column_name\":\"department\""));
        assert!(json.contains("\"data_type\":\"short_text\""));

        let back: ColumnDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn test_admin_account_hides_absent_full_name() {
        let account = AdminAccount {
            id: 1,
            username: "root".to_string(),
            full_name: None,
            role: Role::Owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("full_name"));
        assert!(json.contains("\"role\":\"owner\""));
    }

    #[cfg(feature = "openapi")]
    #[test]
    fn test_timestamped_entities_produce_schemas() {
        use utoipa::PartialSchema;
        // DateTime fields surface as string/date-time rather than needing a
        // chrono schema impl
        let _ = AdminAccount::schema();
        let _ = AuditEntry::schema();
        let _ = ColumnDefinition::schema();
    }

    #[test]
    fn test_audit_entry_optional_fields_skipped() {
        let entry = AuditEntry {
            id: 1,
            actor: "root".to_string(),
            action: ActionKind::Login,
            table_name: None,
            record_id: None,
            old_values: None,
            new_values: None,
            description: Some("Signed in".to_string()),
            ip_address: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("old_values"));
        assert!(!json.contains("table_name"));
        assert!(json.contains("Signed in"));
    }
}
