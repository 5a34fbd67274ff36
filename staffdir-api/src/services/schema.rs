//! Schema mutator: the only place that issues DDL.
//!
//! Adding or dropping a column touches two things that must stay in
//! lockstep: the physical table and the metadata registry. Both sides of
//! each mutation run in one transaction. Identifiers are validated and the
//! type vocabulary is closed, so no caller-controlled text is ever
//! interpolated into a statement unquoted.

use staffdir_core::{ActionKind, ColumnDefinition, ColumnName, RECORD_TABLE};
use tokio_postgres::error::SqlState;

use crate::auth::Caller;
use crate::db::Db;
use crate::error::{ApiError, ApiResult};
use crate::services::{audit, registry};
use crate::types::{AddColumnRequest, UpdateColumnRequest};
use crate::validation::{HasUpdates, ValidateNonEmpty};

/// Add a dynamic column to the record table.
///
/// `ALTER TABLE ... ADD COLUMN` plus the metadata insert commit together.
/// The new column lands at the end of the display order.
/// Check an add request before any statement runs. Field-level problems
/// (blank display name, malformed identifier) surface before the reserved
/// name rule does.
fn validate_add_request(req: &AddColumnRequest) -> ApiResult<ColumnName> {
    req.display_name.validate_non_empty("display_name")?;
    let name = ColumnName::new(&req.column_name)?;
    if name.is_protected() {
        return Err(ApiError::reserved_name(name.as_str()));
    }
    Ok(name)
}

pub async fn add_column(
    db: &Db,
    caller: &Caller,
    req: &AddColumnRequest,
    ip: Option<String>,
) -> ApiResult<ColumnDefinition> {
    let name = validate_add_request(req)?;

    let mut conn = db.conn().await?;
    let tx = conn.transaction().await?;

    let mut ddl = format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        RECORD_TABLE,
        name.quoted(),
        req.data_type.sql_type()
    );
    if !req.is_nullable {
        // Existing rows need a value for the new constraint to hold
        ddl.push_str(&format!(" NOT NULL DEFAULT {}", req.data_type.sql_default()));
    }
    match tx.execute(&ddl, &[]).await {
        Ok(_) => {}
        Err(e) if e.code() == Some(&SqlState::DUPLICATE_COLUMN) => {
            return Err(ApiError::conflict(format!(
                "Column '{}' already exists",
                name.as_str()
            )));
        }
        Err(e) => return Err(e.into()),
    }

    let sort_order: i32 = tx
        .query_one(
            "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM column_metadata",
            &[],
        )
        .await?
        .get(0);

    tx.execute(
        "INSERT INTO column_metadata (column_name, display_name, is_visible, sort_order, admin_only) \
         VALUES ($1, $2, TRUE, $3, $4)",
        &[&name.as_str(), &req.display_name, &sort_order, &req.admin_only],
    )
    .await?;

    tx.commit().await?;

    tracing::info!(column = %name, data_type = %req.data_type, "Column added");

    let definition = ColumnDefinition {
        column_name: name.as_str().to_string(),
        display_name: req.display_name.clone(),
        data_type: req.data_type,
        is_nullable: req.is_nullable,
        is_visible: true,
        sort_order,
        admin_only: req.admin_only,
        ordinal_position: None,
    };

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::ColumnChange)
            .with_table(RECORD_TABLE)
            .with_new(serde_json::to_value(&definition)?)
            .with_description(format!("Added column '{}'", name.as_str()))
            .with_ip(ip),
    )
    .await;

    Ok(definition)
}

/// Update a column's presentation metadata.
///
/// The physical column and its data type are immutable; only display name,
/// visibility, ordering, and the admin-only flag can change. A column with
/// no metadata row is not managed and cannot be updated.
pub async fn update_column(
    db: &Db,
    caller: &Caller,
    column_name: &str,
    req: &UpdateColumnRequest,
    ip: Option<String>,
) -> ApiResult<ColumnDefinition> {
    let name = ColumnName::new(column_name)?;
    if name.is_protected() {
        return Err(ApiError::protected_column(name.as_str()));
    }
    req.validate_has_updates()?;
    if let Some(display_name) = &req.display_name {
        display_name.validate_non_empty("display_name")?;
    }

    let conn = db.conn().await?;

    let columns = registry::list_columns(&**conn).await?;
    let current = columns
        .iter()
        .find(|c| c.column_name == name.as_str())
        .cloned()
        .ok_or_else(|| ApiError::not_found("Column", name.as_str()))?;

    let updated = conn
        .execute(
            "UPDATE column_metadata SET \
                 display_name = COALESCE($2, display_name), \
                 is_visible = COALESCE($3, is_visible), \
                 sort_order = COALESCE($4, sort_order), \
                 admin_only = COALESCE($5, admin_only) \
             WHERE column_name = $1",
            &[
                &name.as_str(),
                &req.display_name,
                &req.is_visible,
                &req.sort_order,
                &req.admin_only,
            ],
        )
        .await?;
    if updated == 0 {
        return Err(ApiError::not_found("Column", name.as_str()));
    }

    let merged = ColumnDefinition {
        display_name: req.display_name.clone().unwrap_or(current.display_name.clone()),
        is_visible: req.is_visible.unwrap_or(current.is_visible),
        sort_order: req.sort_order.unwrap_or(current.sort_order),
        admin_only: req.admin_only.unwrap_or(current.admin_only),
        ..current.clone()
    };

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::ColumnChange)
            .with_table(RECORD_TABLE)
            .with_old(serde_json::to_value(&current)?)
            .with_new(serde_json::to_value(&merged)?)
            .with_description(format!("Updated column '{}'", name.as_str()))
            .with_ip(ip),
    )
    .await;

    Ok(merged)
}

/// Drop a dynamic column and its metadata, atomically. The column's data
/// goes with it.
pub async fn drop_column(
    db: &Db,
    caller: &Caller,
    column_name: &str,
    ip: Option<String>,
) -> ApiResult<()> {
    let name = ColumnName::new(column_name)?;
    if name.is_protected() {
        return Err(ApiError::protected_column(name.as_str()));
    }

    let mut conn = db.conn().await?;

    // Capture the definition for the audit trail before it disappears.
    // A missing metadata row is tolerated; the physical drop decides
    // whether the column existed at all.
    let columns = registry::list_columns(&**conn).await?;
    let old_definition = columns.iter().find(|c| c.column_name == name.as_str()).cloned();

    let tx = conn.transaction().await?;

    let ddl = format!("ALTER TABLE {} DROP COLUMN {}", RECORD_TABLE, name.quoted());
    match tx.execute(&ddl, &[]).await {
        Ok(_) => {}
        Err(e) if e.code() == Some(&SqlState::UNDEFINED_COLUMN) => {
            return Err(ApiError::not_found("Column", name.as_str()));
        }
        Err(e) => return Err(e.into()),
    }

    tx.execute(
        "DELETE FROM column_metadata WHERE column_name = $1",
        &[&name.as_str()],
    )
    .await?;

    tx.commit().await?;

    tracing::info!(column = %name, "Column dropped");

    let mut event = audit::AuditEvent::new(&caller.username, ActionKind::ColumnChange)
        .with_table(RECORD_TABLE)
        .with_description(format!("Dropped column '{}'", name.as_str()))
        .with_ip(ip);
    if let Some(definition) = old_definition {
        event = event.with_old(serde_json::to_value(&definition)?);
    }
    audit::record(db, event).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffdir_core::DataType;

    // DDL strings are built from validated parts only; these tests pin the
    // exact statements the mutator emits.

    #[test]
    fn test_add_column_ddl_shape() {
        let name = ColumnName::new("office_number").unwrap();
        let ddl = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            RECORD_TABLE,
            name.quoted(),
            DataType::Integer.sql_type()
        );
        assert_eq!(ddl, "ALTER TABLE employees ADD COLUMN \"office_number\" INTEGER");
    }

    #[test]
    fn test_not_null_column_gets_type_default() {
        let name = ColumnName::new("badge_count").unwrap();
        let mut ddl = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            RECORD_TABLE,
            name.quoted(),
            DataType::Integer.sql_type()
        );
        ddl.push_str(&format!(" NOT NULL DEFAULT {}", DataType::Integer.sql_default()));
        assert_eq!(
            ddl,
            "ALTER TABLE employees ADD COLUMN \"badge_count\" INTEGER NOT NULL DEFAULT 0"
        );
    }

    #[test]
    fn test_drop_column_ddl_shape() {
        let name = ColumnName::new("department").unwrap();
        let ddl = format!("ALTER TABLE {} DROP COLUMN {}", RECORD_TABLE, name.quoted());
        assert_eq!(ddl, "ALTER TABLE employees DROP COLUMN \"department\"");
    }

    #[test]
    fn test_blank_display_name_reported_before_reserved_name() {
        use crate::error::ErrorCode;

        let mut req = AddColumnRequest {
            column_name: "id".to_string(),
            display_name: "   ".to_string(),
            data_type: DataType::ShortText,
            is_nullable: true,
            admin_only: false,
        };
        // Field problems come first even when the name is also reserved
        let err = validate_add_request(&req).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);

        req.display_name = "Identifier".to_string();
        let err = validate_add_request(&req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservedName);

        req.column_name = "badge_color".to_string();
        assert!(validate_add_request(&req).is_ok());
    }

    #[test]
    fn test_hostile_identifiers_never_reach_ddl() {
        for hostile in ["x; DROP TABLE employees", "a\"b", "name--", "UPPER"] {
            assert!(ColumnName::new(hostile).is_err(), "{:?} must be rejected", hostile);
        }
    }
}
