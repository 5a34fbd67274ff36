//! Column registry: the merged view of the record table's schema.
//!
//! The physical truth lives in `information_schema.columns`; presentation
//! metadata lives in `column_metadata`. The registry joins the two at read
//! time, so a metadata row can go missing (hand-altered table) without
//! breaking listings. Everything that builds SQL dynamically asks the
//! registry first; an identifier that is not in the registry never reaches
//! a statement.

use std::collections::BTreeMap;

use staffdir_core::{ColumnDefinition, DataType, DEFAULT_SORT_ORDER, RECORD_TABLE};
use tokio_postgres::GenericClient;

use crate::auth::Caller;
use crate::error::ApiResult;

/// List every column of the record table in display order.
///
/// Ordering is `sort_order` ascending with physical position as the
/// tie-breaker. Columns without a metadata row get defaults: display name
/// equal to the identifier, visible, sort order 999, not admin-only.
pub async fn list_columns(client: &impl GenericClient) -> ApiResult<Vec<ColumnDefinition>> {
    let rows = client
        .query(
            "SELECT c.column_name::text AS column_name, \
                    c.data_type::text AS data_type, \
                    c.is_nullable::text AS is_nullable, \
                    c.ordinal_position::int4 AS ordinal_position, \
                    COALESCE(m.display_name, c.column_name)::text AS display_name, \
                    COALESCE(m.is_visible, TRUE) AS is_visible, \
                    COALESCE(m.sort_order, $1) AS sort_order, \
                    COALESCE(m.admin_only, FALSE) AS admin_only \
             FROM information_schema.columns c \
             LEFT JOIN column_metadata m ON m.column_name = c.column_name \
             WHERE c.table_schema = 'public' AND c.table_name = $2 \
             ORDER BY COALESCE(m.sort_order, $1), c.ordinal_position",
            &[&DEFAULT_SORT_ORDER, &RECORD_TABLE],
        )
        .await?;

    let columns = rows
        .iter()
        .map(|row| {
            let data_type: String = row.get("data_type");
            let is_nullable: String = row.get("is_nullable");
            ColumnDefinition {
                column_name: row.get("column_name"),
                display_name: row.get("display_name"),
                data_type: DataType::from_information_schema(&data_type),
                is_nullable: is_nullable == "YES",
                is_visible: row.get("is_visible"),
                sort_order: row.get("sort_order"),
                admin_only: row.get("admin_only"),
                ordinal_position: Some(row.get("ordinal_position")),
            }
        })
        .collect();

    Ok(columns)
}

/// The registry view exposed over the API: dynamic columns only. The four
/// protected columns are always present and never managed, so listings
/// leave them out.
pub fn dynamic_columns(columns: &[ColumnDefinition]) -> Vec<ColumnDefinition> {
    columns
        .iter()
        .filter(|c| !staffdir_core::is_protected_column(&c.column_name))
        .cloned()
        .collect()
}

/// Filter a column listing down to what the caller may see.
///
/// Anonymous callers lose hidden and admin-only columns; authenticated
/// administrators see everything.
pub fn visible_for(columns: &[ColumnDefinition], caller: Option<&Caller>) -> Vec<ColumnDefinition> {
    columns
        .iter()
        .filter(|c| {
            if caller.is_some() {
                return true;
            }
            c.is_visible && !c.admin_only
        })
        .cloned()
        .collect()
}

/// Declared type per column name, for value coercion and filter validation.
pub fn column_types(columns: &[ColumnDefinition]) -> BTreeMap<String, DataType> {
    columns
        .iter()
        .map(|c| (c.column_name.clone(), c.data_type))
        .collect()
}

/// Whether a physical column with this name exists.
pub async fn column_exists(client: &impl GenericClient, name: &str) -> ApiResult<bool> {
    let row = client
        .query_one(
            "SELECT EXISTS ( \
                SELECT 1 FROM information_schema.columns \
                WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2)",
            &[&RECORD_TABLE, &name],
        )
        .await?;
    Ok(row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, visible: bool, admin_only: bool) -> ColumnDefinition {
        ColumnDefinition {
            column_name: name.to_string(),
            display_name: name.to_string(),
            data_type: DataType::ShortText,
            is_nullable: true,
            is_visible: visible,
            sort_order: DEFAULT_SORT_ORDER,
            admin_only,
            ordinal_position: None,
        }
    }

    fn caller() -> Caller {
        Caller {
            id: 1,
            username: "root".to_string(),
            full_name: None,
            role: staffdir_core::Role::Admin,
        }
    }

    #[test]
    fn test_dynamic_columns_exclude_protected() {
        let columns = vec![
            column("id", true, false),
            column("full_name", true, false),
            column("department", true, false),
            column("created_at", true, false),
            column("updated_at", true, false),
        ];

        let dynamic = dynamic_columns(&columns);
        assert_eq!(dynamic.len(), 1);
        assert_eq!(dynamic[0].column_name, "department");
    }

    #[test]
    fn test_visible_for_anonymous_drops_hidden_and_admin_only() {
        let columns = vec![
            column("full_name", true, false),
            column("salary", true, true),
            column("notes", false, false),
        ];

        let anonymous = visible_for(&columns, None);
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].column_name, "full_name");
    }

    #[test]
    fn test_visible_for_admin_sees_everything() {
        let columns = vec![
            column("full_name", true, false),
            column("salary", true, true),
            column("notes", false, false),
        ];

        let c = caller();
        assert_eq!(visible_for(&columns, Some(&c)).len(), 3);
    }

    #[test]
    fn test_anonymous_column_listing_shape() {
        // Public column listing: shape for the caller first, then drop the
        // protected set
        let columns = vec![
            column("id", true, false),
            column("full_name", true, false),
            column("department", true, false),
            column("salary", true, true),
            column("notes", false, false),
        ];

        let shaped = visible_for(&columns, None);
        let listed = dynamic_columns(&shaped);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].column_name, "department");

        let c = caller();
        let listed = dynamic_columns(&visible_for(&columns, Some(&c)));
        assert_eq!(listed.len(), 3);
    }

    #[test]
    fn test_column_types_map() {
        let columns = vec![column("full_name", true, false), column("city", true, false)];
        let types = column_types(&columns);
        assert_eq!(types.get("city"), Some(&DataType::ShortText));
        assert!(!types.contains_key("salary"));
    }
}
