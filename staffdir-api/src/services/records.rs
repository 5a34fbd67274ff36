//! Record store: CRUD over the open-shaped employee table.
//!
//! Statements are assembled at runtime because the column set is dynamic,
//! but only from identifiers the registry vouches for. Field values bind as
//! parameters; nothing caller-controlled is ever spliced into SQL text.

use std::collections::BTreeSet;

use postgres_types::ToSql;
use staffdir_core::{
    is_protected_column, ActionKind, ColumnName, FieldValue, Record, RecordId, DataType,
    RECORD_TABLE,
};

use crate::auth::Caller;
use crate::db::Db;
use crate::error::{ApiError, ApiResult};
use crate::services::{audit, registry};
use crate::sql::{row_to_record, SqlValue};
use crate::types::{ListEmployeesQuery, Pagination, StatsResponse};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Columns probed by the free-text search, intersected with the columns
/// that physically exist.
const SEARCHABLE_COLUMNS: [&str; 4] = ["full_name", "email", "mobile_phone", "position"];

/// Fields a caller may never set directly.
fn is_managed_field(name: &str) -> bool {
    is_protected_column(name) && name != "full_name"
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

type BoxedParam = Box<dyn ToSql + Sync + Send>;

fn param_refs(params: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

// ============================================================================
// LISTING AND READS
// ============================================================================

/// List employees with search, exact filters, and pagination.
///
/// The response only carries columns the caller may see, in registry order.
/// Filter keys must name visible columns; unknown keys are rejected rather
/// than ignored.
pub async fn list(
    db: &Db,
    caller: Option<&Caller>,
    query: &ListEmployeesQuery,
) -> ApiResult<(Vec<Record>, Pagination)> {
    let conn = db.conn().await?;
    let columns = registry::list_columns(&**conn).await?;
    let visible = registry::visible_for(&columns, caller);
    let visible_names: BTreeSet<&str> = visible.iter().map(|c| c.column_name.as_str()).collect();

    let select_list = visible
        .iter()
        .map(|c| quote_ident(&c.column_name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<BoxedParam> = Vec::new();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let targets: Vec<&str> = SEARCHABLE_COLUMNS
            .iter()
            .copied()
            .filter(|c| visible_names.contains(c))
            .collect();
        if !targets.is_empty() {
            params.push(Box::new(format!("%{}%", search)));
            let idx = params.len();
            let ors = targets
                .iter()
                .map(|c| format!("{}::text ILIKE ${}", quote_ident(c), idx))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({})", ors));
        }
    }

    for (key, value) in &query.filters {
        ColumnName::new(key)
            .map_err(|_| ApiError::validation_failed(format!("Unknown filter column '{}'", key)))?;
        if !visible_names.contains(key.as_str()) {
            return Err(ApiError::validation_failed(format!(
                "Unknown filter column '{}'",
                key
            )));
        }
        params.push(Box::new(value.clone()));
        // Compare as text so filters work uniformly across column types
        clauses.push(format!("{}::text = ${}", quote_ident(key), params.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    // Directory convention: order by the personnel number when the column
    // exists, otherwise by id.
    let order_sql = if visible_names.contains("number") {
        " ORDER BY \"number\" ASC NULLS LAST, \"id\" ASC"
    } else {
        " ORDER BY \"id\" ASC"
    };

    let count_sql = format!("SELECT COUNT(*) FROM {}{}", RECORD_TABLE, where_sql);
    let total: i64 = conn
        .query_one(&count_sql, &param_refs(&params))
        .await?
        .get(0);

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    params.push(Box::new(limit));
    params.push(Box::new((page - 1) * limit));

    let list_sql = format!(
        "SELECT {} FROM {}{}{} LIMIT ${} OFFSET ${}",
        select_list,
        RECORD_TABLE,
        where_sql,
        order_sql,
        params.len() - 1,
        params.len()
    );

    let rows = conn.query(&list_sql, &param_refs(&params)).await?;
    let records = rows.iter().map(row_to_record).collect();

    Ok((records, Pagination::new(page, limit, total)))
}

/// Fetch one employee by id, shaped for the caller.
pub async fn get(db: &Db, caller: Option<&Caller>, id: RecordId) -> ApiResult<Record> {
    let conn = db.conn().await?;
    let columns = registry::list_columns(&**conn).await?;
    let visible = registry::visible_for(&columns, caller);

    let select_list = visible
        .iter()
        .map(|c| quote_ident(&c.column_name))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "SELECT {} FROM {} WHERE \"id\" = $1",
        select_list, RECORD_TABLE
    );
    let row = conn
        .query_opt(&sql, &[&id])
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", id))?;

    Ok(row_to_record(&row))
}

// ============================================================================
// MUTATIONS
// ============================================================================

/// Validate a field map against the registry, producing bind-ready pairs.
///
/// Managed fields (`id`, the timestamps) are silently dropped so clients
/// can echo a full record back. Unknown names and values that do not fit
/// the column's declared type are rejected.
fn coerce_fields(
    columns: &[staffdir_core::ColumnDefinition],
    fields: &serde_json::Map<String, serde_json::Value>,
) -> ApiResult<Vec<(ColumnName, FieldValue)>> {
    let types = registry::column_types(columns);
    let mut out = Vec::with_capacity(fields.len());

    for (key, value) in fields {
        if is_managed_field(key) {
            continue;
        }
        let name = ColumnName::new(key)
            .map_err(|_| ApiError::validation_failed(format!("Unknown field '{}'", key)))?;
        let declared = *types
            .get(name.as_str())
            .ok_or_else(|| ApiError::validation_failed(format!("Unknown field '{}'", key)))?;

        let coerced = FieldValue::from_json(declared, value).map_err(|e| {
            ApiError::validation_failed(format!("Field '{}': {}", key, e))
        })?;

        if name.as_str() == "full_name" {
            match &coerced {
                FieldValue::Text(s) if !s.trim().is_empty() => {}
                _ => return Err(ApiError::missing_field("full_name")),
            }
        }

        out.push((name, coerced));
    }

    Ok(out)
}

/// Create an employee record. `full_name` is mandatory; every other field
/// is optional and validated against the registry.
pub async fn create(
    db: &Db,
    caller: &Caller,
    fields: &serde_json::Map<String, serde_json::Value>,
    ip: Option<String>,
) -> ApiResult<Record> {
    if !fields.contains_key("full_name") {
        return Err(ApiError::missing_field("full_name"));
    }

    let conn = db.conn().await?;
    let columns = registry::list_columns(&**conn).await?;
    let pairs = coerce_fields(&columns, fields)?;

    let names = pairs
        .iter()
        .map(|(n, _)| n.quoted())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=pairs.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let values: Vec<SqlValue> = pairs.iter().map(|(_, v)| SqlValue(v.clone())).collect();
    let params: Vec<&(dyn ToSql + Sync)> =
        values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        RECORD_TABLE, names, placeholders
    );
    let row = conn.query_one(&sql, &params).await?;
    let record = row_to_record(&row);

    tracing::info!(id = ?record.id(), "Employee created");

    let mut event = audit::AuditEvent::new(&caller.username, ActionKind::Create)
        .with_table(RECORD_TABLE)
        .with_new(serde_json::to_value(&record)?)
        .with_ip(ip);
    if let Some(id) = record.id() {
        event = event.with_record(id);
    }
    audit::record(db, event).await;

    Ok(record)
}

/// Update an employee record with a partial field map.
///
/// The read of the old row and the write happen in one transaction, so the
/// audit snapshot cannot go stale under a concurrent writer.
pub async fn update(
    db: &Db,
    caller: &Caller,
    id: RecordId,
    fields: &serde_json::Map<String, serde_json::Value>,
    ip: Option<String>,
) -> ApiResult<Record> {
    let mut conn = db.conn().await?;
    let tx = conn.transaction().await?;

    let sql = format!("SELECT * FROM {} WHERE \"id\" = $1 FOR UPDATE", RECORD_TABLE);
    let old_row = tx
        .query_opt(&sql, &[&id])
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", id))?;
    let old_record = row_to_record(&old_row);

    let columns = registry::list_columns(&*tx).await?;
    let pairs = coerce_fields(&columns, fields)?;
    if pairs.is_empty() {
        return Err(ApiError::no_updates());
    }

    let assignments = pairs
        .iter()
        .enumerate()
        .map(|(i, (n, _))| format!("{} = ${}", n.quoted(), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let values: Vec<SqlValue> = pairs.iter().map(|(_, v)| SqlValue(v.clone())).collect();
    let mut params: Vec<&(dyn ToSql + Sync)> =
        values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
    params.push(&id);

    let sql = format!(
        "UPDATE {} SET {}, \"updated_at\" = CURRENT_TIMESTAMP WHERE \"id\" = ${} RETURNING *",
        RECORD_TABLE,
        assignments,
        params.len()
    );
    let row = tx.query_one(&sql, &params).await?;
    let record = row_to_record(&row);

    tx.commit().await?;

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::Update)
            .with_table(RECORD_TABLE)
            .with_record(id)
            .with_old(serde_json::to_value(&old_record)?)
            .with_new(serde_json::to_value(&record)?)
            .with_ip(ip),
    )
    .await;

    Ok(record)
}

/// Confirm a DELETE hit a row. A zero count means the record vanished
/// between the snapshot read and the delete.
fn confirm_deleted(rows: u64, id: RecordId) -> ApiResult<()> {
    if rows == 0 {
        return Err(ApiError::not_found("Employee", id));
    }
    Ok(())
}

/// Delete an employee record, preserving its final state in the audit log.
/// Snapshot and delete run in one transaction.
pub async fn delete(db: &Db, caller: &Caller, id: RecordId, ip: Option<String>) -> ApiResult<()> {
    let mut conn = db.conn().await?;
    let tx = conn.transaction().await?;

    let sql = format!("SELECT * FROM {} WHERE \"id\" = $1 FOR UPDATE", RECORD_TABLE);
    let old_row = tx
        .query_opt(&sql, &[&id])
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", id))?;
    let old_record = row_to_record(&old_row);

    let sql = format!("DELETE FROM {} WHERE \"id\" = $1", RECORD_TABLE);
    let deleted = tx.execute(&sql, &[&id]).await?;
    confirm_deleted(deleted, id)?;

    tx.commit().await?;

    tracing::info!(id, "Employee deleted");

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::Delete)
            .with_table(RECORD_TABLE)
            .with_record(id)
            .with_old(serde_json::to_value(&old_record)?)
            .with_ip(ip),
    )
    .await;

    Ok(())
}

// ============================================================================
// FILTER VALUES AND STATS
// ============================================================================

/// Distinct values per filterable column, for dropdown filters.
///
/// Short-text and integer dynamic columns visible to the caller qualify;
/// free-form long text and timestamps make useless dropdowns.
pub async fn distinct_filters(
    db: &Db,
    caller: Option<&Caller>,
) -> ApiResult<std::collections::BTreeMap<String, Vec<String>>> {
    let conn = db.conn().await?;
    let columns = registry::list_columns(&**conn).await?;
    let visible = registry::visible_for(&columns, caller);

    let mut filters = std::collections::BTreeMap::new();
    for column in visible
        .iter()
        .filter(|c| {
            matches!(c.data_type, DataType::ShortText | DataType::Integer)
                && !is_protected_column(&c.column_name)
        })
    {
        let ident = quote_ident(&column.column_name);
        let sql = format!(
            "SELECT DISTINCT {ident}::text FROM {} \
             WHERE {ident} IS NOT NULL AND {ident}::text <> '' \
             ORDER BY 1 LIMIT 100",
            RECORD_TABLE,
        );
        let rows = conn.query(&sql, &[]).await?;
        let values: Vec<String> = rows.iter().map(|r| r.get(0)).collect();
        if !values.is_empty() {
            filters.insert(column.column_name.clone(), values);
        }
    }

    Ok(filters)
}

/// Dashboard counters: table sizes plus today's employee activity derived
/// from the audit log.
pub async fn stats(db: &Db) -> ApiResult<StatsResponse> {
    let conn = db.conn().await?;

    let total_employees: i64 = conn
        .query_one("SELECT COUNT(*) FROM employees", &[])
        .await?
        .get(0);
    let total_admins: i64 = conn
        .query_one("SELECT COUNT(*) FROM admins", &[])
        .await?
        .get(0);

    let row = conn
        .query_one(
            "SELECT \
                 COUNT(*) FILTER (WHERE action = 'create') AS created, \
                 COUNT(*) FILTER (WHERE action = 'update') AS updated \
             FROM audit_log \
             WHERE table_name = $1 AND created_at >= date_trunc('day', now())",
            &[&RECORD_TABLE],
        )
        .await?;

    Ok(StatsResponse {
        total_employees,
        total_admins,
        created_today: row.get("created"),
        updated_today: row.get("updated"),
    })
}
