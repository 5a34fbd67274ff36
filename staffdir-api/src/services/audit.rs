//! Append-only audit log.
//!
//! Every mutation records who did what. Writing an audit row must never
//! fail the mutation it describes: insert errors are logged and swallowed.
//! Nothing in the crate ever updates or deletes from the log table.

use axum::http::HeaderMap;
use staffdir_core::{ActionKind, AuditEntry, RecordId};

use crate::db::Db;
use crate::error::ApiResult;
use crate::types::{LogsQuery, Pagination};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

// ============================================================================
// RECORDING
// ============================================================================

/// One audit event, built up with the `with_*` methods before recording.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub actor: String,
    pub action: ActionKind,
    pub table_name: Option<String>,
    pub record_id: Option<RecordId>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
}

impl AuditEvent {
    pub fn new(actor: impl Into<String>, action: ActionKind) -> Self {
        Self {
            actor: actor.into(),
            action,
            table_name: None,
            record_id: None,
            old_values: None,
            new_values: None,
            description: None,
            ip_address: None,
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table_name = Some(table.to_string());
        self
    }

    pub fn with_record(mut self, id: RecordId) -> Self {
        self.record_id = Some(id);
        self
    }

    pub fn with_old(mut self, values: serde_json::Value) -> Self {
        self.old_values = Some(values);
        self
    }

    pub fn with_new(mut self, values: serde_json::Value) -> Self {
        self.new_values = Some(values);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }
}

/// Record an audit event. Failures are logged, never propagated.
pub async fn record(db: &Db, event: AuditEvent) {
    let result = async {
        let conn = db.conn().await?;
        conn.execute(
            "INSERT INTO audit_log \
             (actor, action, table_name, record_id, old_values, new_values, description, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            &[
                &event.actor,
                &event.action.as_str(),
                &event.table_name,
                &event.record_id,
                &event.old_values,
                &event.new_values,
                &event.description,
                &event.ip_address,
            ],
        )
        .await?;
        ApiResult::Ok(())
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(
            actor = %event.actor,
            action = %event.action,
            error = %e,
            "Failed to record audit entry"
        );
    }
}

/// Best-effort client address from proxy headers.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        // First hop is the client when behind a trusted proxy
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ============================================================================
// LISTING
// ============================================================================

fn row_to_entry(row: &tokio_postgres::Row) -> ApiResult<AuditEntry> {
    let action: String = row.get("action");
    let action = action.parse::<ActionKind>()?;

    Ok(AuditEntry {
        id: row.get("id"),
        actor: row.get("actor"),
        action,
        table_name: row.get("table_name"),
        record_id: row.get("record_id"),
        old_values: row.get("old_values"),
        new_values: row.get("new_values"),
        description: row.get("description"),
        ip_address: row.get("ip_address"),
        created_at: row.get("created_at"),
    })
}

/// List audit entries, newest first, with optional action/actor filters.
pub async fn list(db: &Db, query: &LogsQuery) -> ApiResult<(Vec<AuditEntry>, Pagination)> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn postgres_types::ToSql + Sync + Send>> = Vec::new();

    if let Some(action) = &query.action {
        // Normalize through the enum so bad input fails fast
        let action = action.parse::<ActionKind>()?;
        params.push(Box::new(action.as_str().to_string()));
        clauses.push(format!("action = ${}", params.len()));
    }
    if let Some(actor) = &query.actor {
        params.push(Box::new(actor.clone()));
        clauses.push(format!("actor = ${}", params.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let conn = db.conn().await?;

    let count_sql = format!("SELECT COUNT(*) FROM audit_log{}", where_sql);
    let param_refs: Vec<&(dyn postgres_types::ToSql + Sync)> = params
        .iter()
        .map(|p| p.as_ref() as &(dyn postgres_types::ToSql + Sync))
        .collect();
    let total: i64 = conn.query_one(&count_sql, &param_refs).await?.get(0);

    params.push(Box::new(limit));
    params.push(Box::new(offset));
    let list_sql = format!(
        "SELECT id, actor, action, table_name, record_id, old_values, new_values, \
         description, ip_address, created_at \
         FROM audit_log{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
        where_sql,
        params.len() - 1,
        params.len()
    );
    let param_refs: Vec<&(dyn postgres_types::ToSql + Sync)> = params
        .iter()
        .map(|p| p.as_ref() as &(dyn postgres_types::ToSql + Sync))
        .collect();

    let rows = conn.query(&list_sql, &param_refs).await?;
    let logs = rows.iter().map(row_to_entry).collect::<ApiResult<Vec<_>>>()?;

    Ok((logs, Pagination::new(page, limit, total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_event_builder() {
        let event = AuditEvent::new("root", ActionKind::ColumnChange)
            .with_table("employees")
            .with_description("Added column 'department'")
            .with_ip(Some("10.0.0.1".to_string()));

        assert_eq!(event.actor, "root");
        assert_eq!(event.table_name.as_deref(), Some("employees"));
        assert_eq!(event.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(event.record_id.is_none());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.2"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.2"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
