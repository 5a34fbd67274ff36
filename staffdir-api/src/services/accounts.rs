//! Administrator accounts: authentication and owner-gated management.
//!
//! Password hashes never leave this module; listings and responses carry
//! the public [`AdminAccount`] shape only. The management guardrails live
//! here rather than in the routes: no self-modification, no deleting owner
//! accounts, unique usernames.

use staffdir_core::{ActionKind, AdminAccount, RecordId, Role};
use tokio_postgres::error::SqlState;

use crate::auth::{self, AuthConfig, Caller};
use crate::db::Db;
use crate::error::{ApiError, ApiResult};
use crate::services::audit;
use crate::types::{CreateAdminRequest, UpdateAdminRequest};
use crate::validation::{HasUpdates, ValidateNonEmpty};

const ADMINS_TABLE: &str = "admins";

fn row_to_account(row: &tokio_postgres::Row) -> ApiResult<AdminAccount> {
    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|_| ApiError::internal_error("Account has an unknown role"))?;

    Ok(AdminAccount {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const ACCOUNT_COLUMNS: &str = "id, username, full_name, role, created_at, updated_at";

// ============================================================================
// AUTHENTICATION
// ============================================================================

/// Verify credentials and mint a session token.
///
/// Unknown usernames and wrong passwords fail identically so the endpoint
/// does not leak which usernames exist.
pub async fn authenticate(
    db: &Db,
    auth_config: &AuthConfig,
    username: &str,
    password: &str,
    ip: Option<String>,
) -> ApiResult<(Caller, String)> {
    username.validate_non_empty("username")?;
    password.validate_non_empty("password")?;

    let invalid = || ApiError::unauthorized("Invalid username or password");

    let conn = db.conn().await?;
    let row = conn
        .query_opt(
            "SELECT id, username, password_hash, full_name, role FROM admins WHERE username = $1",
            &[&username],
        )
        .await?
        .ok_or_else(invalid)?;

    let stored_hash: String = row.get("password_hash");
    if !auth::verify_password(password, &stored_hash) {
        tracing::warn!(username, "Failed login attempt");
        return Err(invalid());
    }

    let role: String = row.get("role");
    let caller = Caller {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        role: role
            .parse::<Role>()
            .map_err(|_| ApiError::internal_error("Account has an unknown role"))?,
    };

    let token = auth::generate_session_token(auth_config, caller.id, &caller.username, caller.role)?;

    tracing::info!(username = %caller.username, "Administrator signed in");

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::Login)
            .with_description("Signed in")
            .with_ip(ip),
    )
    .await;

    Ok((caller, token))
}

/// Record a sign-out. The cookie clearing happens at the route layer.
pub async fn sign_out(db: &Db, caller: &Caller, ip: Option<String>) {
    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::Logout)
            .with_description("Signed out")
            .with_ip(ip),
    )
    .await;
}

// ============================================================================
// MANAGEMENT (OWNER-GATED AT THE ROUTE LAYER)
// ============================================================================

/// List all administrator accounts, owners first, then by creation time.
pub async fn list(db: &Db) -> ApiResult<Vec<AdminAccount>> {
    let conn = db.conn().await?;
    let rows = conn
        .query(
            &format!(
                "SELECT {} FROM admins ORDER BY (role = 'owner') DESC, created_at ASC",
                ACCOUNT_COLUMNS
            ),
            &[],
        )
        .await?;

    rows.iter().map(row_to_account).collect()
}

/// Create an administrator account.
pub async fn create(
    db: &Db,
    caller: &Caller,
    req: &CreateAdminRequest,
    ip: Option<String>,
) -> ApiResult<AdminAccount> {
    req.username.validate_non_empty("username")?;
    req.password.validate_non_empty("password")?;

    let role = req.role.unwrap_or(Role::Admin);
    let password_hash = auth::hash_password(&req.password)?;

    let conn = db.conn().await?;
    let row = match conn
        .query_one(
            &format!(
                "INSERT INTO admins (username, password_hash, full_name, role) \
                 VALUES ($1, $2, $3, $4) RETURNING {}",
                ACCOUNT_COLUMNS
            ),
            &[&req.username, &password_hash, &req.full_name, &role.as_str()],
        )
        .await
    {
        Ok(row) => row,
        Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
            return Err(ApiError::conflict(format!(
                "Username '{}' already exists",
                req.username
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let account = row_to_account(&row)?;

    tracing::info!(username = %account.username, role = %account.role, "Administrator created");

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::Create)
            .with_table(ADMINS_TABLE)
            .with_record(account.id)
            .with_new(serde_json::to_value(&account)?)
            .with_ip(ip),
    )
    .await;

    Ok(account)
}

/// The subset of an update request that would actually change the stored
/// row. Unchanged values and blank passwords do not count as updates.
#[derive(Debug, Default)]
struct AccountChanges {
    username: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
    role: Option<Role>,
}

impl AccountChanges {
    fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.full_name.is_none()
            && self.role.is_none()
    }
}

fn effective_changes(current: &AdminAccount, req: &UpdateAdminRequest) -> AccountChanges {
    AccountChanges {
        username: req.username.clone().filter(|u| u != &current.username),
        // Hashes are not comparable, so any non-blank password is a change
        password: req.password.clone().filter(|p| !p.trim().is_empty()),
        full_name: req
            .full_name
            .clone()
            .filter(|f| current.full_name.as_deref() != Some(f.as_str())),
        role: req.role.filter(|r| *r != current.role),
    }
}

/// Update an administrator account. Callers cannot touch their own row,
/// and an update that changes nothing is rejected rather than replayed.
pub async fn update(
    db: &Db,
    caller: &Caller,
    id: RecordId,
    req: &UpdateAdminRequest,
    ip: Option<String>,
) -> ApiResult<AdminAccount> {
    if id == caller.id {
        return Err(ApiError::self_modification());
    }
    req.validate_has_updates()?;

    let conn = db.conn().await?;
    let old_row = conn
        .query_opt(
            &format!("SELECT {} FROM admins WHERE id = $1", ACCOUNT_COLUMNS),
            &[&id],
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Admin", id))?;
    let old_account = row_to_account(&old_row)?;

    let changes = effective_changes(&old_account, req);
    if changes.is_empty() {
        return Err(ApiError::no_updates());
    }

    let mut assignments: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn postgres_types::ToSql + Sync + Send>> = Vec::new();

    if let Some(username) = &changes.username {
        username.validate_non_empty("username")?;
        params.push(Box::new(username.clone()));
        assignments.push(format!("username = ${}", params.len()));
    }
    if let Some(password) = &changes.password {
        params.push(Box::new(auth::hash_password(password)?));
        assignments.push(format!("password_hash = ${}", params.len()));
    }
    if let Some(full_name) = &changes.full_name {
        params.push(Box::new(full_name.clone()));
        assignments.push(format!("full_name = ${}", params.len()));
    }
    if let Some(role) = changes.role {
        params.push(Box::new(role.as_str().to_string()));
        assignments.push(format!("role = ${}", params.len()));
    }

    params.push(Box::new(id));
    let sql = format!(
        "UPDATE admins SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ${} RETURNING {}",
        assignments.join(", "),
        params.len(),
        ACCOUNT_COLUMNS
    );
    let param_refs: Vec<&(dyn postgres_types::ToSql + Sync)> = params
        .iter()
        .map(|p| p.as_ref() as &(dyn postgres_types::ToSql + Sync))
        .collect();

    let row = match conn.query_one(&sql, &param_refs).await {
        Ok(row) => row,
        Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
            return Err(ApiError::conflict("Username already exists"));
        }
        Err(e) => return Err(e.into()),
    };
    let account = row_to_account(&row)?;

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::Update)
            .with_table(ADMINS_TABLE)
            .with_record(id)
            .with_old(serde_json::to_value(&old_account)?)
            .with_new(serde_json::to_value(&account)?)
            .with_ip(ip),
    )
    .await;

    Ok(account)
}

/// Delete an administrator account. Owner accounts and the caller's own
/// account are off limits.
pub async fn delete(db: &Db, caller: &Caller, id: RecordId, ip: Option<String>) -> ApiResult<()> {
    if id == caller.id {
        return Err(ApiError::self_modification());
    }

    let conn = db.conn().await?;
    let row = conn
        .query_opt(
            &format!("SELECT {} FROM admins WHERE id = $1", ACCOUNT_COLUMNS),
            &[&id],
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Admin", id))?;
    let account = row_to_account(&row)?;

    if account.role.is_owner() {
        return Err(ApiError::owner_protected());
    }

    conn.execute("DELETE FROM admins WHERE id = $1", &[&id]).await?;

    tracing::info!(username = %account.username, "Administrator deleted");

    audit::record(
        db,
        audit::AuditEvent::new(&caller.username, ActionKind::Delete)
            .with_table(ADMINS_TABLE)
            .with_record(id)
            .with_old(serde_json::to_value(&account)?)
            .with_ip(ip),
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored_account() -> AdminAccount {
        AdminAccount {
            id: 7,
            username: "jdoe".to_string(),
            full_name: Some("Jane Doe".to_string()),
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_echoed_values_are_not_changes() {
        // A client resubmitting the current state must get the no-updates
        // error, not a fresh UPDATE and audit row
        let req = UpdateAdminRequest {
            username: Some("jdoe".to_string()),
            password: Some("   ".to_string()),
            full_name: Some("Jane Doe".to_string()),
            role: Some(Role::Admin),
        };
        assert!(effective_changes(&stored_account(), &req).is_empty());
    }

    #[test]
    fn test_changed_fields_are_detected() {
        let req = UpdateAdminRequest {
            username: Some("jdoe".to_string()),
            role: Some(Role::Owner),
            ..Default::default()
        };
        let changes = effective_changes(&stored_account(), &req);
        assert!(changes.username.is_none());
        assert_eq!(changes.role, Some(Role::Owner));
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_nonblank_password_always_counts() {
        let req = UpdateAdminRequest {
            password: Some("fresh-secret".to_string()),
            ..Default::default()
        };
        let changes = effective_changes(&stored_account(), &req);
        assert_eq!(changes.password.as_deref(), Some("fresh-secret"));
    }

    #[test]
    fn test_account_columns_exclude_hash() {
        assert!(!ACCOUNT_COLUMNS.contains("password_hash"));
    }
}
