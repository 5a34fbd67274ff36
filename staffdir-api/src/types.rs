//! Request and response types for the REST API.
//!
//! All wire types use snake_case field names. Update requests carry
//! `Option` fields and implement [`HasUpdates`] so handlers can reject
//! empty updates uniformly.

use serde::{Deserialize, Serialize};
use staffdir_core::{AdminAccount, AuditEntry, ColumnDefinition, DataType, Record, Role};

use crate::auth::Caller;
use crate::validation::HasUpdates;

// ============================================================================
// PAGINATION
// ============================================================================

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    /// Total matching rows before pagination
    pub total: i64,
    /// Total page count
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

// ============================================================================
// COLUMNS
// ============================================================================

/// Request body for adding a dynamic column.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddColumnRequest {
    /// Physical column name (lowercase identifier)
    pub column_name: String,
    /// Human-readable label shown in the console
    pub display_name: String,
    /// Declared data type
    pub data_type: DataType,
    /// Whether the physical column accepts NULL. A NOT NULL column gets a
    /// type-appropriate default so existing rows stay valid.
    #[serde(default = "default_true")]
    pub is_nullable: bool,
    /// Whether the column is hidden from non-admin views
    #[serde(default)]
    pub admin_only: bool,
}

fn default_true() -> bool {
    true
}

/// Request body for updating column metadata. The physical column and its
/// data type are immutable; only presentation metadata can change.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateColumnRequest {
    pub display_name: Option<String>,
    pub is_visible: Option<bool>,
    pub sort_order: Option<i32>,
    pub admin_only: Option<bool>,
}

impl HasUpdates for UpdateColumnRequest {
    fn has_any_updates(&self) -> bool {
        self.display_name.is_some()
            || self.is_visible.is_some()
            || self.sort_order.is_some()
            || self.admin_only.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ColumnListResponse {
    pub columns: Vec<ColumnDefinition>,
}

// ============================================================================
// EMPLOYEES
// ============================================================================

/// Query parameters for listing employees.
///
/// Any key other than `search`, `page`, and `limit` is treated as an exact
/// filter on the column of the same name; unknown names are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEmployeesQuery {
    pub search: Option<String>,
    // With #[serde(flatten)] in play the query deserializer hands every
    // value over as a string, so these two parse themselves.
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub limit: Option<i64>,
    #[serde(flatten)]
    pub filters: std::collections::BTreeMap<String, String>,
}

fn de_opt_i64<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<String>::deserialize(d)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EmployeeListResponse {
    pub employees: Vec<Record>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EmployeeResponse {
    pub employee: Record,
}

/// Distinct values per filterable column, for the console's dropdowns.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FiltersResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub filters: std::collections::BTreeMap<String, Vec<String>>,
}

// ============================================================================
// ACCOUNTS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    /// Defaults to the plain admin role; an unrecognized role name falls
    /// back to it as well instead of failing the request.
    #[serde(default, deserialize_with = "de_opt_role")]
    pub role: Option<Role>,
}

fn de_opt_role<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<Role>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.and_then(|s| s.parse::<Role>().ok()))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateAdminRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

impl HasUpdates for UpdateAdminRequest {
    fn has_any_updates(&self) -> bool {
        self.username.is_some()
            || self.password.is_some()
            || self.full_name.is_some()
            || self.role.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminListResponse {
    pub admins: Vec<AdminAccount>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminResponse {
    pub admin: AdminAccount,
}

// ============================================================================
// AUTH
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginResponse {
    pub user: Caller,
    /// Also set as an HttpOnly cookie on the response
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MeResponse {
    pub user: Caller,
}

// ============================================================================
// AUDIT LOG
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Exact match on the action kind
    pub action: Option<String>,
    /// Exact match on the actor username
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LogsResponse {
    pub logs: Vec<AuditEntry>,
    pub pagination: Pagination,
}

// ============================================================================
// STATS AND HEALTH
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatsResponse {
    pub total_employees: i64,
    pub total_admins: i64,
    /// Employee records created today (UTC)
    pub created_today: i64,
    /// Employee records updated today (UTC)
    pub updated_today: i64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub db_pool_size: usize,
}

/// Generic confirmation body for delete and logout endpoints.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_page_count() {
        assert_eq!(Pagination::new(1, 50, 0).pages, 0);
        assert_eq!(Pagination::new(1, 50, 50).pages, 1);
        assert_eq!(Pagination::new(1, 50, 51).pages, 2);
        assert_eq!(Pagination::new(1, 0, 10).pages, 0);
    }

    #[test]
    fn test_update_requests_report_emptiness() {
        assert!(!UpdateColumnRequest::default().has_any_updates());
        assert!(UpdateColumnRequest {
            sort_order: Some(3),
            ..Default::default()
        }
        .has_any_updates());

        assert!(!UpdateAdminRequest::default().has_any_updates());
        assert!(UpdateAdminRequest {
            password: Some("s3cret".to_string()),
            ..Default::default()
        }
        .has_any_updates());
    }

    #[test]
    fn test_list_query_collects_extra_keys_as_filters() -> Result<(), serde_json::Error> {
        let query: ListEmployeesQuery = serde_json::from_str(
            r#"{"search":"jane","page":"2","department":"Engineering","city":"Riga"}"#,
        )?;
        // page arrives as a string from the query layer; flatten captures the rest
        assert_eq!(query.page, Some(2));
        assert_eq!(query.search.as_deref(), Some("jane"));
        assert_eq!(query.filters.get("department").map(String::as_str), Some("Engineering"));
        assert_eq!(query.filters.get("city").map(String::as_str), Some("Riga"));
        assert!(!query.filters.contains_key("search"));
        Ok(())
    }

    #[test]
    fn test_create_admin_role_fallback() -> Result<(), serde_json::Error> {
        let req: CreateAdminRequest = serde_json::from_str(
            r#"{"username":"kai","password":"hunter2","role":"superuser"}"#,
        )?;
        // Unknown role names mean "plain admin", not a rejected request
        assert_eq!(req.role, None);

        let req: CreateAdminRequest =
            serde_json::from_str(r#"{"username":"kai","password":"hunter2","role":"owner"}"#)?;
        assert_eq!(req.role, Some(Role::Owner));

        let req: CreateAdminRequest =
            serde_json::from_str(r#"{"username":"kai","password":"hunter2"}"#)?;
        assert_eq!(req.role, None);
        Ok(())
    }

    #[test]
    fn test_add_column_request_defaults() -> Result<(), serde_json::Error> {
        let req: AddColumnRequest = serde_json::from_str(
            r#"{"column_name":"department","display_name":"Department","data_type":"short_text"}"#,
        )?;
        assert!(!req.admin_only);
        assert!(req.is_nullable);
        assert_eq!(req.data_type, DataType::ShortText);
        Ok(())
    }
}
