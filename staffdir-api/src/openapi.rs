//! OpenAPI documentation, served at `/openapi.json`.

use utoipa::OpenApi;

use crate::auth::Caller;
use crate::error::{ApiError, ErrorCode};
use crate::types::{
    AddColumnRequest, AdminListResponse, AdminResponse, ColumnListResponse, CreateAdminRequest,
    EmployeeListResponse, EmployeeResponse, FiltersResponse, HealthResponse, LoginRequest,
    LoginResponse, LogsResponse, MeResponse, MessageResponse, Pagination, StatsResponse,
    UpdateAdminRequest, UpdateColumnRequest,
};
use staffdir_core::{ActionKind, AdminAccount, AuditEntry, ColumnDefinition, DataType, Record, Role};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staffdir API",
        description = "Employee directory with dynamic columns",
    ),
    paths(
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::columns::list_columns,
        crate::routes::columns::add_column,
        crate::routes::columns::update_column,
        crate::routes::columns::drop_column,
        crate::routes::employees::list_employees,
        crate::routes::employees::get_employee,
        crate::routes::employees::create_employee,
        crate::routes::employees::update_employee,
        crate::routes::employees::delete_employee,
        crate::routes::admins::list_admins,
        crate::routes::admins::create_admin,
        crate::routes::admins::update_admin,
        crate::routes::admins::delete_admin,
        crate::routes::logs::list_logs,
        crate::routes::filters::list_filters,
        crate::routes::stats::get_stats,
        crate::routes::health::health,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        Caller,
        Role,
        DataType,
        ActionKind,
        Record,
        ColumnDefinition,
        AdminAccount,
        AuditEntry,
        Pagination,
        AddColumnRequest,
        UpdateColumnRequest,
        ColumnListResponse,
        EmployeeListResponse,
        EmployeeResponse,
        FiltersResponse,
        CreateAdminRequest,
        UpdateAdminRequest,
        AdminListResponse,
        AdminResponse,
        LoginRequest,
        LoginResponse,
        MeResponse,
        LogsResponse,
        StatsResponse,
        HealthResponse,
        MessageResponse,
    )),
    tags(
        (name = "Auth", description = "Session management"),
        (name = "Columns", description = "Dynamic column management"),
        (name = "Employees", description = "Employee records"),
        (name = "Admins", description = "Administrator accounts"),
        (name = "Logs", description = "Audit log"),
        (name = "Stats", description = "Dashboard counters"),
        (name = "Health", description = "Health checks"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(!doc.paths.paths.is_empty());
        assert!(doc.paths.paths.contains_key("/api/employees"));
        assert!(doc.paths.paths.contains_key("/api/columns/{name}"));
    }
}
