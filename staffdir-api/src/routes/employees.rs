//! Employee record endpoints.
//!
//! Reads are open but shaped by the caller: anonymous requests only see
//! visible, non-admin-only columns. Mutations require a session. Bodies are
//! open JSON objects validated against the column registry.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use staffdir_core::RecordId;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{OptionalSession, Session};
use crate::services::{audit, records};
use crate::state::AppState;
use crate::types::{
    EmployeeListResponse, EmployeeResponse, ListEmployeesQuery, MessageResponse,
};

fn body_as_fields(body: serde_json::Value) -> ApiResult<serde_json::Map<String, serde_json::Value>> {
    match body {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(ApiError::validation_failed("Request body must be a JSON object")),
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/employees - List employees with search, filters, and pagination
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    params(
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("limit" = Option<i64>, Query, description = "Page size"),
    ),
    responses(
        (status = 200, description = "Employee listing", body = EmployeeListResponse),
        (status = 400, description = "Unknown filter column", body = ApiError),
    )
)]
pub async fn list_employees(
    State(state): State<AppState>,
    OptionalSession(caller): OptionalSession,
    Query(query): Query<ListEmployeesQuery>,
) -> ApiResult<impl IntoResponse> {
    let (employees, pagination) = records::list(&state.db, caller.as_ref(), &query).await?;
    Ok(Json(EmployeeListResponse {
        employees,
        pagination,
    }))
}

/// GET /api/employees/{id} - Fetch one employee
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee record", body = EmployeeResponse),
        (status = 404, description = "Employee not found", body = ApiError),
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    OptionalSession(caller): OptionalSession,
    Path(id): Path<RecordId>,
) -> ApiResult<impl IntoResponse> {
    let employee = records::get(&state.db, caller.as_ref(), id).await?;
    Ok(Json(EmployeeResponse { employee }))
}

/// POST /api/employees - Create an employee record
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Session(caller): Session,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    let fields = body_as_fields(body)?;
    let ip = audit::client_ip(&headers);
    let employee = records::create(&state.db, &caller, &fields, ip).await?;
    Ok(Json(EmployeeResponse { employee }))
}

/// PATCH /api/employees/{id} - Update an employee record
#[utoipa::path(
    patch,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Validation failed or empty update", body = ApiError),
        (status = 404, description = "Employee not found", body = ApiError),
    )
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Session(caller): Session,
    headers: HeaderMap,
    Path(id): Path<RecordId>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    let fields = body_as_fields(body)?;
    let ip = audit::client_ip(&headers);
    let employee = records::update(&state.db, &caller, id, &fields, ip).await?;
    Ok(Json(EmployeeResponse { employee }))
}

/// DELETE /api/employees/{id} - Delete an employee record
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted", body = MessageResponse),
        (status = 404, description = "Employee not found", body = ApiError),
    )
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Session(caller): Session,
    headers: HeaderMap,
    Path(id): Path<RecordId>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    records::delete(&state.db, &caller, id, ip).await?;
    Ok(Json(MessageResponse::new("Employee deleted")))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the employee routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/",
            axum::routing::get(list_employees).post(create_employee),
        )
        .route(
            "/:id",
            axum::routing::get(get_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_must_be_object() {
        assert!(body_as_fields(json!({"full_name": "Jane"})).is_ok());
        assert!(body_as_fields(json!(["full_name"])).is_err());
        assert!(body_as_fields(json!("full_name")).is_err());
        assert!(body_as_fields(json!(null)).is_err());
    }
}
