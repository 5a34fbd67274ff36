//! Dynamic column endpoints.
//!
//! Listing is public so the directory can render without a session, but
//! anonymous callers only see visible, non-admin-only columns. Mutations go
//! through the schema mutator, which pairs DDL with registry metadata in
//! one transaction.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{OptionalSession, Session};
use crate::services::{audit, registry, schema};
use crate::state::AppState;
use crate::types::{AddColumnRequest, ColumnListResponse, MessageResponse, UpdateColumnRequest};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/columns - List dynamic columns in display order
///
/// The four always-present columns (`id`, `full_name`, timestamps) are not
/// part of the managed set and never appear here. Anonymous callers do not
/// see hidden or admin-only columns.
#[utoipa::path(
    get,
    path = "/api/columns",
    tag = "Columns",
    responses(
        (status = 200, description = "Column listing", body = ColumnListResponse),
    )
)]
pub async fn list_columns(
    State(state): State<AppState>,
    OptionalSession(caller): OptionalSession,
) -> ApiResult<impl IntoResponse> {
    let conn = state.db.conn().await?;
    let columns = registry::list_columns(&**conn).await?;
    let shaped = registry::visible_for(&columns, caller.as_ref());
    Ok(Json(ColumnListResponse {
        columns: registry::dynamic_columns(&shaped),
    }))
}

/// POST /api/columns - Add a dynamic column
#[utoipa::path(
    post,
    path = "/api/columns",
    tag = "Columns",
    request_body = AddColumnRequest,
    responses(
        (status = 200, description = "Column added", body = staffdir_core::ColumnDefinition),
        (status = 400, description = "Invalid name, reserved name, or duplicate", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn add_column(
    State(state): State<AppState>,
    Session(caller): Session,
    headers: HeaderMap,
    Json(req): Json<AddColumnRequest>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    let definition = schema::add_column(&state.db, &caller, &req, ip).await?;
    Ok(Json(definition))
}

/// PATCH /api/columns/{name} - Update column metadata
#[utoipa::path(
    patch,
    path = "/api/columns/{name}",
    tag = "Columns",
    params(("name" = String, Path, description = "Column name")),
    request_body = UpdateColumnRequest,
    responses(
        (status = 200, description = "Column updated", body = staffdir_core::ColumnDefinition),
        (status = 400, description = "Protected column or empty update", body = ApiError),
        (status = 404, description = "Column not found", body = ApiError),
    )
)]
pub async fn update_column(
    State(state): State<AppState>,
    Session(caller): Session,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(req): Json<UpdateColumnRequest>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    let definition = schema::update_column(&state.db, &caller, &name, &req, ip).await?;
    Ok(Json(definition))
}

/// DELETE /api/columns/{name} - Drop a column and its data
#[utoipa::path(
    delete,
    path = "/api/columns/{name}",
    tag = "Columns",
    params(("name" = String, Path, description = "Column name")),
    responses(
        (status = 200, description = "Column dropped", body = MessageResponse),
        (status = 400, description = "Protected column", body = ApiError),
        (status = 404, description = "Column not found", body = ApiError),
    )
)]
pub async fn drop_column(
    State(state): State<AppState>,
    Session(caller): Session,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    schema::drop_column(&state.db, &caller, &name, ip).await?;
    Ok(Json(MessageResponse::new(format!(
        "Column '{}' dropped",
        name
    ))))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the column routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/",
            axum::routing::get(list_columns).post(add_column),
        )
        .route(
            "/:name",
            axum::routing::patch(update_column).delete(drop_column),
        )
}
