//! Administrator account endpoints. Owner role required throughout.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use staffdir_core::RecordId;

use crate::error::{ApiError, ApiResult};
use crate::extractors::OwnerSession;
use crate::services::{accounts, audit};
use crate::state::AppState;
use crate::types::{
    AdminListResponse, AdminResponse, CreateAdminRequest, MessageResponse, UpdateAdminRequest,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/admins - List administrator accounts
#[utoipa::path(
    get,
    path = "/api/admins",
    tag = "Admins",
    responses(
        (status = 200, description = "Account listing", body = AdminListResponse),
        (status = 403, description = "Owner access required", body = ApiError),
    )
)]
pub async fn list_admins(
    State(state): State<AppState>,
    OwnerSession(_caller): OwnerSession,
) -> ApiResult<impl IntoResponse> {
    let admins = accounts::list(&state.db).await?;
    Ok(Json(AdminListResponse { admins }))
}

/// POST /api/admins - Create an administrator account
#[utoipa::path(
    post,
    path = "/api/admins",
    tag = "Admins",
    request_body = CreateAdminRequest,
    responses(
        (status = 200, description = "Account created", body = AdminResponse),
        (status = 400, description = "Validation failed or username taken", body = ApiError),
        (status = 403, description = "Owner access required", body = ApiError),
    )
)]
pub async fn create_admin(
    State(state): State<AppState>,
    OwnerSession(caller): OwnerSession,
    headers: HeaderMap,
    Json(req): Json<CreateAdminRequest>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    let admin = accounts::create(&state.db, &caller, &req, ip).await?;
    Ok(Json(AdminResponse { admin }))
}

/// PATCH /api/admins/{id} - Update an administrator account
#[utoipa::path(
    patch,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Account updated", body = AdminResponse),
        (status = 400, description = "Self-modification or empty update", body = ApiError),
        (status = 404, description = "Account not found", body = ApiError),
    )
)]
pub async fn update_admin(
    State(state): State<AppState>,
    OwnerSession(caller): OwnerSession,
    headers: HeaderMap,
    Path(id): Path<RecordId>,
    Json(req): Json<UpdateAdminRequest>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    let admin = accounts::update(&state.db, &caller, id, &req, ip).await?;
    Ok(Json(AdminResponse { admin }))
}

/// DELETE /api/admins/{id} - Delete an administrator account
#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 400, description = "Self-modification or owner account", body = ApiError),
        (status = 404, description = "Account not found", body = ApiError),
    )
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    OwnerSession(caller): OwnerSession,
    headers: HeaderMap,
    Path(id): Path<RecordId>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    accounts::delete(&state.db, &caller, id, ip).await?;
    Ok(Json(MessageResponse::new("Administrator deleted")))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the admin account routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", axum::routing::get(list_admins).post(create_admin))
        .route(
            "/:id",
            axum::routing::patch(update_admin).delete(delete_admin),
        )
}
