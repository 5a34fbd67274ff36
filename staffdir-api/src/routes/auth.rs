//! Session endpoints: login, logout, current identity.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};

use crate::auth::{clear_session_cookie, session_cookie};
use crate::error::{ApiError, ApiResult};
use crate::extractors::Session;
use crate::services::{accounts, audit};
use crate::state::AppState;
use crate::types::{LoginRequest, LoginResponse, MeResponse, MessageResponse};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/auth/login - Verify credentials and start a session
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session started", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    let (user, token) =
        accounts::authenticate(&state.db, &state.auth, &req.username, &req.password, ip).await?;

    let cookie = session_cookie(&token, state.auth.session_ttl_secs);
    let response = LoginResponse { user, token };
    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /api/auth/logout - End the session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session ended", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Session(caller): Session,
) -> ApiResult<impl IntoResponse> {
    let ip = audit::client_ip(&headers);
    accounts::sign_out(&state.db, &caller, ip).await;

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse::new("Signed out")),
    ))
}

/// GET /api/auth/me - Identity behind the current session
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current administrator", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn me(Session(caller): Session) -> ApiResult<impl IntoResponse> {
    Ok(Json(MeResponse { user: caller }))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the auth routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/login", axum::routing::post(login))
        .route("/logout", axum::routing::post(logout))
        .route("/me", axum::routing::get(me))
}
