//! Session extractors for route handlers.
//!
//! Handlers take `Session` (any authenticated admin), `OwnerSession` (owner
//! role required), or `OptionalSession`. A token is only half of a session:
//! the claims must also resolve to a live row in the admins table, so a
//! deleted account is locked out immediately even with an unexpired token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use staffdir_core::Role;

use crate::auth::{extract_session_token, validate_session_token, Caller};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Resolve the request's token into a live caller, or fail with 401.
async fn resolve_caller(parts: &Parts, state: &AppState) -> ApiResult<Caller> {
    let token = extract_session_token(&parts.headers)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let claims = validate_session_token(&state.auth, &token)?;
    let account_id = claims.account_id()?;

    let conn = state.db.conn().await?;
    let row = conn
        .query_opt(
            "SELECT id, username, full_name, role FROM admins WHERE id = $1",
            &[&account_id],
        )
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|_| ApiError::internal_error("Account has an unknown role"))?;

    Ok(Caller {
        id: row.get("id"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        role,
    })
}

// ============================================================================
// EXTRACTORS
// ============================================================================

/// Any authenticated administrator.
#[derive(Debug, Clone)]
pub struct Session(pub Caller);

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        resolve_caller(parts, state).await.map(Session)
    }
}

/// An authenticated administrator holding the owner role.
#[derive(Debug, Clone)]
pub struct OwnerSession(pub Caller);

#[axum::async_trait]
impl FromRequestParts<AppState> for OwnerSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        let caller = resolve_caller(parts, state).await?;
        if !caller.is_owner() {
            return Err(ApiError::forbidden("Owner access required"));
        }
        Ok(OwnerSession(caller))
    }
}

/// A session if present and valid, `None` otherwise.
///
/// Used by read endpoints whose response shape depends on the caller's
/// privileges rather than on authentication itself.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<Caller>);

#[axum::async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        if extract_session_token(&parts.headers).is_none() {
            return Ok(OptionalSession(None));
        }
        match resolve_caller(parts, state).await {
            Ok(caller) => Ok(OptionalSession(Some(caller))),
            // An invalid or stale token downgrades to anonymous
            Err(_) => Ok(OptionalSession(None)),
        }
    }
}
