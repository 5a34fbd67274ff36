//! Audit log endpoints. Read-only by construction: there is no route that
//! mutates the log.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Session;
use crate::services::audit;
use crate::state::AppState;
use crate::types::{LogsQuery, LogsResponse};

/// GET /api/logs - List audit entries, newest first
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("action" = Option<String>, Query, description = "Filter by action kind"),
        ("actor" = Option<String>, Query, description = "Filter by actor username"),
    ),
    responses(
        (status = 200, description = "Audit entries", body = LogsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Session(_caller): Session,
    Query(query): Query<LogsQuery>,
) -> ApiResult<impl IntoResponse> {
    let (logs, pagination) = audit::list(&state.db, &query).await?;
    Ok(Json(LogsResponse { logs, pagination }))
}

/// Create the audit log routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new().route("/", axum::routing::get(list_logs))
}
