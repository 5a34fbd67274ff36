//! Dashboard counters.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::{ApiError, ApiResult};
use crate::extractors::Session;
use crate::services::records;
use crate::state::AppState;
use crate::types::StatsResponse;

/// GET /api/stats - Directory totals and today's activity
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Directory statistics", body = StatsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Session(_caller): Session,
) -> ApiResult<impl IntoResponse> {
    let stats = records::stats(&state.db).await?;
    Ok(Json(stats))
}

/// Create the stats routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new().route("/", axum::routing::get(get_stats))
}
