//! Filter value endpoint: distinct values for the console's dropdowns.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::{ApiError, ApiResult};
use crate::extractors::OptionalSession;
use crate::services::records;
use crate::state::AppState;
use crate::types::FiltersResponse;

/// GET /api/filters - Distinct values per filterable column
#[utoipa::path(
    get,
    path = "/api/filters",
    tag = "Employees",
    responses(
        (status = 200, description = "Filter values", body = FiltersResponse),
        (status = 500, description = "Database error", body = ApiError),
    )
)]
pub async fn list_filters(
    State(state): State<AppState>,
    OptionalSession(caller): OptionalSession,
) -> ApiResult<impl IntoResponse> {
    let filters = records::distinct_filters(&state.db, caller.as_ref()).await?;
    Ok(Json(FiltersResponse { filters }))
}

/// Create the filter routes router.
pub fn create_router() -> axum::Router<AppState> {
    axum::Router::new().route("/", axum::routing::get(list_filters))
}
