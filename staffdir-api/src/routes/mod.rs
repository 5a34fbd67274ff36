//! REST API routes.
//!
//! Authorization is enforced per handler through the session extractors
//! rather than a blanket middleware: reads on the directory are public but
//! shaped, mutations need a session, and account management needs the owner
//! role.

pub mod admins;
pub mod auth;
pub mod columns;
pub mod employees;
pub mod filters;
pub mod health;
pub mod logs;
pub mod stats;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins. In production
/// mode, only configured origins; credentials must be enabled there for the
/// session cookie to travel cross-origin.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: development mode, allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: production mode");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        let cors = cors
            .allow_origin(origins)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);
        if config.cors_allow_credentials {
            cors.allow_credentials(true)
        } else {
            cors
        }
    }
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// - `/api/*` — directory endpoints
/// - `/health` — liveness probe (public)
/// - `/openapi.json` — API description
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> Router {
    let api = Router::new()
        .nest("/auth", auth::create_router())
        .nest("/columns", columns::create_router())
        .nest("/employees", employees::create_router())
        .nest("/admins", admins::create_router())
        .nest("/logs", logs::create_router())
        .nest("/filters", filters::create_router())
        .nest("/stats", stats::create_router());

    Router::new()
        .nest("/api", api)
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
        .with_state(state)
}
