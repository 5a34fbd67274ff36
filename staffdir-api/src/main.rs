//! Staffdir API server entry point.
//!
//! Bootstraps configuration, verifies the database schema, seeds the first
//! owner account when the admins table is empty, and starts the Axum HTTP
//! server.

use staffdir_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, Db, DbConfig,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_config = DbConfig::from_env();
    let db = Db::from_config(&db_config)?;
    db.ensure_schema().await?;
    bootstrap_owner(&db).await?;

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env()?;

    let state = AppState::new(db, auth_config);
    let app = create_api_router(state, &api_config);

    let addr = api_config.bind_addr();
    tracing::info!(%addr, "Starting staffdir API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Seed the first owner account on an empty admins table.
///
/// Reads `STAFFDIR_OWNER_USERNAME` / `STAFFDIR_OWNER_PASSWORD`. Without a
/// password the seed is skipped and a warning is logged, since an empty
/// admins table makes every gated endpoint unreachable.
async fn bootstrap_owner(db: &Db) -> ApiResult<()> {
    let conn = db.conn().await?;
    let count: i64 = conn
        .query_one("SELECT COUNT(*) FROM admins", &[])
        .await?
        .get(0);
    if count > 0 {
        return Ok(());
    }

    let username =
        std::env::var("STAFFDIR_OWNER_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = match std::env::var("STAFFDIR_OWNER_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            tracing::warn!(
                "No administrator accounts exist and STAFFDIR_OWNER_PASSWORD is not set. \
                 The API will reject every authenticated request until an owner is seeded."
            );
            return Ok(());
        }
    };

    let password_hash = staffdir_api::auth::hash_password(&password)?;
    conn.execute(
        "INSERT INTO admins (username, password_hash, role) VALUES ($1, $2, 'owner')",
        &[&username, &password_hash],
    )
    .await?;

    tracing::info!(%username, "Seeded initial owner account");
    Ok(())
}
