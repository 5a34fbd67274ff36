//! Shared application state for Axum routers.

use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::db::Db;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Database handle wrapping the connection pool.
    pub db: Db,
    /// Authentication configuration (JWT secret, clock, session TTL).
    pub auth: Arc<AuthConfig>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(db: Db, auth: AuthConfig) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
            start_time: std::time::Instant::now(),
        }
    }
}

// FromRef lets extractors pull just the piece of state they need.
macro_rules! impl_from_ref {
    ($ty:ty, $field:ident) => {
        impl axum::extract::FromRef<AppState> for $ty {
            fn from_ref(state: &AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}

impl_from_ref!(Db, db);
impl_from_ref!(Arc<AuthConfig>, auth);
