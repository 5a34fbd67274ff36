//! Staffdir API - REST layer for the employee directory.
//!
//! The directory's defining feature is its dynamic schema: administrators
//! add and remove columns of the employee table at runtime, and the rest of
//! the API reshapes itself around the current column set. The crate is
//! organized as:
//!
//! - [`services`] — SQL-facing subsystems (registry, schema mutator, record
//!   store, accounts, audit log)
//! - [`routes`] — thin Axum handlers over the services
//! - [`auth`] / [`extractors`] — JWT sessions and role gating
//! - [`sql`] — dynamic row decoding and parameter binding

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod sql;
pub mod state;
pub mod types;
pub mod validation;

pub use auth::AuthConfig;
pub use config::ApiConfig;
pub use db::{Db, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
