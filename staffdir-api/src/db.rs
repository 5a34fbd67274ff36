//! Database connection pool.
//!
//! PostgreSQL connection pooling via deadpool-postgres. The `Db` wrapper
//! hands out pooled connections and applies the bootstrap schema on startup.
//! All multi-statement mutations elsewhere in the crate run inside
//! `Object::transaction()` so the registry and the physical schema can never
//! diverge on a partial failure.

use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use crate::error::{ApiError, ApiResult};

/// Bootstrap DDL for the four persisted tables.
const SCHEMA_SQL: &str = include_str!("../migrations/schema.sql");

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "staffdir".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("STAFFDIR_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("STAFFDIR_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("STAFFDIR_DB_NAME").unwrap_or_else(|_| "staffdir".to_string()),
            user: std::env::var("STAFFDIR_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("STAFFDIR_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("STAFFDIR_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("STAFFDIR_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// DATABASE HANDLE
// ============================================================================

/// Shared database handle wrapping the connection pool.
#[derive(Clone)]
pub struct Db {
    pool: Pool,
}

impl Db {
    /// Create a new database handle with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database handle from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get a connection from the pool.
    pub async fn conn(&self) -> ApiResult<Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Apply the bootstrap schema. Idempotent (`CREATE TABLE IF NOT EXISTS`).
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.conn().await?;
        conn.batch_execute(SCHEMA_SQL).await?;
        tracing::info!("Database schema verified");
        Ok(())
    }

    /// Current pool size for the health endpoint.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }
}
