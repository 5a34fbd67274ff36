//! API configuration.
//!
//! Server bind address and CORS settings, loaded from environment variables
//! with development-friendly defaults.

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Server-level configuration for the HTTP listener and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host for the HTTP listener
    pub host: String,

    /// Bind port for the HTTP listener
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests. The session cookie
    /// requires this when the console is served from another origin.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(), // Empty = allow all
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `STAFFDIR_HOST`: Bind host (default: 0.0.0.0)
    /// - `STAFFDIR_PORT`: Bind port (default: 8080)
    /// - `STAFFDIR_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `STAFFDIR_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `STAFFDIR_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    pub fn from_env() -> Self {
        let host = std::env::var("STAFFDIR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("STAFFDIR_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let cors_origins = std::env::var("STAFFDIR_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("STAFFDIR_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("STAFFDIR_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Self {
            host,
            port,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
        }
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert!(!config.is_production());
    }

    #[test]
    fn test_is_production() {
        let mut config = ApiConfig::default();
        config.cors_origins = vec!["https://directory.example.com".to_string()];
        assert!(config.is_production());
    }
}
