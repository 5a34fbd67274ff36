//! Authentication primitives.
//!
//! Session tokens are HS256 JWTs carried in an HttpOnly cookie (set at
//! login) or an `Authorization: Bearer` header. Passwords are hashed with
//! argon2; the hash never leaves this module in clear form and the JWT
//! secret is wrapped in `secrecy` so it cannot be logged by accident.
//!
//! Token validation owns its own time check through an injectable clock,
//! keeping tests deterministic.

use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use staffdir_core::{RecordId, Role};
use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::{ApiError, ApiResult};

/// Name of the session cookie set at login.
pub const SESSION_COOKIE: &str = "auth_token";

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for token time validation.
pub trait SessionClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SessionClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl SessionClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// Type-safe JWT secret with a redacted Debug representation.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret.
    ///
    /// # Errors
    /// Returns an error if the secret is empty.
    pub fn new(secret: String) -> ApiResult<Self> {
        if secret.is_empty() {
            return Err(ApiError::internal_error("JWT secret must not be empty"));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Check if the secret is the insecure default.
    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.0.expose_secret().len())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing and verification
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (HS256)
    pub jwt_algorithm: Algorithm,

    /// Session lifetime in seconds (default: 7 days, matching the cookie)
    pub session_ttl_secs: i64,

    /// Clock used for issuing and validating token times
    pub clock: Arc<dyn SessionClock>,
}

impl AuthConfig {
    /// Load authentication configuration from environment variables.
    ///
    /// `STAFFDIR_JWT_SECRET` must be set in production; a missing value
    /// falls back to an insecure default and logs a warning.
    pub fn from_env() -> ApiResult<Self> {
        let secret = std::env::var("STAFFDIR_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        let jwt_secret = JwtSecret::new(secret)?;
        if jwt_secret.is_insecure_default() {
            tracing::warn!(
                "STAFFDIR_JWT_SECRET is not set - using an insecure default. \
                 Do not run this configuration in production."
            );
        }

        let session_ttl_secs = std::env::var("STAFFDIR_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7 * 24 * 60 * 60);

        Ok(Self {
            jwt_secret,
            jwt_algorithm: Algorithm::HS256,
            session_ttl_secs,
            clock: Arc::new(SystemClock),
        })
    }

    /// Configuration for tests, with a fixed clock and known secret.
    #[cfg(test)]
    pub fn for_tests(now_epoch_secs: i64) -> Self {
        Self {
            jwt_secret: JwtSecret::new("test-secret".to_string()).expect("non-empty"),
            jwt_algorithm: Algorithm::HS256,
            session_ttl_secs: 3600,
            clock: Arc::new(FixedClock(now_epoch_secs)),
        }
    }
}

// ============================================================================
// CALLER AND CLAIMS
// ============================================================================

/// The resolved identity of an authenticated administrator.
///
/// Every gated service operation takes a `Caller` as an explicit argument;
/// authorization is an input, not ambient state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Caller {
    pub id: RecordId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: Role,
}

impl Caller {
    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }
}

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, stringified
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Issued-at, epoch seconds
    pub iat: i64,
    /// Expiration, epoch seconds
    pub exp: i64,
}

impl Claims {
    /// Build claims for an account using the config's clock and TTL.
    pub fn new(config: &AuthConfig, id: RecordId, username: &str, role: Role) -> Self {
        let now = config.clock.now_epoch_secs();
        Self {
            sub: id.to_string(),
            username: username.to_string(),
            role,
            iat: now,
            exp: now + config.session_ttl_secs,
        }
    }

    /// Parse the subject back into an account id.
    pub fn account_id(&self) -> ApiResult<RecordId> {
        self.sub
            .parse::<RecordId>()
            .map_err(|_| ApiError::invalid_token("Token subject is not an account id"))
    }
}

// ============================================================================
// TOKEN OPERATIONS
// ============================================================================

/// Generate a session token for an account.
pub fn generate_session_token(
    config: &AuthConfig,
    id: RecordId,
    username: &str,
    role: Role,
) -> ApiResult<String> {
    let claims = Claims::new(config, id, username, role);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Validate a session token and extract its claims.
///
/// Signature validation is delegated to `jsonwebtoken`; expiry is checked
/// against the injected clock so tests can pin time.
pub fn validate_session_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false; // checked below with our clock
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;
    if claims.exp < config.clock.now_epoch_secs() {
        return Err(ApiError::token_expired());
    }

    Ok(claims)
}

// ============================================================================
// COOKIE AND HEADER HANDLING
// ============================================================================

/// Extract a session token from the request headers.
///
/// Checks `Authorization: Bearer` first, then the session cookie.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("authorization").and_then(|h| h.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = headers.get("cookie").and_then(|h| h.to_str().ok())?;
    for pair in cookies.split(';') {
        let pair = pair.trim();
        if let Some(token) = pair.strip_prefix(SESSION_COOKIE) {
            if let Some(value) = token.strip_prefix('=') {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// `Set-Cookie` value installing the session cookie.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", SESSION_COOKIE)
}

// ============================================================================
// PASSWORD HASHING
// ============================================================================

/// Hash a password with argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored argon2 hash.
///
/// Malformed stored hashes verify as false rather than erroring; a broken
/// row must not become a login bypass or a 500.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const NOW: i64 = 1704067200; // 2024-01-01 00:00:00 UTC

    #[test]
    fn test_token_round_trip() {
        let config = AuthConfig::for_tests(NOW);
        let token = generate_session_token(&config, 42, "root", Role::Owner).unwrap();
        let claims = validate_session_token(&config, &token).unwrap();

        assert_eq!(claims.account_id().unwrap(), 42);
        assert_eq!(claims.username, "root");
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + config.session_ttl_secs);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuing = AuthConfig::for_tests(NOW);
        let token = generate_session_token(&issuing, 1, "root", Role::Admin).unwrap();

        // Validate from a clock two hours later than a one-hour TTL
        let later = AuthConfig::for_tests(NOW + 7200);
        let err = validate_session_token(&later, &token).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TokenExpired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = AuthConfig::for_tests(NOW);
        let token = generate_session_token(&config, 1, "root", Role::Admin).unwrap();

        let mut other = AuthConfig::for_tests(NOW);
        other.jwt_secret = JwtSecret::new("another-secret".to_string()).unwrap();
        assert!(validate_session_token(&other, &token).is_err());
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; auth_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_ignores_empty_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("auth_token="));
        assert_eq!(extract_session_token(&headers), None);
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", 604800);
        assert!(cookie.starts_with("auth_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=604800"));

        let cleared = clear_session_cookie();
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }

    #[test]
    fn test_jwt_secret_debug_redacted() {
        let secret = JwtSecret::new("super-secret-value".to_string()).unwrap();
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("REDACTED"));
    }
}
