//! Property-based tests for session tokens and header handling.
//!
//! A session token minted for any account must validate back to the same
//! identity under the same secret, fail under a different secret, and fail
//! once the clock passes its expiry.

use proptest::prelude::*;
use staffdir_api::auth::{
    clear_session_cookie, extract_session_token, generate_session_token, session_cookie,
    validate_session_token, AuthConfig, FixedClock, JwtSecret, SystemClock,
};
use staffdir_core::Role;
use std::sync::Arc;

const NOW: i64 = 1704067200;

fn config_with(secret: &str, now: i64) -> AuthConfig {
    AuthConfig {
        jwt_secret: JwtSecret::new(secret.to_string()).expect("non-empty secret"),
        jwt_algorithm: jsonwebtoken::Algorithm::HS256,
        session_ttl_secs: 3600,
        clock: Arc::new(FixedClock(now)),
    }
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Owner)]
}

proptest! {
    /// Round trip: claims come back exactly as issued.
    #[test]
    fn token_round_trips_identity(
        id in 1i64..1_000_000,
        username in "[a-z][a-z0-9_.]{0,20}",
        role in role_strategy(),
    ) {
        let config = config_with("property-test-secret", NOW);
        let token = generate_session_token(&config, id, &username, role).unwrap();
        let claims = validate_session_token(&config, &token).unwrap();

        prop_assert_eq!(claims.account_id().unwrap(), id);
        prop_assert_eq!(claims.username, username);
        prop_assert_eq!(claims.role, role);
        prop_assert_eq!(claims.exp, NOW + config.session_ttl_secs);
    }

    /// A token never validates under a different secret.
    #[test]
    fn token_bound_to_secret(
        id in 1i64..1_000_000,
        username in "[a-z][a-z0-9]{0,12}",
        other_secret in "[a-zA-Z0-9]{8,32}",
    ) {
        prop_assume!(other_secret != "property-test-secret");

        let issuing = config_with("property-test-secret", NOW);
        let token = generate_session_token(&issuing, id, &username, Role::Admin).unwrap();

        let other = config_with(&other_secret, NOW);
        prop_assert!(validate_session_token(&other, &token).is_err());
    }

    /// Validation fails exactly when the clock passes expiry.
    #[test]
    fn token_expiry_is_clock_driven(age in 0i64..20_000) {
        let issuing = config_with("property-test-secret", NOW);
        let token = generate_session_token(&issuing, 1, "root", Role::Owner).unwrap();

        let later = config_with("property-test-secret", NOW + age);
        let result = validate_session_token(&later, &token);
        if age <= issuing.session_ttl_secs {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Whatever token the login cookie carries, extraction recovers it
    /// regardless of surrounding cookies.
    #[test]
    fn cookie_extraction_recovers_token(
        token in "[A-Za-z0-9_-]{10,60}\\.[A-Za-z0-9_-]{10,60}\\.[A-Za-z0-9_-]{10,60}",
        leading in "[a-z]{1,8}=[a-z0-9]{1,8}",
        trailing in "[a-z]{1,8}=[a-z0-9]{1,8}",
    ) {
        let cookie = session_cookie(&token, 3600);
        let pair = cookie.split(';').next().unwrap();

        let mut headers = axum::http::HeaderMap::new();
        let combined = format!("{}; {}; {}", leading, pair, trailing);
        headers.insert("cookie", combined.parse().unwrap());

        prop_assert_eq!(extract_session_token(&headers), Some(token));
    }
}

#[test]
fn clear_cookie_expires_immediately() {
    assert!(clear_session_cookie().contains("Max-Age=0"));
}

#[test]
fn default_clock_is_current() {
    use staffdir_api::auth::SessionClock;
    let now = SystemClock.now_epoch_secs();
    assert!(now > NOW);
}
