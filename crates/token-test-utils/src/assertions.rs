//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for access tokens returned by `/token`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use common::access_token::{ACCESS_TOKEN_CONTENT_TYPE, MAX_SESSION_DURATION_SECONDS};
use serde_json::Value;
use token_service::config::ApiCredentials;
use token_service::crypto::verify_access_token;

fn decode_segment(token: &str, index: usize, what: &str) -> Value {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no {} segment", what));
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT {}: {:?}", what, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT {} JSON: {:?}", what, e))
}

fn header(token: &str) -> Value {
    decode_segment(token, 0, "header")
}

fn payload(token: &str) -> Value {
    decode_segment(token, 1, "payload")
}

/// Custom assertions for access tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_access_token()
///     .assert_for_identity("Bob")
///     .assert_video_grant_only()
///     .assert_verifies_with(&test_credentials());
/// ```
pub trait TokenAssertions {
    /// Assert three segments, an HS256 header with the access-token `cty`,
    /// and a payload carrying the standard claims
    fn assert_valid_access_token(&self) -> &Self;

    /// Assert that the token is bound to the given identity
    fn assert_for_identity(&self, identity: &str) -> &Self;

    /// Assert that the grants hold the identity and an empty video grant, nothing else
    fn assert_video_grant_only(&self) -> &Self;

    /// Assert the token lives exactly for the session duration
    fn assert_session_lifetime(&self) -> &Self;

    /// Assert that the token expires within the specified seconds (5s tolerance)
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// Assert issuer and subject match the credentials and the signature verifies
    fn assert_verifies_with(&self, credentials: &ApiCredentials) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_access_token(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = header(self);
        assert_eq!(header["alg"], "HS256", "Expected HS256 algorithm");
        assert_eq!(header["typ"], "JWT", "Expected JWT type");
        assert_eq!(
            header["cty"], ACCESS_TOKEN_CONTENT_TYPE,
            "Expected access-token content type"
        );

        let claims = payload(self);
        for claim in ["jti", "iss", "sub", "iat", "exp", "grants"] {
            assert!(
                claims.get(claim).is_some(),
                "Token is missing claim '{}': {}",
                claim,
                claims
            );
        }

        self
    }

    fn assert_for_identity(&self, identity: &str) -> &Self {
        let claims = payload(self);
        assert_eq!(
            claims["grants"]["identity"], identity,
            "Expected identity '{}', got {}",
            identity, claims["grants"]["identity"]
        );

        self
    }

    fn assert_video_grant_only(&self) -> &Self {
        let claims = payload(self);
        let grants = claims["grants"]
            .as_object()
            .unwrap_or_else(|| panic!("grants must be an object: {}", claims));

        let mut keys: Vec<_> = grants.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["identity", "video"],
            "Unexpected grants: {}",
            claims["grants"]
        );
        assert_eq!(
            grants.get("video"),
            Some(&Value::Object(serde_json::Map::new())),
            "Video grant must be empty (not bound to a room)"
        );

        self
    }

    fn assert_session_lifetime(&self) -> &Self {
        let claims = payload(self);
        let iat = claims["iat"].as_i64().unwrap_or_else(|| panic!("iat missing"));
        let exp = claims["exp"].as_i64().unwrap_or_else(|| panic!("exp missing"));
        assert_eq!(
            exp - iat,
            MAX_SESSION_DURATION_SECONDS,
            "Expected a {}s lifetime, got {}s",
            MAX_SESSION_DURATION_SECONDS,
            exp - iat
        );

        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims = payload(self);
        let exp = claims["exp"].as_i64().unwrap_or_else(|| panic!("exp missing"));

        let now = chrono::Utc::now().timestamp();
        let expires_in = exp - now;

        // Allow 5-second tolerance for clock skew
        assert!(
            (expires_in - seconds as i64).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );

        self
    }

    fn assert_verifies_with(&self, credentials: &ApiCredentials) -> &Self {
        let result = verify_access_token(self, credentials);
        assert!(
            result.is_ok(),
            "Token failed verification: {:?}",
            result.err()
        );

        self
    }
}
