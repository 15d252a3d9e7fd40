//! Builder for hand-crafted access tokens
//!
//! Produces tokens the service itself would never issue (expired, foreign
//! issuer, extra grants) to exercise verification and client-side checks.

use crate::crypto_fixtures::{TEST_ACCOUNT_SID, TEST_API_KEY_SID, TEST_API_SECRET};
use chrono::Utc;
use common::access_token::{ACCESS_TOKEN_CONTENT_TYPE, MAX_SESSION_DURATION_SECONDS};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

/// Builder for signed test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_identity("alice")
///     .issued_at(Utc::now().timestamp() - 20_000)
///     .build();
/// ```
pub struct TestTokenBuilder {
    account_sid: String,
    api_key_sid: String,
    secret: String,
    identity: String,
    iat: i64,
    ttl: i64,
    extra_grants: Vec<(String, Value)>,
    content_type: Option<String>,
}

impl TestTokenBuilder {
    /// Create a builder with the fixed test credentials and a fresh 4-hour token
    pub fn new() -> Self {
        Self {
            account_sid: TEST_ACCOUNT_SID.to_string(),
            api_key_sid: TEST_API_KEY_SID.to_string(),
            secret: TEST_API_SECRET.to_string(),
            identity: "test-identity".to_string(),
            iat: Utc::now().timestamp(),
            ttl: MAX_SESSION_DURATION_SECONDS,
            extra_grants: Vec::new(),
            content_type: Some(ACCESS_TOKEN_CONTENT_TYPE.to_string()),
        }
    }

    pub fn for_identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn ttl(mut self, seconds: i64) -> Self {
        self.ttl = seconds;
        self
    }

    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    pub fn issuer(mut self, api_key_sid: &str) -> Self {
        self.api_key_sid = api_key_sid.to_string();
        self
    }

    /// Add a grant besides `video` (e.g. `chat`)
    pub fn with_grant(mut self, name: &str, grant: Value) -> Self {
        self.extra_grants.push((name.to_string(), grant));
        self
    }

    pub fn without_content_type(mut self) -> Self {
        self.content_type = None;
        self
    }

    /// The claims as JSON
    pub fn claims(&self) -> Value {
        let mut grants = json!({
            "identity": self.identity,
            "video": {},
        });
        for (name, grant) in &self.extra_grants {
            grants[name.as_str()] = grant.clone();
        }

        json!({
            "jti": format!("{}-{}", self.api_key_sid, self.iat),
            "iss": self.api_key_sid,
            "sub": self.account_sid,
            "iat": self.iat,
            "exp": self.iat + self.ttl,
            "grants": grants,
        })
    }

    /// Sign and return the compact JWT
    pub fn build(self) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.cty = self.content_type.clone();

        encode(
            &header,
            &self.claims(),
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("test token signing should succeed")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
