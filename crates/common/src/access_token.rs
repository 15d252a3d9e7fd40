//! Access-token wire format shared by the token service and its clients.
//!
//! An access token is an HS256-signed JWT understood by the real-time media
//! SDK. The participant identity lives in `grants.identity`; `sub` carries the
//! account identifier and `iss` the API key identifier.
//!
//! ```text
//! header:  { "alg": "HS256", "typ": "JWT", "cty": "twilio-fpa;v=1" }
//! payload: { "jti", "iss", "sub", "iat", "exp", "grants": { "identity", "video": {} } }
//! ```
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - [`peek_claims`] does NOT verify signatures; servers must verify with the
//!   API secret before trusting any claim
//! - Identities and token strings are redacted in Debug output

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum period a participant may stay in a room with one token (4 hours).
///
/// Every issued token expires exactly this many seconds after `iat`.
pub const MAX_SESSION_DURATION_SECONDS: i64 = 14_400;

/// JWT `cty` header value required by the media SDK.
pub const ACCESS_TOKEN_CONTENT_TYPE: &str = "twilio-fpa;v=1";

/// Maximum accepted token size in bytes (8KB).
///
/// Issued tokens are ~400 bytes; anything larger is rejected before any
/// base64 decoding or signature work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

// =============================================================================
// Error Types
// =============================================================================

/// Errors from inspecting a token without verifying it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not a three-part JWT with a JSON payload in the expected shape.
    #[error("The access token is invalid or expired")]
    MalformedToken,
}

// =============================================================================
// Claims Types
// =============================================================================

/// Video calling capability.
///
/// Serialized as an empty object: the grant carries no room restriction, so
/// the holder may join any room of the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoGrant {}

/// Grant bundle embedded in an access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grants {
    /// Participant identity bound to the token.
    pub identity: String,

    /// The single capability this system grants.
    pub video: VideoGrant,
}

impl fmt::Debug for Grants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grants")
            .field("identity", &"[REDACTED]")
            .field("video", &self.video)
            .finish()
    }
}

/// Access-token claims.
///
/// Debug output redacts the identity and account identifier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Token id: `<api_key_sid>-<iat>`.
    pub jti: String,

    /// Issuer: the API key identifier.
    pub iss: String,

    /// Subject: the account identifier.
    pub sub: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Identity and capabilities.
    pub grants: Grants,
}

impl fmt::Debug for AccessTokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenClaims")
            .field("jti", &self.jti)
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("grants", &self.grants)
            .finish()
    }
}

impl AccessTokenClaims {
    /// Build claims for a video-calling token issued at `iat`.
    ///
    /// The token lives for [`MAX_SESSION_DURATION_SECONDS`].
    #[must_use]
    pub fn video(account_sid: &str, api_key_sid: &str, identity: &str, iat: i64) -> Self {
        Self {
            jti: format!("{api_key_sid}-{iat}"),
            iss: api_key_sid.to_string(),
            sub: account_sid.to_string(),
            iat,
            exp: iat + MAX_SESSION_DURATION_SECONDS,
            grants: Grants {
                identity: identity.to_string(),
                video: VideoGrant::default(),
            },
        }
    }

    /// Participant identity bound to this token.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.grants.identity
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.exp - self.iat
    }

    /// Whether the token has expired at `now` (Unix epoch seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// Body of a successful `GET /token` response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Identity bound into `token`.
    pub identity: String,

    /// Compact serialized signed JWT.
    pub token: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("identity", &self.identity)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Decode the claims of a token WITHOUT verifying its signature.
///
/// Clients use this to read the identity and expiry of a token they were
/// handed; they do not hold the API secret and cannot verify it.
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - Wrong structure, bad base64, or payload not claims JSON
pub fn peek_claims(token: &str) -> Result<AccessTokenClaims, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.access_token",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.access_token",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let payload_part = parts.get(1).ok_or(JwtValidationError::MalformedToken)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_part).map_err(|e| {
        tracing::debug!(target: "common.access_token", error = %e, "Failed to decode JWT payload base64");
        JwtValidationError::MalformedToken
    })?;

    serde_json::from_slice(&payload_bytes).map_err(|e| {
        tracing::debug!(target: "common.access_token", error = %e, "Failed to parse JWT payload JSON");
        JwtValidationError::MalformedToken
    })
}
