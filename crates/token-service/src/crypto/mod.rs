//! Access-token signing and verification (HS256).
//!
//! Tokens are signed with the API secret and carry the media SDK's `cty`
//! header. Verification is not on the request path; it exists so operators
//! and tests can check a token against the server's credentials.

use crate::config::ApiCredentials;
use crate::errors::TokenServiceError;
use crate::observability::metrics::record_token_validation;
use common::access_token::{AccessTokenClaims, ACCESS_TOKEN_CONTENT_TYPE, MAX_JWT_SIZE_BYTES};
use common::secret::ExposeSecret;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::instrument;

/// Sign claims into a compact JWT with the API secret.
#[instrument(skip_all)]
pub fn sign_access_token(
    claims: &AccessTokenClaims,
    credentials: &ApiCredentials,
) -> Result<String, TokenServiceError> {
    let encoding_key = EncodingKey::from_secret(credentials.api_secret().expose_secret().as_bytes());

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());
    header.cty = Some(ACCESS_TOKEN_CONTENT_TYPE.to_string());

    encode(&header, claims, &encoding_key)
        .map_err(|e| TokenServiceError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify a token issued with `credentials`.
///
/// Validates:
/// - Token size (must be <= `MAX_JWT_SIZE_BYTES`), checked before parsing
/// - HS256 signature against the API secret
/// - Expiration (`exp`), with no leeway
/// - Issuer is our API key, subject is our account
#[instrument(skip_all)]
pub fn verify_access_token(
    token: &str,
    credentials: &ApiCredentials,
) -> Result<AccessTokenClaims, TokenServiceError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        record_token_validation("error", Some("too_large"));
        return Err(TokenServiceError::InvalidToken(
            "The access token is invalid or expired".to_string(),
        ));
    }

    let decoding_key = DecodingKey::from_secret(credentials.api_secret().expose_secret().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.set_issuer(&[credentials.api_key_sid()]);
    validation.sub = Some(credentials.account_sid().to_string());

    let token_data = decode::<AccessTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        record_token_validation("error", Some("invalid"));
        TokenServiceError::InvalidToken("The access token is invalid or expired".to_string())
    })?;

    if token_data.header.cty.as_deref() != Some(ACCESS_TOKEN_CONTENT_TYPE) {
        tracing::debug!(target: "crypto", "Token rejected: unexpected content type header");
        record_token_validation("error", Some("content_type"));
        return Err(TokenServiceError::InvalidToken(
            "The access token is invalid or expired".to_string(),
        ));
    }

    record_token_validation("success", None);
    Ok(token_data.claims)
}
