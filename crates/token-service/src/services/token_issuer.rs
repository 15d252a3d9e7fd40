use crate::config::ApiCredentials;
use crate::crypto;
use crate::errors::TokenServiceError;
use crate::observability::hash_for_correlation;
use chrono::Utc;
use common::access_token::{AccessTokenClaims, TokenResponse};
use tracing::instrument;

/// Issues video-calling access tokens.
///
/// Holds the validated server credentials; built once at startup and shared
/// read-only across requests.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    credentials: ApiCredentials,
}

impl TokenIssuer {
    pub fn new(credentials: ApiCredentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }

    /// Issue a token binding `identity` to the video grant, valid for four hours.
    ///
    /// The identity is not validated: an empty string is signed as-is.
    pub fn issue(&self, identity: &str) -> Result<TokenResponse, TokenServiceError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix epoch seconds).
    #[instrument(skip_all, fields(identity_hash = %hash_for_correlation(identity)))]
    pub fn issue_at(&self, identity: &str, now: i64) -> Result<TokenResponse, TokenServiceError> {
        if identity.is_empty() {
            tracing::warn!("Issuing access token with an empty identity");
        }

        let claims = AccessTokenClaims::video(
            self.credentials.account_sid(),
            self.credentials.api_key_sid(),
            identity,
            now,
        );

        let token = crypto::sign_access_token(&claims, &self.credentials)?;

        tracing::debug!(iat = claims.iat, exp = claims.exp, "Access token issued");

        Ok(TokenResponse {
            identity: identity.to_string(),
            token,
        })
    }
}
