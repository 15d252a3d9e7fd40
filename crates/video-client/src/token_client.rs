//! HTTP client for the token endpoint.
//!
//! Fetches an access token for the call and checks, without verifying the
//! signature, that it is bound to the returned identity and not yet expired.

use crate::error::ClientError;
use common::access_token::{peek_claims, TokenResponse};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

/// Token server the desktop client talks to by default.
pub const DEFAULT_TOKEN_SERVER_URL: &str = "http://localhost:3000";

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout for HTTP client.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the token client.
#[derive(Debug, Clone)]
pub struct TokenClientConfig {
    /// Base URL of the token server, without the `/token` path.
    pub base_url: String,

    /// HTTP request timeout.
    pub http_timeout: Duration,
}

impl TokenClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

impl Default for TokenClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_SERVER_URL)
    }
}

/// Client for `GET /token`.
#[derive(Debug, Clone)]
pub struct TokenClient {
    config: TokenClientConfig,
    http_client: reqwest::Client,
}

impl TokenClient {
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: TokenClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &TokenClientConfig {
        &self.config
    }

    /// Fetch a token, letting the server pick a name when `identity` is `None`.
    ///
    /// # Errors
    ///
    /// - `ClientError::Http` - transport failure, 5xx or unexpected status
    /// - `ClientError::TokenRejected` - 4xx from the server
    /// - `ClientError::InvalidResponse` - body is not a token for the returned identity
    /// - `ClientError::TokenExpired` - token expired before it arrived
    #[instrument(skip_all)]
    pub async fn fetch(&self, identity: Option<&str>) -> Result<TokenResponse, ClientError> {
        let url = format!("{}/token", self.config.base_url);

        debug!(target: "video_client.token_client", url = %url, "Requesting access token");

        let mut request = self.http_client.get(&url);
        if let Some(identity) = identity {
            request = request.query(&[("identity", identity)]);
        }

        let response = request.send().await.map_err(|e| {
            debug!(target: "video_client.token_client", error = %e, "HTTP request failed");
            ClientError::Http(e.to_string())
        })?;

        let status = response.status();

        if status.is_success() {
            let token_response: TokenResponse = response.json().await.map_err(|e| {
                warn!(target: "video_client.token_client", error = %e, "Failed to parse token response");
                ClientError::InvalidResponse(e.to_string())
            })?;

            check_token(&token_response, chrono::Utc::now().timestamp())?;

            debug!(target: "video_client.token_client", "Access token acquired");
            Ok(token_response)
        } else if status.is_client_error() {
            let body = response.text().await.unwrap_or_else(|e| {
                trace!(target: "video_client.token_client", error = %e, "Failed to read error response body");
                "<failed to read body>".to_string()
            });
            warn!(target: "video_client.token_client", status = %status, "Token request rejected");
            trace!(target: "video_client.token_client", body = %body, "Rejection response body");
            Err(ClientError::TokenRejected(format!("Status {status}")))
        } else if status.is_server_error() {
            warn!(target: "video_client.token_client", status = %status, "Token server error");
            Err(ClientError::Http(format!("Token server error: {status}")))
        } else {
            warn!(target: "video_client.token_client", status = %status, "Unexpected response from token server");
            Err(ClientError::Http(format!("Unexpected status: {status}")))
        }
    }
}

/// Peek at the claims and make sure the token matches the response.
fn check_token(response: &TokenResponse, now: i64) -> Result<(), ClientError> {
    let claims = peek_claims(&response.token)
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

    if claims.identity() != response.identity {
        return Err(ClientError::InvalidResponse(
            "Token is bound to a different identity".to_string(),
        ));
    }

    if claims.is_expired_at(now) {
        return Err(ClientError::TokenExpired);
    }

    Ok(())
}
