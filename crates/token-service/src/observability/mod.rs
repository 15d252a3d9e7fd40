//! Observability for the token service.
//!
//! # Privacy by Default
//!
//! Handlers use `#[instrument(skip_all)]` and record only allow-listed fields:
//! - **SAFE**: plaintext (identity source, status, error category)
//! - **HASHED**: SHA-256 prefix for correlation (participant identity)
//! - **NEVER**: API secret, signed tokens

pub mod metrics;

pub use metrics::{init_metrics_recorder, record_http_request, record_token_issuance};

use crate::errors::TokenServiceError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// One-way and truncated: enough to follow one identity through the logs,
/// not enough to store it.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Where the identity of an issued token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Caller passed `?identity=`.
    Supplied,
    /// Name generator.
    Generated,
}

impl IdentitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::Supplied => "supplied",
            IdentitySource::Generated => "generated",
        }
    }
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed client request
    Request,
    /// Token signing or verification
    Cryptographic,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Request => "request",
            ErrorCategory::Cryptographic => "cryptographic",
        }
    }
}

impl From<&TokenServiceError> for ErrorCategory {
    fn from(err: &TokenServiceError) -> Self {
        match err {
            TokenServiceError::InvalidRequest(_) => ErrorCategory::Request,
            TokenServiceError::Crypto(_) | TokenServiceError::InvalidToken(_) => {
                ErrorCategory::Cryptographic
            }
        }
    }
}
