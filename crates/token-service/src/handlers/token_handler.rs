use crate::config::Config;
use crate::errors::TokenServiceError;
use crate::observability::metrics::{record_error, record_token_issuance};
use crate::observability::{hash_for_correlation, ErrorCategory, IdentitySource};
use crate::services::name_generator;
use crate::services::token_issuer::TokenIssuer;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use common::access_token::TokenResponse;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

#[derive(Deserialize)]
pub struct TokenQuery {
    pub identity: Option<String>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub issuer: TokenIssuer,
    pub config: Config,
}

/// Handle token request
///
/// GET /token?identity=<optional>
///
/// A non-empty `identity` is bound verbatim; otherwise a random name is
/// generated. No authentication or rate limiting is applied.
#[instrument(
    name = "vts.token.issue",
    skip_all,
    fields(identity_source, identity_hash, status)
)]
pub async fn handle_get_token(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<TokenResponse>, TokenServiceError> {
    let start = Instant::now();
    let span = tracing::Span::current();

    let Query(query) = query.map_err(|rejection| {
        let err = TokenServiceError::InvalidRequest(rejection.body_text());
        tracing::debug!(error = %err, "Rejected malformed token request");
        span.record("status", "error");
        record_error(
            "issue_token",
            ErrorCategory::from(&err).as_str(),
            err.status_code().as_u16(),
        );
        err
    })?;

    let (identity, source) = resolve_identity(query.identity);
    span.record("identity_source", source.as_str());
    span.record("identity_hash", hash_for_correlation(&identity).as_str());

    let result = state.issuer.issue(&identity);
    let status = if result.is_ok() { "success" } else { "error" };
    span.record("status", status);
    record_token_issuance(source.as_str(), status, start.elapsed());

    match result {
        Ok(token) => {
            tracing::info!("Issued access token");
            Ok(Json(token))
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to issue access token");
            record_error(
                "issue_token",
                ErrorCategory::from(&err).as_str(),
                err.status_code().as_u16(),
            );
            Err(err)
        }
    }
}

/// Use the supplied identity if non-empty, otherwise generate one.
fn resolve_identity(supplied: Option<String>) -> (String, IdentitySource) {
    match supplied {
        Some(identity) if !identity.is_empty() => (identity, IdentitySource::Supplied),
        _ => (name_generator::generate(), IdentitySource::Generated),
    }
}
