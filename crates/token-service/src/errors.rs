use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl TokenServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TokenServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            TokenServiceError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            TokenServiceError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for TokenServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            TokenServiceError::InvalidRequest(reason) => ("INVALID_REQUEST", reason.clone()),
            TokenServiceError::Crypto(_) => (
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
            ),
            TokenServiceError::InvalidToken(_) => (
                "INVALID_TOKEN",
                "The access token is invalid or expired".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
