use thiserror::Error;

/// Errors surfaced to the client UI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport failure or unexpected status from the token endpoint.
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Token endpoint refused the request (4xx).
    #[error("Token request rejected: {0}")]
    TokenRejected(String),

    /// Response body was not a usable access token.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    #[error("Access token has already expired")]
    TokenExpired,

    #[error("Please enter a room name")]
    EmptyRoomName,

    #[error("Already connected to room '{0}'")]
    AlreadyJoined(String),

    #[error("Not connected to a room")]
    NotConnected,

    /// Local media or SDK connection failure.
    #[error("Media error: {0}")]
    Media(String),
}
