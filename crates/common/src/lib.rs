//! Types shared between the token service and its clients.

#![warn(clippy::pedantic)]

/// Access-token wire format (claims, grants, response body)
pub mod access_token;

/// Secret types that prevent accidental logging
pub mod secret;
