//! Video Token Service Library
//!
//! Issues short-lived access tokens that let a desktop client join rooms of
//! the external real-time media SDK, and serves the web UI bundle.
//!
//! # Modules
//!
//! - `config` - Service configuration and server credentials
//! - `crypto` - Access-token signing and verification
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP middleware
//! - `observability` - Metrics and log-safe hashing
//! - `routes` - Router construction
//! - `services` - Name generation and token issuance

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod services;
