//! # Token Test Utilities
//!
//! Shared test utilities for the video token service.
//!
//! This crate provides:
//! - Deterministic credential fixtures (fixed SIDs and secret)
//! - Test token builder (TestTokenBuilder)
//! - Server test harness (TestTokenServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use token_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestTokenServer::spawn().await?;
//!     let body: serde_json::Value =
//!         reqwest::get(format!("{}/token?identity=alice", server.url()))
//!             .await?
//!             .json()
//!             .await?;
//!
//!     body["token"]
//!         .as_str()
//!         .unwrap_or_default()
//!         .to_string()
//!         .assert_valid_access_token()
//!         .assert_for_identity("alice");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
