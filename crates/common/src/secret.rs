//! Secret types for the API secret and other signing material.
//!
//! Re-exports [`secrecy`] so that every crate in the workspace wraps secrets
//! the same way. `SecretString` implements `Debug` with redaction, so a struct
//! that derives `Debug` and holds one is safe to log. Reading the value needs
//! an explicit `expose_secret()` call, which keeps the signing path easy to
//! audit. Values are zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct ApiCredentials {
//!     api_key_sid: String,
//!     api_secret: SecretString,
//! }
//!
//! let creds = ApiCredentials {
//!     api_key_sid: "SK0123".to_string(),
//!     api_secret: SecretString::from("signing-secret"),
//! };
//!
//! // Debug output shows the key id, never the secret
//! println!("{:?}", creds);
//!
//! let secret: &str = creds.api_secret.expose_secret();
//! assert_eq!(secret, "signing-secret");
//! ```

pub use secrecy::{ExposeSecret, SecretString};
