//! Client bootstrap for the video chat.
//!
//! Fetches an access token from the token service and drives a call through
//! the real-time media SDK. The SDK and the UI are reached through the traits
//! in [`media`]; [`mock`] provides in-memory doubles for both.
//!
//! ```rust,ignore
//! use video_client::{CallSession, TokenClient, TokenClientConfig};
//!
//! let client = TokenClient::new(TokenClientConfig::default())?;
//! let mut session = CallSession::bootstrap(&client, None, sdk, surface).await?;
//! session.join("lobby", false).await?;
//! // forward SDK callbacks
//! session.handle_event(event);
//! ```

#![warn(clippy::pedantic)]

pub mod error;
pub mod media;
pub mod mock;
pub mod session;
pub mod token_client;

pub use error::ClientError;
pub use media::{Container, MediaSdk, MediaSurface, Participant, Room, Track, TrackKind};
pub use session::{CallSession, RoomEvent};
pub use token_client::{TokenClient, TokenClientConfig};
