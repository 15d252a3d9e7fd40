//! Collaborator seams for the real-time media SDK and the UI.
//!
//! The SDK owns signalling, transport and the room state machine. The UI
//! owns rendering. Both are reached only through the traits here so the
//! call session can be driven by in-memory fakes.

use crate::error::ClientError;
use async_trait::async_trait;

/// Screen source captured when screen sharing is requested.
pub const SCREEN_SOURCE_NAME: &str = "Entire screen";

/// Capture width for the shared screen.
pub const SCREEN_CAPTURE_WIDTH: u32 = 1280;

/// Capture height for the shared screen.
pub const SCREEN_CAPTURE_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
    Data,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
            TrackKind::Data => "data",
        }
    }
}

/// Where a track came from. Local tracks hold capture devices and must be
/// stopped when they leave the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOrigin {
    Local,
    Remote,
}

/// A media track as the session sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub kind: TrackKind,
    pub origin: TrackOrigin,
}

impl Track {
    pub fn local(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            origin: TrackOrigin::Local,
        }
    }

    pub fn remote(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            origin: TrackOrigin::Remote,
        }
    }

    pub fn is_local(&self) -> bool {
        self.origin == TrackOrigin::Local
    }
}

/// A published track. `track` is present once the track is subscribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPublication {
    pub kind: TrackKind,
    pub track: Option<Track>,
}

impl TrackPublication {
    pub fn subscribed(track: Track) -> Self {
        Self {
            kind: track.kind,
            track: Some(track),
        }
    }

    pub fn unsubscribed(kind: TrackKind) -> Self {
        Self { kind, track: None }
    }
}

/// Snapshot of a participant and its publications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub identity: String,
    pub publications: Vec<TrackPublication>,
}

impl Participant {
    pub fn new(identity: impl Into<String>, publications: Vec<TrackPublication>) -> Self {
        Self {
            identity: identity.into(),
            publications,
        }
    }

    /// Tracks that are currently available (subscribed or local).
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.publications.iter().filter_map(|p| p.track.as_ref())
    }
}

/// Screen capture constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenCapture {
    pub source_name: String,
    pub width: u32,
    pub height: u32,
}

impl ScreenCapture {
    /// The whole primary screen at 1280x720.
    pub fn entire_screen() -> Self {
        Self {
            source_name: SCREEN_SOURCE_NAME.to_string(),
            width: SCREEN_CAPTURE_WIDTH,
            height: SCREEN_CAPTURE_HEIGHT,
        }
    }
}

/// Options handed to [`MediaSdk::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub room_name: String,
    pub tracks: Vec<Track>,
}

/// UI regions tracks are rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    LocalMedia,
    RemoteMedia,
    PreviewLocalMedia,
}

/// A joined room, owned by the SDK.
pub trait Room: Send + Sync {
    fn name(&self) -> &str;

    fn local_participant(&self) -> Participant;

    /// Remote participants currently in the room.
    fn participants(&self) -> Vec<Participant>;

    /// Ask the SDK to leave. The SDK reports completion with a
    /// `Disconnected` room event.
    fn disconnect(&self);
}

/// Entry points of the real-time media SDK.
#[async_trait]
pub trait MediaSdk: Send + Sync {
    type Room: Room;

    /// Capture the default camera and microphone.
    async fn create_local_tracks(&self) -> Result<Vec<Track>, ClientError>;

    /// Capture a screen source. `Ok(None)` when no source matches.
    async fn create_screen_track(
        &self,
        capture: &ScreenCapture,
    ) -> Result<Option<Track>, ClientError>;

    /// Join a room with a signed access token.
    async fn connect(&self, token: &str, options: ConnectOptions) -> Result<Self::Room, ClientError>;

    /// Release the capture device behind a local track.
    fn stop_track(&self, track: &Track);
}

/// Rendering surface for tracks and the activity log.
pub trait MediaSurface: Send + Sync {
    fn attach(&self, container: Container, participant: &str, track: &Track);

    fn detach(&self, track: &Track);

    /// True if the container already shows a video track.
    fn has_video(&self, container: Container) -> bool;

    /// Append a line to the user-visible activity log.
    fn log(&self, message: &str);
}
