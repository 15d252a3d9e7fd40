//! In-memory SDK and UI doubles.
//!
//! Record every call so tests can assert on what the session asked for.

use crate::error::ClientError;
use crate::media::{
    ConnectOptions, Container, MediaSdk, MediaSurface, Participant, Room, ScreenCapture, Track,
    TrackKind, TrackPublication,
};
use async_trait::async_trait;
use common::access_token::peek_claims;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Room
// =============================================================================

#[derive(Debug)]
struct MockRoomState {
    local: Participant,
    participants: Vec<Participant>,
    disconnect_calls: usize,
}

/// Room double. Clones share state.
#[derive(Debug, Clone)]
pub struct MockRoom {
    name: String,
    state: Arc<Mutex<MockRoomState>>,
}

impl MockRoom {
    pub fn new(name: &str, local: Participant, participants: Vec<Participant>) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(MockRoomState {
                local,
                participants,
                disconnect_calls: 0,
            })),
        }
    }

    /// Add a remote participant, as the SDK would before a connect event.
    pub fn add_participant(&self, participant: Participant) {
        lock(&self.state).participants.push(participant);
    }

    /// Drop a remote participant by identity.
    pub fn remove_participant(&self, identity: &str) {
        lock(&self.state)
            .participants
            .retain(|p| p.identity != identity);
    }

    pub fn disconnect_calls(&self) -> usize {
        lock(&self.state).disconnect_calls
    }
}

impl Room for MockRoom {
    fn name(&self) -> &str {
        &self.name
    }

    fn local_participant(&self) -> Participant {
        lock(&self.state).local.clone()
    }

    fn participants(&self) -> Vec<Participant> {
        lock(&self.state).participants.clone()
    }

    fn disconnect(&self) {
        lock(&self.state).disconnect_calls += 1;
    }
}

// =============================================================================
// SDK
// =============================================================================

#[derive(Debug, Default)]
struct MockSdkState {
    local_tracks: Vec<Track>,
    screen_track: Option<Track>,
    fail_local_tracks: bool,
    fail_connect: bool,
    remote_participants: Vec<Participant>,
    local_track_requests: usize,
    screen_requests: Vec<ScreenCapture>,
    connects: Vec<ConnectOptions>,
    stopped: Vec<Track>,
    last_room: Option<MockRoom>,
}

/// SDK double. Clones share state.
#[derive(Debug, Clone)]
pub struct MockSdk {
    state: Arc<Mutex<MockSdkState>>,
}

impl MockSdk {
    /// Camera, microphone and an "Entire screen" source are available.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockSdkState {
                local_tracks: vec![
                    Track::local("local-audio", TrackKind::Audio),
                    Track::local("local-video", TrackKind::Video),
                ],
                screen_track: Some(Track::local("screen", TrackKind::Video)),
                ..MockSdkState::default()
            })),
        }
    }

    /// Capture devices are unavailable.
    pub fn without_devices() -> Self {
        let sdk = Self::new();
        lock(&sdk.state).fail_local_tracks = true;
        sdk
    }

    /// `connect` fails.
    pub fn refusing_connections() -> Self {
        let sdk = Self::new();
        lock(&sdk.state).fail_connect = true;
        sdk
    }

    /// No screen source named "Entire screen".
    pub fn without_screen(self) -> Self {
        lock(&self.state).screen_track = None;
        self
    }

    /// Remote participants already present when a room is joined.
    pub fn with_participants(self, participants: Vec<Participant>) -> Self {
        lock(&self.state).remote_participants = participants;
        self
    }

    pub fn local_track_requests(&self) -> usize {
        lock(&self.state).local_track_requests
    }

    pub fn screen_requests(&self) -> Vec<ScreenCapture> {
        lock(&self.state).screen_requests.clone()
    }

    pub fn connects(&self) -> Vec<ConnectOptions> {
        lock(&self.state).connects.clone()
    }

    pub fn stopped(&self) -> Vec<Track> {
        lock(&self.state).stopped.clone()
    }

    /// The most recently joined room.
    pub fn last_room(&self) -> Option<MockRoom> {
        lock(&self.state).last_room.clone()
    }
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSdk for MockSdk {
    type Room = MockRoom;

    async fn create_local_tracks(&self) -> Result<Vec<Track>, ClientError> {
        let mut state = lock(&self.state);
        state.local_track_requests += 1;
        if state.fail_local_tracks {
            return Err(ClientError::Media(
                "Unable to access Camera and Microphone".to_string(),
            ));
        }
        Ok(state.local_tracks.clone())
    }

    async fn create_screen_track(
        &self,
        capture: &ScreenCapture,
    ) -> Result<Option<Track>, ClientError> {
        let mut state = lock(&self.state);
        state.screen_requests.push(capture.clone());
        Ok(state.screen_track.clone())
    }

    async fn connect(&self, token: &str, options: ConnectOptions) -> Result<MockRoom, ClientError> {
        let mut state = lock(&self.state);
        state.connects.push(options.clone());
        if state.fail_connect {
            return Err(ClientError::Media("Could not connect".to_string()));
        }

        let identity = peek_claims(token)
            .map(|claims| claims.identity().to_string())
            .map_err(|e| ClientError::Media(format!("Invalid access token: {e}")))?;

        let local = Participant::new(
            identity,
            options
                .tracks
                .into_iter()
                .map(TrackPublication::subscribed)
                .collect(),
        );
        let room = MockRoom::new(&options.room_name, local, state.remote_participants.clone());
        state.last_room = Some(room.clone());
        Ok(room)
    }

    fn stop_track(&self, track: &Track) {
        lock(&self.state).stopped.push(track.clone());
    }
}

// =============================================================================
// Surface
// =============================================================================

/// A track rendered into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub container: Container,
    pub participant: String,
    pub track: Track,
}

#[derive(Debug, Default)]
struct MockSurfaceState {
    attached: Vec<Attachment>,
    log: Vec<String>,
}

/// UI double. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockSurface {
    state: Arc<Mutex<MockSurfaceState>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(&self) -> Vec<Attachment> {
        lock(&self.state).attached.clone()
    }

    /// Track ids rendered in `container`, in attach order.
    pub fn track_ids_in(&self, container: Container) -> Vec<String> {
        lock(&self.state)
            .attached
            .iter()
            .filter(|a| a.container == container)
            .map(|a| a.track.id.clone())
            .collect()
    }

    pub fn log_lines(&self) -> Vec<String> {
        lock(&self.state).log.clone()
    }
}

impl MediaSurface for MockSurface {
    fn attach(&self, container: Container, participant: &str, track: &Track) {
        lock(&self.state).attached.push(Attachment {
            container,
            participant: participant.to_string(),
            track: track.clone(),
        });
    }

    fn detach(&self, track: &Track) {
        lock(&self.state).attached.retain(|a| a.track.id != track.id);
    }

    fn has_video(&self, container: Container) -> bool {
        lock(&self.state)
            .attached
            .iter()
            .any(|a| a.container == container && a.track.kind == TrackKind::Video)
    }

    fn log(&self, message: &str) {
        lock(&self.state).log.push(message.to_string());
    }
}
