//! Per-call session controller.
//!
//! `CallSession` owns what the call needs between UI actions: the token, the
//! joined room and any preview tracks. The SDK drives the room state
//! machine and reports changes as [`RoomEvent`]s, which the session turns
//! into attach/detach calls on the surface.

use crate::error::ClientError;
use crate::media::{
    ConnectOptions, Container, MediaSdk, MediaSurface, Participant, Room, ScreenCapture, Track,
    TrackKind, TrackPublication,
};
use crate::token_client::TokenClient;
use common::access_token::TokenResponse;
use tracing::{debug, info, instrument, warn};

/// Room changes reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    ParticipantConnected(Participant),
    ParticipantDisconnected(Participant),
    TrackPublished {
        participant: String,
        publication: TrackPublication,
    },
    TrackSubscribed {
        participant: String,
        track: Track,
    },
    TrackUnsubscribed {
        participant: String,
        track: Track,
    },
    TrackUnpublished {
        participant: String,
        kind: TrackKind,
    },
    /// The local participant left the room.
    Disconnected,
}

pub struct CallSession<S: MediaSdk, U: MediaSurface> {
    sdk: S,
    surface: U,
    credential: TokenResponse,
    active_room: Option<S::Room>,
    preview_tracks: Option<Vec<Track>>,
}

impl<S: MediaSdk, U: MediaSurface> CallSession<S, U> {
    pub fn new(sdk: S, surface: U, credential: TokenResponse) -> Self {
        Self {
            sdk,
            surface,
            credential,
            active_room: None,
            preview_tracks: None,
        }
    }

    /// Fetch a token and build a session around it.
    ///
    /// # Errors
    ///
    /// Whatever [`TokenClient::fetch`] returns.
    pub async fn bootstrap(
        client: &TokenClient,
        identity: Option<&str>,
        sdk: S,
        surface: U,
    ) -> Result<Self, ClientError> {
        surface.log("Generating Access Token");
        let credential = client.fetch(identity).await?;
        surface.log(&format!(
            "Got access token with identity: {}",
            credential.identity
        ));
        Ok(Self::new(sdk, surface, credential))
    }

    pub fn identity(&self) -> &str {
        &self.credential.identity
    }

    pub fn is_connected(&self) -> bool {
        self.active_room.is_some()
    }

    pub fn active_room(&self) -> Option<&S::Room> {
        self.active_room.as_ref()
    }

    pub fn preview_tracks(&self) -> Option<&[Track]> {
        self.preview_tracks.as_deref()
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    /// Join `room_name` with camera and microphone, plus the whole screen
    /// when `share_screen` is set.
    ///
    /// # Errors
    ///
    /// - `ClientError::EmptyRoomName` - no room name given
    /// - `ClientError::AlreadyJoined` - a room is already active
    /// - `ClientError::Media` - local capture or connect failed
    #[instrument(skip_all, fields(room = %room_name, share_screen = share_screen))]
    pub async fn join(&mut self, room_name: &str, share_screen: bool) -> Result<(), ClientError> {
        if room_name.is_empty() {
            return Err(ClientError::EmptyRoomName);
        }
        if let Some(room) = &self.active_room {
            return Err(ClientError::AlreadyJoined(room.name().to_string()));
        }

        self.activity(&format!("Joining room '{room_name}'..."));

        let mut tracks = self.sdk.create_local_tracks().await.map_err(|e| {
            warn!(target: "video_client.session", error = %e, "Unable to access local media");
            e
        })?;

        if share_screen {
            match self
                .sdk
                .create_screen_track(&ScreenCapture::entire_screen())
                .await
            {
                Ok(Some(track)) => {
                    self.activity("Got screen track");
                    tracks.push(track);
                }
                Ok(None) => {
                    warn!(target: "video_client.session", "No screen source to share");
                    self.activity("Screen sharing unavailable");
                }
                Err(e) => {
                    warn!(target: "video_client.session", error = %e, "Screen capture failed");
                    self.activity(&format!("Screen sharing unavailable: {e}"));
                }
            }
        }

        let options = ConnectOptions {
            room_name: room_name.to_string(),
            tracks,
        };

        let room = self
            .sdk
            .connect(&self.credential.token, options)
            .await
            .map_err(|e| {
                self.activity(&format!("Could not connect: {e}"));
                e
            })?;

        self.room_joined(room);
        Ok(())
    }

    /// Disconnect the active room.
    ///
    /// # Errors
    ///
    /// `ClientError::NotConnected` if no room is active.
    pub fn leave(&self) -> Result<(), ClientError> {
        let room = self.active_room.as_ref().ok_or(ClientError::NotConnected)?;
        self.activity("Leaving room...");
        room.disconnect();
        Ok(())
    }

    /// Disconnect if joined, otherwise do nothing. For window teardown.
    pub fn leave_if_joined(&self) {
        if let Some(room) = &self.active_room {
            room.disconnect();
        }
    }

    /// Show a local camera preview, reusing earlier preview tracks.
    ///
    /// # Errors
    ///
    /// `ClientError::Media` if local capture fails.
    pub async fn start_preview(&mut self) -> Result<(), ClientError> {
        let tracks = match self.preview_tracks.take() {
            Some(tracks) => tracks,
            None => self.sdk.create_local_tracks().await.map_err(|e| {
                self.activity("Unable to access Camera and Microphone");
                e
            })?,
        };

        if !self.surface.has_video(Container::PreviewLocalMedia) {
            for track in &tracks {
                self.surface.attach(Container::PreviewLocalMedia, "", track);
            }
        }

        self.preview_tracks = Some(tracks);
        Ok(())
    }

    /// Stop and remove the preview tracks.
    pub fn stop_preview(&mut self) {
        if let Some(tracks) = self.preview_tracks.take() {
            for track in &tracks {
                self.detach_track(track);
            }
        }
    }

    /// React to a room change reported by the SDK.
    pub fn handle_event(&mut self, event: RoomEvent) {
        debug!(target: "video_client.session", event = ?event, "Room event");

        match event {
            RoomEvent::ParticipantConnected(participant) => {
                self.activity(&format!("Joining: '{}'", participant.identity));
                self.participant_connected(&participant);
            }
            RoomEvent::ParticipantDisconnected(participant) => {
                self.activity(&format!(
                    "RemoteParticipant '{}' left the room",
                    participant.identity
                ));
                self.detach_participant_tracks(&participant);
            }
            RoomEvent::TrackPublished {
                participant,
                publication,
            } => self.track_published(&participant, &publication),
            RoomEvent::TrackSubscribed { participant, track } => {
                self.activity(&format!("Subscribed to {} track", track.kind.as_str()));
                self.surface
                    .attach(Container::RemoteMedia, &participant, &track);
            }
            RoomEvent::TrackUnsubscribed { track, .. } => self.detach_track(&track),
            RoomEvent::TrackUnpublished { kind, .. } => {
                self.activity(&format!("{} track was unpublished.", kind.as_str()));
            }
            RoomEvent::Disconnected => self.room_disconnected(),
        }
    }

    fn room_joined(&mut self, room: S::Room) {
        info!(target: "video_client.session", room = %room.name(), "Joined room");
        self.activity(&format!("Joined as '{}'", self.credential.identity));

        if !self.surface.has_video(Container::LocalMedia) {
            let local = room.local_participant();
            for track in local.tracks() {
                self.surface
                    .attach(Container::LocalMedia, &local.identity, track);
            }
        }

        for participant in room.participants() {
            self.activity(&format!("Already in Room: '{}'", participant.identity));
            self.participant_connected(&participant);
        }

        self.active_room = Some(room);
    }

    fn room_disconnected(&mut self) {
        self.activity("Left");

        if let Some(tracks) = self.preview_tracks.take() {
            for track in &tracks {
                self.sdk.stop_track(track);
            }
        }

        if let Some(room) = self.active_room.take() {
            self.detach_participant_tracks(&room.local_participant());
            for participant in room.participants() {
                self.detach_participant_tracks(&participant);
            }
        }
    }

    fn participant_connected(&self, participant: &Participant) {
        for publication in &participant.publications {
            self.track_published(&participant.identity, publication);
        }
    }

    fn track_published(&self, participant: &str, publication: &TrackPublication) {
        if let Some(track) = &publication.track {
            self.surface
                .attach(Container::RemoteMedia, participant, track);
        }
    }

    fn detach_participant_tracks(&self, participant: &Participant) {
        for track in participant.tracks() {
            self.detach_track(track);
        }
    }

    /// Remove a track from the UI, releasing its device if it is local.
    fn detach_track(&self, track: &Track) {
        self.surface.detach(track);
        if track.is_local() {
            self.sdk.stop_track(track);
        }
    }

    fn activity(&self, message: &str) {
        debug!(target: "video_client.session", "{}", message);
        self.surface.log(message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mock::{MockSdk, MockSurface};
    use token_test_utils::TestTokenBuilder;

    fn credential(identity: &str) -> TokenResponse {
        TokenResponse {
            identity: identity.to_string(),
            token: TestTokenBuilder::new().for_identity(identity).build(),
        }
    }

    fn session_with(sdk: MockSdk) -> (CallSession<MockSdk, MockSurface>, MockSdk, MockSurface) {
        let surface = MockSurface::new();
        let session = CallSession::new(sdk.clone(), surface.clone(), credential("alice"));
        (session, sdk, surface)
    }

    fn remote(identity: &str, track_id: &str) -> Participant {
        Participant::new(
            identity,
            vec![
                TrackPublication::subscribed(Track::remote(track_id, TrackKind::Video)),
                TrackPublication::unsubscribed(TrackKind::Audio),
            ],
        )
    }

    // =========================================================================
    // Join / Leave
    // =========================================================================

    #[tokio::test]
    async fn test_join_rejects_empty_room_name() {
        let (mut session, sdk, _) = session_with(MockSdk::new());

        let result = session.join("", false).await;

        assert_eq!(result, Err(ClientError::EmptyRoomName));
        assert!(sdk.connects().is_empty());
        assert_eq!(sdk.local_track_requests(), 0);
    }

    #[tokio::test]
    async fn test_join_connects_with_local_tracks() {
        let (mut session, sdk, surface) = session_with(MockSdk::new());

        session.join("lobby", false).await.unwrap();

        let connects = sdk.connects();
        assert_eq!(connects.len(), 1);
        assert_eq!(connects[0].room_name, "lobby");
        assert_eq!(connects[0].tracks.len(), 2);
        assert!(sdk.screen_requests().is_empty());

        assert!(session.is_connected());
        assert_eq!(
            surface.track_ids_in(Container::LocalMedia),
            vec!["local-audio", "local-video"]
        );
        assert!(surface
            .log_lines()
            .contains(&"Joined as 'alice'".to_string()));
    }

    #[tokio::test]
    async fn test_join_with_screen_share_adds_entire_screen() {
        let (mut session, sdk, _) = session_with(MockSdk::new());

        session.join("lobby", true).await.unwrap();

        assert_eq!(sdk.screen_requests(), vec![ScreenCapture::entire_screen()]);
        let ids: Vec<_> = sdk.connects()[0]
            .tracks
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec!["local-audio", "local-video", "screen"]);
    }

    #[tokio::test]
    async fn test_join_without_screen_source_still_connects() {
        let (mut session, sdk, _) = session_with(MockSdk::new().without_screen());

        session.join("lobby", true).await.unwrap();

        assert_eq!(sdk.connects()[0].tracks.len(), 2);
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_join_attaches_participants_already_present() {
        let sdk = MockSdk::new().with_participants(vec![remote("bob", "bob-video")]);
        let (mut session, _, surface) = session_with(sdk);

        session.join("lobby", false).await.unwrap();

        assert_eq!(surface.track_ids_in(Container::RemoteMedia), vec!["bob-video"]);
        assert!(surface
            .log_lines()
            .contains(&"Already in Room: 'bob'".to_string()));
    }

    #[tokio::test]
    async fn test_join_twice_is_rejected() {
        let (mut session, sdk, _) = session_with(MockSdk::new());
        session.join("lobby", false).await.unwrap();

        let result = session.join("other", false).await;

        assert_eq!(result, Err(ClientError::AlreadyJoined("lobby".to_string())));
        assert_eq!(sdk.connects().len(), 1);
    }

    #[tokio::test]
    async fn test_join_propagates_device_failure() {
        let (mut session, sdk, _) = session_with(MockSdk::without_devices());

        let result = session.join("lobby", false).await;

        assert!(matches!(result, Err(ClientError::Media(_))));
        assert!(sdk.connects().is_empty());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_join_connect_failure_leaves_session_idle() {
        let (mut session, _, surface) = session_with(MockSdk::refusing_connections());

        let result = session.join("lobby", false).await;

        assert!(matches!(result, Err(ClientError::Media(_))));
        assert!(!session.is_connected());
        assert!(surface
            .log_lines()
            .iter()
            .any(|line| line.starts_with("Could not connect")));
    }

    #[tokio::test]
    async fn test_leave_disconnects_active_room() {
        let (mut session, sdk, _) = session_with(MockSdk::new());
        session.join("lobby", false).await.unwrap();

        session.leave().unwrap();

        assert_eq!(sdk.last_room().unwrap().disconnect_calls(), 1);
    }

    #[test]
    fn test_leave_without_room_is_not_connected() {
        let (session, _, _) = session_with(MockSdk::new());
        assert_eq!(session.leave(), Err(ClientError::NotConnected));
    }

    #[tokio::test]
    async fn test_leave_if_joined() {
        let (mut session, sdk, _) = session_with(MockSdk::new());
        session.leave_if_joined();
        assert!(sdk.last_room().is_none());

        session.join("lobby", false).await.unwrap();
        session.leave_if_joined();

        assert_eq!(sdk.last_room().unwrap().disconnect_calls(), 1);
    }

    // =========================================================================
    // Room Events
    // =========================================================================

    #[tokio::test]
    async fn test_participant_connected_attaches_subscribed_tracks() {
        let (mut session, _, surface) = session_with(MockSdk::new());
        session.join("lobby", false).await.unwrap();

        session.handle_event(RoomEvent::ParticipantConnected(remote("carol", "carol-video")));

        let attached = surface.attached();
        let carol = attached
            .iter()
            .find(|a| a.track.id == "carol-video")
            .unwrap();
        assert_eq!(carol.container, Container::RemoteMedia);
        assert_eq!(carol.participant, "carol");
    }

    #[tokio::test]
    async fn test_track_subscription_lifecycle() {
        let (mut session, sdk, surface) = session_with(MockSdk::new());
        session.join("lobby", false).await.unwrap();
        let track = Track::remote("dave-audio", TrackKind::Audio);

        session.handle_event(RoomEvent::TrackPublished {
            participant: "dave".to_string(),
            publication: TrackPublication::unsubscribed(TrackKind::Audio),
        });
        assert!(surface.track_ids_in(Container::RemoteMedia).is_empty());

        session.handle_event(RoomEvent::TrackSubscribed {
            participant: "dave".to_string(),
            track: track.clone(),
        });
        assert_eq!(surface.track_ids_in(Container::RemoteMedia), vec!["dave-audio"]);

        session.handle_event(RoomEvent::TrackUnsubscribed {
            participant: "dave".to_string(),
            track,
        });
        assert!(surface.track_ids_in(Container::RemoteMedia).is_empty());
        assert!(sdk.stopped().is_empty(), "remote tracks are never stopped");
    }

    #[tokio::test]
    async fn test_track_unpublished_is_logged() {
        let (mut session, _, surface) = session_with(MockSdk::new());

        session.handle_event(RoomEvent::TrackUnpublished {
            participant: "erin".to_string(),
            kind: TrackKind::Video,
        });

        assert!(surface
            .log_lines()
            .contains(&"video track was unpublished.".to_string()));
    }

    #[tokio::test]
    async fn test_participant_disconnected_detaches_tracks() {
        let sdk = MockSdk::new().with_participants(vec![remote("bob", "bob-video")]);
        let (mut session, _, surface) = session_with(sdk);
        session.join("lobby", false).await.unwrap();

        session.handle_event(RoomEvent::ParticipantDisconnected(remote("bob", "bob-video")));

        assert!(surface.track_ids_in(Container::RemoteMedia).is_empty());
        assert_eq!(surface.track_ids_in(Container::LocalMedia).len(), 2);
    }

    #[tokio::test]
    async fn test_disconnected_clears_room_and_stops_local_tracks() {
        let sdk = MockSdk::new().with_participants(vec![remote("bob", "bob-video")]);
        let (mut session, sdk, surface) = session_with(sdk);
        session.join("lobby", false).await.unwrap();
        session.start_preview().await.unwrap();

        session.leave().unwrap();
        session.handle_event(RoomEvent::Disconnected);

        assert!(!session.is_connected());
        assert!(session.preview_tracks().is_none());
        assert!(surface.track_ids_in(Container::LocalMedia).is_empty());
        assert!(surface.track_ids_in(Container::RemoteMedia).is_empty());
        let stopped: Vec<_> = sdk.stopped().into_iter().map(|t| t.id).collect();
        assert!(stopped.iter().filter(|id| *id == "local-video").count() >= 2);

        // Can join again afterwards
        session.join("lobby", false).await.unwrap();
        assert!(session.is_connected());
    }

    // =========================================================================
    // Preview
    // =========================================================================

    #[tokio::test]
    async fn test_preview_reuses_tracks() {
        let (mut session, sdk, surface) = session_with(MockSdk::new());

        session.start_preview().await.unwrap();
        session.start_preview().await.unwrap();

        assert_eq!(sdk.local_track_requests(), 1);
        assert_eq!(
            surface.track_ids_in(Container::PreviewLocalMedia),
            vec!["local-audio", "local-video"]
        );
    }

    #[tokio::test]
    async fn test_stop_preview_stops_and_detaches() {
        let (mut session, sdk, surface) = session_with(MockSdk::new());
        session.start_preview().await.unwrap();

        session.stop_preview();

        assert!(session.preview_tracks().is_none());
        assert!(surface.track_ids_in(Container::PreviewLocalMedia).is_empty());
        assert_eq!(sdk.stopped().len(), 2);

        // Closing again is a no-op
        session.stop_preview();
        assert_eq!(sdk.stopped().len(), 2);
    }

    #[tokio::test]
    async fn test_preview_device_failure() {
        let (mut session, _, surface) = session_with(MockSdk::without_devices());

        let result = session.start_preview().await;

        assert!(matches!(result, Err(ClientError::Media(_))));
        assert!(surface
            .log_lines()
            .contains(&"Unable to access Camera and Microphone".to_string()));
    }
}
