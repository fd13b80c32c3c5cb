use crate::error::MediaError;
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc;

/// Kind of a captured device track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Microphone input
    Audio,
    /// Camera input
    Video,
}

/// Lifecycle of a device track
///
/// A track is `Live` while it holds the device and `Ended` once released.
/// Ended tracks never come back to life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// Snapshot of one device track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Backend-assigned track identifier
    pub id: String,
    pub kind: TrackKind,
    /// Human readable device label
    pub label: String,
    pub state: TrackState,
}

impl TrackInfo {
    pub fn new(id: impl Into<String>, kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            state: TrackState::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state == TrackState::Live
    }
}

/// Which devices to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// One piece of encoded media delivered while recording
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Encoded container bytes
    pub data: Bytes,
    /// Milliseconds since recording started
    pub timestamp_ms: u64,
}

/// Device acquisition trait
///
/// Implementations:
/// - File: replay a prerecorded clip (CLI and batch testing)
/// - Test doubles: scripted devices in the integration tests
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    /// Acquire a stream satisfying `constraints`
    ///
    /// Denial maps to [`MediaError::PermissionDenied`], missing hardware to
    /// [`MediaError::NotFound`].
    async fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError>;
}

/// A live capture stream holding one or more device tracks
#[async_trait::async_trait]
pub trait MediaStream: Send + Sync {
    /// Stream label for logging and the preview surface
    fn label(&self) -> &str;

    /// Current state of every track
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Begin encoding; a chunk is delivered roughly every `timeslice`
    ///
    /// The returned channel closes after [`stop_recording`](Self::stop_recording)
    /// has flushed the last chunk.
    async fn start_recording(
        &mut self,
        timeslice: Duration,
    ) -> Result<mpsc::Receiver<MediaChunk>, MediaError>;

    /// Stop encoding and flush pending data
    async fn stop_recording(&mut self) -> Result<(), MediaError>;

    /// Release every device track. Calling it again is a no-op.
    fn stop_tracks(&mut self);
}
