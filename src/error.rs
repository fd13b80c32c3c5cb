use crate::recorder::RecorderState;
use thiserror::Error;

/// Failures reported by a [`MediaDevices`](crate::media::MediaDevices) backend
#[derive(Debug, Error)]
pub enum MediaError {
    /// The user (or platform) refused camera/microphone access
    #[error("Permission to access media devices was denied: {0}")]
    PermissionDenied(String),

    /// No device satisfies the requested constraints
    #[error("No media device found: {0}")]
    NotFound(String),

    /// The stream failed after it was acquired
    #[error("Media stream error: {0}")]
    Stream(String),
}

/// Errors surfaced to the user by the recorder
///
/// Each variant maps to exactly one user-visible notice; none are retried.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("User is not authenticated.")]
    Unauthenticated,

    #[error("Error accessing media devices: {0}")]
    MediaAccessDenied(#[source] MediaError),

    #[error("No media recorded to upload.")]
    NothingToUpload,

    #[error("Failed to upload video: {0}")]
    UploadFailed(#[source] UploadError),

    #[error("Recorder is busy ({0})")]
    Busy(RecorderState),

    #[error("Capture failed: {0}")]
    Capture(#[source] MediaError),
}

/// Errors from the upload client
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
