use crate::upload::UploadReceipt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the recorder
///
/// ```text
/// Idle -> Recording -> Stopped -> Uploading -> UploadSucceeded
///                                           \-> UploadFailed -> Uploading
/// ```
/// `Stopped`, `UploadSucceeded` and `UploadFailed` may also start a new
/// recording, which discards the previous clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderState {
    Idle,
    Recording,
    Stopped,
    Uploading,
    UploadSucceeded,
    UploadFailed,
}

impl RecorderState {
    /// Whether a new recording may begin from this state
    pub fn can_start(self) -> bool {
        !matches!(self, RecorderState::Recording | RecorderState::Uploading)
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording => "recording",
            RecorderState::Stopped => "stopped",
            RecorderState::Uploading => "uploading",
            RecorderState::UploadSucceeded => "upload succeeded",
            RecorderState::UploadFailed => "upload failed",
        };
        f.write_str(name)
    }
}

/// Why a recording ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The user stopped it
    Manual,
    /// The countdown reached zero
    CountdownElapsed,
}

/// Notifications for whatever displays the recorder
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    StateChanged(RecorderState),
    /// Seconds left before the automatic stop
    CountdownTick { remaining: u32 },
    Uploaded(UploadReceipt),
}
