pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod media;
pub mod recorder;
pub mod storage;
pub mod upload;

pub use config::Config;
pub use error::{MediaError, RecorderError, UploadError};
pub use http::{create_router, AppState};
pub use identity::{IdentityProvider, SessionIdentity, StaticIdentity};
pub use media::{FileDevices, MediaDevices, MediaStream, PreviewSurface};
pub use recorder::{Clip, Recorder, RecorderConfig, RecorderEvent, RecorderState, StopReason};
pub use storage::{ClipStore, StoredClip};
pub use upload::{ClipUploader, HttpUploader, UploadReceipt, UploadRequest};
