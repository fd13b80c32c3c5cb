pub mod backend;
pub mod file;
pub mod preview;

pub use backend::{
    MediaChunk, MediaConstraints, MediaDevices, MediaStream, TrackInfo, TrackKind, TrackState,
};
pub use file::{FileDevices, FileStream};
pub use preview::{LogPreview, NullPreview, PreviewSurface};
