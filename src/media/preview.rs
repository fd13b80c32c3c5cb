use super::backend::TrackInfo;
use tracing::info;

/// Surface that shows the live stream while recording
///
/// `audio_muted` only affects local monitoring; the recorded stream keeps
/// its audio.
pub trait PreviewSurface: Send + Sync {
    fn attach(&self, label: &str, tracks: &[TrackInfo], audio_muted: bool);

    fn detach(&self);
}

/// Preview that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPreview;

impl PreviewSurface for NullPreview {
    fn attach(&self, _label: &str, _tracks: &[TrackInfo], _audio_muted: bool) {}

    fn detach(&self) {}
}

/// Preview that reports attach/detach through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPreview;

impl PreviewSurface for LogPreview {
    fn attach(&self, label: &str, tracks: &[TrackInfo], audio_muted: bool) {
        info!(
            "Preview attached: {} ({} tracks, monitor audio {})",
            label,
            tracks.len(),
            if audio_muted { "muted" } else { "on" }
        );
    }

    fn detach(&self) {
        info!("Preview detached");
    }
}
