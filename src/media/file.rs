use super::backend::{
    MediaChunk, MediaConstraints, MediaDevices, MediaStream, TrackInfo, TrackKind, TrackState,
};
use crate::error::MediaError;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default bytes delivered per timeslice
const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;

/// Device set that replays a prerecorded clip instead of a camera
///
/// The file is read when the stream is acquired and handed out in
/// `chunk_bytes` pieces, one per timeslice. Stopping flushes the unsent
/// remainder, so a finished clip always equals the file.
#[derive(Debug, Clone)]
pub struct FileDevices {
    path: PathBuf,
    chunk_bytes: usize,
}

impl FileDevices {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(1);
        self
    }
}

#[async_trait::async_trait]
impl MediaDevices for FileDevices {
    async fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError> {
        if !constraints.audio && !constraints.video {
            return Err(MediaError::NotFound(
                "at least one of audio or video must be requested".to_string(),
            ));
        }

        let data = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => MediaError::NotFound(format!("{}", self.path.display())),
            _ => MediaError::PermissionDenied(format!("{}: {}", self.path.display(), e)),
        })?;

        info!(
            "Opened file source {} ({} bytes)",
            self.path.display(),
            data.len()
        );

        let label = self.path.display().to_string();
        let mut tracks = Vec::new();
        if constraints.video {
            tracks.push(TrackInfo::new("file-video-0", TrackKind::Video, &label));
        }
        if constraints.audio {
            tracks.push(TrackInfo::new("file-audio-0", TrackKind::Audio, &label));
        }

        Ok(Box::new(FileStream {
            label,
            data: Bytes::from(data),
            chunk_bytes: self.chunk_bytes,
            tracks,
            pump: None,
        }))
    }
}

/// Stream returned by [`FileDevices`]
pub struct FileStream {
    label: String,
    data: Bytes,
    chunk_bytes: usize,
    tracks: Vec<TrackInfo>,
    pump: Option<(oneshot::Sender<()>, JoinHandle<()>)>,
}

#[async_trait::async_trait]
impl MediaStream for FileStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn tracks(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }

    async fn start_recording(
        &mut self,
        timeslice: Duration,
    ) -> Result<mpsc::Receiver<MediaChunk>, MediaError> {
        if self.pump.is_some() {
            return Err(MediaError::Stream("recording already started".to_string()));
        }
        if !self.tracks.iter().any(TrackInfo::is_live) {
            return Err(MediaError::Stream("all tracks have ended".to_string()));
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(32);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let data = self.data.clone();
        let chunk_bytes = self.chunk_bytes;
        let timeslice = timeslice.max(Duration::from_millis(1));

        let pump = tokio::spawn(async move {
            let mut offset = 0;
            let mut elapsed_ms = 0u64;
            let mut interval = tokio::time::interval(timeslice);
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        elapsed_ms += timeslice.as_millis() as u64;
                        if offset >= data.len() {
                            continue;
                        }
                        let end = (offset + chunk_bytes).min(data.len());
                        let chunk = MediaChunk {
                            data: data.slice(offset..end),
                            timestamp_ms: elapsed_ms,
                        };
                        offset = end;
                        if chunk_tx.send(chunk).await.is_err() {
                            warn!("Chunk receiver dropped, stopping file pump");
                            return;
                        }
                    }
                }
            }

            // Flush whatever the timeslices did not reach yet
            if offset < data.len() {
                let chunk = MediaChunk {
                    data: data.slice(offset..),
                    timestamp_ms: elapsed_ms,
                };
                if chunk_tx.send(chunk).await.is_err() {
                    warn!("Chunk receiver dropped before final flush");
                }
            }
            debug!("File pump finished at {} ms", elapsed_ms);
        });

        self.pump = Some((stop_tx, pump));
        Ok(chunk_rx)
    }

    async fn stop_recording(&mut self) -> Result<(), MediaError> {
        if let Some((stop_tx, pump)) = self.pump.take() {
            let _ = stop_tx.send(());
            pump.await
                .map_err(|e| MediaError::Stream(format!("file pump panicked: {}", e)))?;
        }
        Ok(())
    }

    fn stop_tracks(&mut self) {
        for track in &mut self.tracks {
            track.state = TrackState::Ended;
        }
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if let Some((_, pump)) = self.pump.take() {
            pump.abort();
        }
    }
}
