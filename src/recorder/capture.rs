use super::clip::Clip;
use super::countdown::Countdown;
use super::state::StopReason;
use crate::error::MediaError;
use crate::media::{MediaChunk, MediaStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Everything owned by one recording: the stream, its chunk buffer and the
/// countdown
///
/// The chunk buffer is created with the handle, so every recording starts
/// empty. Device tracks are released by [`finish`](Self::finish) or, on any
/// other exit, when the handle is dropped.
pub(crate) struct CaptureHandle {
    stream: Box<dyn MediaStream>,
    collector: Option<JoinHandle<Vec<MediaChunk>>>,
    countdown: Option<Countdown>,
    started_at: Instant,
    generation: u64,
    released: bool,
}

impl CaptureHandle {
    pub(crate) fn new(
        stream: Box<dyn MediaStream>,
        mut chunk_rx: mpsc::Receiver<MediaChunk>,
        generation: u64,
    ) -> Self {
        let collector = tokio::spawn(async move {
            let mut chunks = Vec::new();
            while let Some(chunk) = chunk_rx.recv().await {
                debug!(
                    "Buffered chunk at {} ms ({} bytes)",
                    chunk.timestamp_ms,
                    chunk.data.len()
                );
                chunks.push(chunk);
            }
            chunks
        });

        Self {
            stream,
            collector: Some(collector),
            countdown: None,
            started_at: Instant::now(),
            generation,
            released: false,
        }
    }

    pub(crate) fn set_countdown(&mut self, countdown: Countdown) {
        self.countdown = Some(countdown);
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop capture, release the devices and assemble the clip
    ///
    /// Tracks are released even when stopping the stream fails.
    pub(crate) async fn finish(
        &mut self,
        reason: StopReason,
        mime_type: &str,
    ) -> Result<Clip, MediaError> {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }

        let stopped = self.stream.stop_recording().await;
        self.release();
        if let Err(e) = stopped {
            error!("Failed to stop media stream: {}", e);
            if let Some(collector) = self.collector.take() {
                collector.abort();
            }
            return Err(e);
        }

        let chunks = match self.collector.take() {
            Some(collector) => collector
                .await
                .map_err(|e| MediaError::Stream(format!("chunk collector failed: {}", e)))?,
            None => Vec::new(),
        };

        Ok(Clip::from_chunks(
            chunks,
            mime_type,
            self.started_at.elapsed(),
            reason,
        ))
    }

    fn release(&mut self) {
        if !self.released {
            self.stream.stop_tracks();
            self.released = true;
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        if !self.released {
            warn!("Capture abandoned while recording, releasing devices");
            self.release();
        }
        if let Some(collector) = self.collector.take() {
            collector.abort();
        }
    }
}
