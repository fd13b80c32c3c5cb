use super::capture::CaptureHandle;
use super::clip::Clip;
use super::config::RecorderConfig;
use super::countdown::Countdown;
use super::state::{RecorderEvent, RecorderState, StopReason};
use crate::error::RecorderError;
use crate::identity::IdentityProvider;
use crate::media::{MediaConstraints, MediaDevices, PreviewSurface};
use crate::upload::{clip_file_name, ClipUploader, UploadReceipt, UploadRequest};
use chrono::Utc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

/// Records one bounded clip at a time and uploads it on request
///
/// Cheap to clone; clones share the same recording. All transitions are
/// serialized, so concurrent `start_recording` calls yield at most one
/// recording and a racing manual stop and countdown stop produce a single
/// transition.
#[derive(Clone)]
pub struct Recorder {
    inner: Arc<Inner>,
}

struct Inner {
    config: RecorderConfig,
    devices: Arc<dyn MediaDevices>,
    identity: Arc<dyn IdentityProvider>,
    uploader: Arc<dyn ClipUploader>,
    preview: Arc<dyn PreviewSurface>,
    events: broadcast::Sender<RecorderEvent>,

    /// Seconds left on the current countdown
    remaining: AtomicU32,

    /// Incremented for every recording so a stale countdown cannot stop a
    /// newer one
    generation: AtomicU64,

    core: Mutex<Core>,
}

struct Core {
    state: RecorderState,
    capture: Option<CaptureHandle>,
    clip: Option<Clip>,
}

impl Recorder {
    pub fn new(
        config: RecorderConfig,
        devices: Arc<dyn MediaDevices>,
        identity: Arc<dyn IdentityProvider>,
        uploader: Arc<dyn ClipUploader>,
        preview: Arc<dyn PreviewSurface>,
    ) -> Self {
        let (events, _) = broadcast::channel(128);
        let remaining = AtomicU32::new(config.countdown_secs);

        Self {
            inner: Arc::new(Inner {
                config,
                devices,
                identity,
                uploader,
                preview,
                events,
                remaining,
                generation: AtomicU64::new(0),
                core: Mutex::new(Core {
                    state: RecorderState::Idle,
                    capture: None,
                    clip: None,
                }),
            }),
        }
    }

    /// Subscribe to state changes and countdown ticks
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.inner.events.subscribe()
    }

    pub async fn state(&self) -> RecorderState {
        self.inner.core.lock().await.state
    }

    /// The finished clip, if one is waiting to be uploaded
    pub async fn clip(&self) -> Option<Clip> {
        self.inner.core.lock().await.clip.clone()
    }

    pub fn remaining(&self) -> u32 {
        self.inner.remaining.load(Ordering::SeqCst)
    }

    /// Acquire camera and microphone and start recording
    pub async fn start_recording(&self) -> Result<(), RecorderError> {
        let identity = self
            .inner
            .identity
            .current()
            .ok_or(RecorderError::Unauthenticated)?;

        let mut core = self.inner.core.lock().await;
        if !core.state.can_start() {
            warn!("Start rejected while {}", core.state);
            return Err(RecorderError::Busy(core.state));
        }

        info!("Starting recording for {}", identity);

        let mut stream = self
            .inner
            .devices
            .get_user_media(MediaConstraints::default())
            .await
            .map_err(|e| {
                warn!("Media access failed: {}", e);
                RecorderError::MediaAccessDenied(e)
            })?;

        let chunk_rx = match stream.start_recording(self.inner.config.timeslice).await {
            Ok(rx) => rx,
            Err(e) => {
                error!("Failed to start recording: {}", e);
                stream.stop_tracks();
                return Err(RecorderError::Capture(e));
            }
        };

        // Muted for local monitoring only
        self.inner
            .preview
            .attach(stream.label(), &stream.tracks(), true);

        if core.clip.take().is_some() {
            debug!("Discarding previous clip");
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let ceiling = self.inner.config.countdown_secs;
        self.inner.remaining.store(ceiling, Ordering::SeqCst);

        let mut capture = CaptureHandle::new(stream, chunk_rx, generation);
        capture.set_countdown(self.spawn_countdown(generation));
        core.capture = Some(capture);

        self.inner.set_state(&mut core, RecorderState::Recording);
        self.inner.emit(RecorderEvent::CountdownTick { remaining: ceiling });

        info!(
            "Recording started (generation {}, {}s limit)",
            generation, ceiling
        );
        Ok(())
    }

    /// Stop the current recording. A no-op unless recording.
    pub async fn stop_recording(&self) -> Result<(), RecorderError> {
        self.inner.stop(None, StopReason::Manual).await
    }

    /// Upload the finished clip
    pub async fn upload_recording(&self) -> Result<UploadReceipt, RecorderError> {
        let identity = self
            .inner
            .identity
            .current()
            .ok_or(RecorderError::Unauthenticated)?;

        let request = {
            let mut core = self.inner.core.lock().await;
            if core.state == RecorderState::Uploading {
                return Err(RecorderError::Busy(core.state));
            }
            let clip = match &core.clip {
                Some(clip) => clip.clone(),
                None => return Err(RecorderError::NothingToUpload),
            };

            self.inner.set_state(&mut core, RecorderState::Uploading);

            UploadRequest {
                field_name: self.inner.config.field_name.clone(),
                file_name: clip_file_name(&identity, Utc::now().timestamp_millis()),
                mime_type: clip.mime_type.clone(),
                data: clip.data,
            }
        };

        let result = self.inner.uploader.upload(request).await;

        let mut core = self.inner.core.lock().await;
        match result {
            Ok(receipt) => {
                info!("Upload successful: {}", receipt.file_path);
                core.clip = None;
                self.inner.set_state(&mut core, RecorderState::UploadSucceeded);
                self.inner.emit(RecorderEvent::Uploaded(receipt.clone()));
                Ok(receipt)
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                self.inner.set_state(&mut core, RecorderState::UploadFailed);
                Err(RecorderError::UploadFailed(e))
            }
        }
    }

    fn spawn_countdown(&self, generation: u64) -> Countdown {
        let on_tick: Weak<Inner> = Arc::downgrade(&self.inner);
        let on_elapsed: Weak<Inner> = Arc::downgrade(&self.inner);

        Countdown::start(
            self.inner.config.countdown_secs,
            self.inner.config.tick,
            move |remaining| {
                if let Some(inner) = on_tick.upgrade() {
                    inner.remaining.store(remaining, Ordering::SeqCst);
                    inner.emit(RecorderEvent::CountdownTick { remaining });
                }
            },
            move || async move {
                let Some(inner) = on_elapsed.upgrade() else {
                    return;
                };
                info!("Time limit reached, stopping recording");
                if let Err(e) = inner
                    .stop(Some(generation), StopReason::CountdownElapsed)
                    .await
                {
                    error!("Automatic stop failed: {}", e);
                }
            },
        )
    }
}

impl Inner {
    /// Single exit from `Recording`; `generation` restricts the stop to one
    /// specific recording
    async fn stop(&self, generation: Option<u64>, reason: StopReason) -> Result<(), RecorderError> {
        let mut core = self.core.lock().await;
        if core.state != RecorderState::Recording {
            debug!("Stop ignored while {}", core.state);
            return Ok(());
        }

        let current = core.capture.as_ref().map(CaptureHandle::generation);
        if generation.is_some() && generation != current {
            debug!("Stop ignored for stale recording {:?}", generation);
            return Ok(());
        }

        let Some(mut capture) = core.capture.take() else {
            return Ok(());
        };

        info!("Stopping recording ({:?})", reason);
        let finished = capture.finish(reason, &self.config.mime_type).await;
        drop(capture);
        self.preview.detach();

        match finished {
            Ok(clip) => {
                info!(
                    "Recording finished: {} bytes in {} chunks, {:.1}s",
                    clip.len(),
                    clip.chunk_count,
                    clip.duration.as_secs_f64()
                );
                core.clip = Some(clip);
                self.set_state(&mut core, RecorderState::Stopped);
                Ok(())
            }
            Err(e) => {
                self.set_state(&mut core, RecorderState::Idle);
                Err(RecorderError::Capture(e))
            }
        }
    }

    fn set_state(&self, core: &mut Core, state: RecorderState) {
        debug!("Recorder state: {} -> {}", core.state, state);
        core.state = state;
        self.emit(RecorderEvent::StateChanged(state));
    }

    fn emit(&self, event: RecorderEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
