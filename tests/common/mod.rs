// Shared test doubles for recorder and upload tests

#![allow(dead_code)]

use answer_recorder::media::{
    MediaChunk, MediaConstraints, MediaDevices, MediaStream, PreviewSurface, TrackInfo, TrackKind,
    TrackState,
};
use answer_recorder::{
    ClipUploader, IdentityProvider, MediaError, Recorder, RecorderConfig, SessionIdentity,
    UploadError, UploadReceipt, UploadRequest,
};
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;

/// Per-stream bookkeeping the tests inspect after the fact
#[derive(Default)]
pub struct TrackLedger {
    pub tracks: Mutex<Vec<TrackInfo>>,
    pub releases: AtomicUsize,
}

impl TrackLedger {
    pub fn live_tracks(&self) -> usize {
        self.tracks.lock().unwrap().iter().filter(|t| t.is_live()).count()
    }
}

/// Devices that either refuse access or hand out a stream repeating a
/// payload once per timeslice
pub struct ScriptedDevices {
    deny: bool,
    payloads: Mutex<VecDeque<Bytes>>,
    pub acquisitions: AtomicUsize,
    pub ledgers: Mutex<Vec<Arc<TrackLedger>>>,
}

impl ScriptedDevices {
    pub fn new(payloads: &[&'static [u8]]) -> Arc<Self> {
        Arc::new(Self {
            deny: false,
            payloads: Mutex::new(payloads.iter().map(|p| Bytes::from_static(*p)).collect()),
            acquisitions: AtomicUsize::new(0),
            ledgers: Mutex::new(Vec::new()),
        })
    }

    pub fn denying() -> Arc<Self> {
        Arc::new(Self {
            deny: true,
            payloads: Mutex::new(VecDeque::new()),
            acquisitions: AtomicUsize::new(0),
            ledgers: Mutex::new(Vec::new()),
        })
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn ledger(&self, index: usize) -> Arc<TrackLedger> {
        Arc::clone(&self.ledgers.lock().unwrap()[index])
    }
}

#[async_trait::async_trait]
impl MediaDevices for ScriptedDevices {
    async fn get_user_media(
        &self,
        _constraints: MediaConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError> {
        if self.deny {
            return Err(MediaError::PermissionDenied("denied by test".to_string()));
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        let payload = {
            let mut payloads = self.payloads.lock().unwrap();
            if payloads.len() > 1 {
                payloads.pop_front().unwrap()
            } else {
                payloads.front().cloned().unwrap_or_else(|| Bytes::from_static(b"x"))
            }
        };

        let ledger = Arc::new(TrackLedger::default());
        *ledger.tracks.lock().unwrap() = vec![
            TrackInfo::new("video-0", TrackKind::Video, "Test Camera"),
            TrackInfo::new("audio-0", TrackKind::Audio, "Test Microphone"),
        ];
        self.ledgers.lock().unwrap().push(Arc::clone(&ledger));

        Ok(Box::new(ScriptedStream {
            ledger,
            payload,
            pump: None,
        }))
    }
}

pub struct ScriptedStream {
    ledger: Arc<TrackLedger>,
    payload: Bytes,
    pump: Option<(oneshot::Sender<()>, JoinHandle<()>)>,
}

#[async_trait::async_trait]
impl MediaStream for ScriptedStream {
    fn label(&self) -> &str {
        "scripted"
    }

    fn tracks(&self) -> Vec<TrackInfo> {
        self.ledger.tracks.lock().unwrap().clone()
    }

    async fn start_recording(
        &mut self,
        timeslice: Duration,
    ) -> Result<mpsc::Receiver<MediaChunk>, MediaError> {
        let (tx, rx) = mpsc::channel(256);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let payload = self.payload.clone();

        let pump = tokio::spawn(async move {
            let mut interval = tokio::time::interval(timeslice);
            let mut elapsed_ms = 0;
            loop {
                tokio::select! {
                    biased;
                    _ = interval.tick() => {
                        let chunk = MediaChunk { data: payload.clone(), timestamp_ms: elapsed_ms };
                        elapsed_ms += timeslice.as_millis() as u64;
                        if tx.send(chunk).await.is_err() {
                            return;
                        }
                    }
                    _ = &mut stop_rx => return,
                }
            }
        });

        self.pump = Some((stop_tx, pump));
        Ok(rx)
    }

    async fn stop_recording(&mut self) -> Result<(), MediaError> {
        if let Some((stop_tx, pump)) = self.pump.take() {
            let _ = stop_tx.send(());
            let _ = pump.await;
        }
        Ok(())
    }

    fn stop_tracks(&mut self) {
        self.ledger.releases.fetch_add(1, Ordering::SeqCst);
        for track in self.ledger.tracks.lock().unwrap().iter_mut() {
            track.state = TrackState::Ended;
        }
    }
}

/// Identity the test can revoke mid-session
#[derive(Default)]
pub struct SwitchableIdentity(Mutex<Option<SessionIdentity>>);

impl SwitchableIdentity {
    pub fn signed_in(id: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(SessionIdentity::new(id))))
    }

    pub fn sign_out(&self) {
        *self.0.lock().unwrap() = None;
    }
}

impl IdentityProvider for SwitchableIdentity {
    fn current(&self) -> Option<SessionIdentity> {
        self.0.lock().unwrap().clone()
    }
}

/// Uploader that counts calls, fails the first `failures` of them and can
/// hold each call until released
#[derive(Default)]
pub struct CountingUploader {
    failures: AtomicUsize,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<UploadRequest>>,
    pub gate: Option<Arc<Notify>>,
}

impl CountingUploader {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        })
    }

    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ClipUploader for CountingUploader {
    async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let size = request.data.len() as u64;
        let file_name = request.file_name.clone();
        self.requests.lock().unwrap().push(request);

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(UploadError::Status {
                status: 500,
                body: r#"{"error":"Error parsing the form"}"#.to_string(),
            });
        }

        Ok(UploadReceipt {
            message: "Video uploaded successfully".to_string(),
            file_path: format!("uploads/{}", file_name),
            size,
            fields: vec!["video".to_string()],
        })
    }
}

/// Preview that remembers how it was used
#[derive(Default)]
pub struct RecordingPreview {
    pub attached: AtomicUsize,
    pub detached: AtomicUsize,
    pub muted: Mutex<Option<bool>>,
}

impl PreviewSurface for RecordingPreview {
    fn attach(&self, _label: &str, _tracks: &[TrackInfo], audio_muted: bool) {
        self.attached.fetch_add(1, Ordering::SeqCst);
        *self.muted.lock().unwrap() = Some(audio_muted);
    }

    fn detach(&self) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn recorder(
    config: RecorderConfig,
    devices: Arc<dyn MediaDevices>,
    identity: Arc<dyn IdentityProvider>,
    uploader: Arc<dyn ClipUploader>,
) -> Recorder {
    Recorder::new(
        config,
        devices,
        identity,
        uploader,
        Arc::new(answer_recorder::media::NullPreview),
    )
}
