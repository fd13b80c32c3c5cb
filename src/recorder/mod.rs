//! Recorder state machine
//!
//! This module provides the `Recorder` that drives one answer:
//! - Camera/microphone acquisition through `MediaDevices`
//! - Chunk buffering while recording
//! - The fixed countdown and its automatic stop
//! - Clip finalization and upload

mod capture;
mod clip;
mod config;
mod countdown;
mod session;
mod state;

pub use clip::Clip;
pub use config::RecorderConfig;
pub use session::Recorder;
pub use state::{RecorderEvent, RecorderState, StopReason};
