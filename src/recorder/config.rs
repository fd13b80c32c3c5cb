use std::time::Duration;

/// Configuration for the recorder
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Countdown ceiling; the recording stops automatically when it runs out
    /// Default: 60
    pub countdown_secs: u32,

    /// Interval between countdown ticks
    pub tick: Duration,

    /// How often the stream delivers a chunk
    pub timeslice: Duration,

    /// Media type the finished clip is tagged with
    pub mime_type: String,

    /// Multipart field carrying the clip
    pub field_name: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 60,
            tick: Duration::from_secs(1),
            timeslice: Duration::from_secs(1),
            mime_type: "video/webm".to_string(),
            field_name: "video".to_string(),
        }
    }
}
