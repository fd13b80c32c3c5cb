use super::state::StopReason;
use crate::media::MediaChunk;
use bytes::{Bytes, BytesMut};
use std::time::Duration;

/// A finished recording
#[derive(Debug, Clone)]
pub struct Clip {
    /// Every chunk of the recording, in arrival order
    pub data: Bytes,
    pub mime_type: String,
    /// Wall time between start and stop
    pub duration: Duration,
    pub chunk_count: usize,
    pub stop_reason: StopReason,
}

impl Clip {
    /// Concatenate `chunks` into one immutable buffer
    pub fn from_chunks(
        chunks: Vec<MediaChunk>,
        mime_type: impl Into<String>,
        duration: Duration,
        stop_reason: StopReason,
    ) -> Self {
        let total: usize = chunks.iter().map(|c| c.data.len()).sum();
        let mut buf = BytesMut::with_capacity(total);
        for chunk in &chunks {
            buf.extend_from_slice(&chunk.data);
        }

        Self {
            data: buf.freeze(),
            mime_type: mime_type.into(),
            duration,
            chunk_count: chunks.len(),
            stop_reason,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(data: &'static [u8], timestamp_ms: u64) -> MediaChunk {
        MediaChunk {
            data: Bytes::from_static(data),
            timestamp_ms,
        }
    }

    #[test]
    fn test_chunks_concatenate_in_order() {
        let clip = Clip::from_chunks(
            vec![chunk(b"ab", 0), chunk(b"", 1000), chunk(b"cde", 2000)],
            "video/webm",
            Duration::from_secs(3),
            StopReason::Manual,
        );

        assert_eq!(&clip.data[..], b"abcde");
        assert_eq!(clip.len(), 5);
        assert_eq!(clip.chunk_count, 3);
        assert_eq!(clip.mime_type, "video/webm");
    }

    #[test]
    fn test_no_chunks_gives_empty_clip() {
        let clip = Clip::from_chunks(
            Vec::new(),
            "video/webm",
            Duration::ZERO,
            StopReason::CountdownElapsed,
        );
        assert!(clip.is_empty());
        assert_eq!(clip.chunk_count, 0);
    }
}
