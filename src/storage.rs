use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

const DEFAULT_EXTENSION: &str = "webm";

/// Longest file name common filesystems accept, in bytes
const MAX_FILE_NAME: usize = 255;

/// Room kept for the `-<n>` collision counter
const COUNTER_RESERVE: usize = 1 + 10;

const MAX_EXTENSION: usize = 16;

/// A clip written to the storage directory
#[derive(Debug, Clone)]
pub struct StoredClip {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Writes uploaded clips into a single directory
#[derive(Debug, Clone)]
pub struct ClipStore {
    dir: PathBuf,
}

impl ClipStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the storage directory if it is missing
    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Store `data` as `<base>-<timestamp-ms>.<ext>`
    ///
    /// The bytes go to a hidden temp file first and are hard-linked into
    /// place, so the final name only ever appears with the complete data. A
    /// name taken within the same millisecond gets a counter instead of
    /// being overwritten.
    pub async fn save(
        &self,
        original_name: Option<&str>,
        field_name: &str,
        data: &[u8],
    ) -> io::Result<StoredClip> {
        self.ensure_dir().await?;

        let temp_path = self.dir.join(format!(".{}.part", Uuid::new_v4()));
        if let Err(e) = write_file(&temp_path, data).await {
            warn!("Failed to write {}: {}", temp_path.display(), e);
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        let file_name = stored_name(original_name, field_name, Utc::now().timestamp_millis());
        let linked = self.link_unique(&temp_path, &file_name).await;
        if let Err(e) = fs::remove_file(&temp_path).await {
            warn!("Failed to remove {}: {}", temp_path.display(), e);
        }
        let (file_name, path) = linked?;

        info!("Stored clip {} ({} bytes)", path.display(), data.len());

        Ok(StoredClip {
            file_name,
            path,
            size: data.len() as u64,
        })
    }

    /// Link `source` under `file_name`, or the first free `<stem>-<n>.<ext>`
    ///
    /// `hard_link` fails on an existing target, so a taken name is never
    /// replaced.
    async fn link_unique(&self, source: &Path, file_name: &str) -> io::Result<(String, PathBuf)> {
        let (stem, ext) = split_extension(file_name);
        let mut name = file_name.to_string();
        let mut n = 0u32;
        loop {
            let candidate = self.dir.join(&name);
            match fs::hard_link(source, &candidate).await {
                Ok(()) => {
                    if n > 0 {
                        debug!("{} taken, using {}", file_name, name);
                    }
                    return Ok((name, candidate));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    n += 1;
                    name = format!("{}-{}.{}", stem, n, ext);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

/// Name for an uploaded file: the original stem plus `-<timestamp_ms>`,
/// extension preserved
///
/// Directory components and characters outside `[A-Za-z0-9._@+-]` are
/// dropped. Without a usable original name the field name is the stem. Long
/// stems are cut so the name, collision counter included, stays within
/// [`MAX_FILE_NAME`] bytes.
pub fn stored_name(original_name: Option<&str>, field_name: &str, timestamp_ms: i64) -> String {
    let base = original_name
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .map(sanitize)
        .filter(|name| !name.trim_matches('.').is_empty())
        .unwrap_or_else(|| sanitize(field_name));

    let (stem, ext) = split_extension(&base);
    let stem = if stem.is_empty() { "upload" } else { stem };
    let ext = truncate(ext, MAX_EXTENSION);

    let suffix = format!("-{}.{}", timestamp_ms, ext);
    let budget = MAX_FILE_NAME.saturating_sub(COUNTER_RESERVE + suffix.len());
    format!("{}{}", truncate(stem, budget), suffix)
}

fn truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, ext),
        _ => (name.trim_matches('.'), DEFAULT_EXTENSION),
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '+' | '-'))
        .collect()
}
