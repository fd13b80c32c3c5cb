use crate::error::UploadError;
use crate::identity::SessionIdentity;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// One multipart upload of a finished clip
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Form field carrying the binary
    pub field_name: String,
    pub file_name: String,
    pub mime_type: String,
    pub data: Bytes,
}

/// Success body of `POST /upload-video`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub message: String,
    /// Where the endpoint stored the clip
    pub file_path: String,
    /// Stored size in bytes
    pub size: u64,
    /// Names of every form field the endpoint received
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Transport used by the recorder to hand off a clip
#[async_trait::async_trait]
pub trait ClipUploader: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError>;
}

/// Filename the client proposes for a clip: `recording-<identity>-<ms>.webm`
pub fn clip_file_name(identity: &SessionIdentity, timestamp_ms: i64) -> String {
    format!("recording-{}-{}.webm", identity, timestamp_ms)
}

/// Multipart POST over HTTP
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    url: String,
}

impl HttpUploader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ClipUploader for HttpUploader {
    async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError> {
        info!(
            "Uploading {} ({} bytes) to {}",
            request.file_name,
            request.data.len(),
            self.url
        );

        let part = reqwest::multipart::Part::bytes(request.data.to_vec())
            .file_name(request.file_name)
            .mime_str(&request.mime_type)?;
        let form = reqwest::multipart::Form::new().part(request.field_name, part);

        let response = self.client.post(&self.url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Upload rejected with {}: {}", status, body);
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: UploadReceipt = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        info!("Upload stored at {}", receipt.file_path);
        Ok(receipt)
    }
}
