use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::recorder::RecorderConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub recorder: RecorderSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "answer-recorder".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub uploads_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: "uploads".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecorderSettings {
    pub countdown_secs: u32,
    pub timeslice_ms: u64,
    pub upload_url: String,
    pub mime_type: String,
    pub field_name: String,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        let defaults = RecorderConfig::default();
        Self {
            countdown_secs: defaults.countdown_secs,
            timeslice_ms: defaults.timeslice.as_millis() as u64,
            upload_url: "http://127.0.0.1:3000/upload-video".to_string(),
            mime_type: defaults.mime_type,
            field_name: defaults.field_name,
        }
    }
}

impl RecorderSettings {
    pub fn to_recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            countdown_secs: self.countdown_secs,
            timeslice: Duration::from_millis(self.timeslice_ms.max(1)),
            mime_type: self.mime_type.clone(),
            field_name: self.field_name.clone(),
            ..RecorderConfig::default()
        }
    }
}

impl Config {
    /// Load `path` (extension optional, missing file allowed) and overlay
    /// `ANSWER_RECORDER__SECTION__KEY` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ANSWER_RECORDER").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    pub fn http_addr(&self) -> Result<std::net::SocketAddr> {
        let addr = format!("{}:{}", self.service.http.bind, self.service.http.port);
        addr.parse()
            .with_context(|| format!("Invalid HTTP bind address {}", addr))
    }
}
