// Tests for config loading and its mapping onto the recorder

use anyhow::Result;
use answer_recorder::Config;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_missing_config_file_falls_back_to_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("absent");

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.service.name, "answer-recorder");
    assert_eq!(cfg.service.http.port, 3000);
    assert_eq!(cfg.storage.uploads_dir, "uploads");
    assert_eq!(cfg.recorder.countdown_secs, 60, "Countdown ceiling is 60");
    assert_eq!(cfg.recorder.field_name, "video");
    assert_eq!(cfg.recorder.mime_type, "video/webm");

    Ok(())
}

#[test]
fn test_config_file_overrides_sections() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("answer-recorder.toml");
    fs::write(
        &path,
        r#"
[service.http]
bind = "0.0.0.0"
port = 8080

[storage]
uploads_dir = "/var/lib/answers"

[recorder]
countdown_secs = 30
timeslice_ms = 250
"#,
    )?;

    let cfg = Config::load(path.to_str().unwrap())?;

    assert_eq!(cfg.http_addr()?.to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.storage.uploads_dir, "/var/lib/answers");

    let recorder = cfg.recorder.to_recorder_config();
    assert_eq!(recorder.countdown_secs, 30);
    assert_eq!(recorder.timeslice, Duration::from_millis(250));
    assert_eq!(recorder.tick, Duration::from_secs(1));
    assert_eq!(recorder.field_name, "video");

    Ok(())
}

#[test]
fn test_invalid_bind_address_is_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[service.http]\nbind = \"not an address\"\n")?;

    let cfg = Config::load(path.to_str().unwrap())?;
    assert!(cfg.http_addr().is_err());

    Ok(())
}
