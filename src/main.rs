use anyhow::{Context, Result};
use answer_recorder::media::LogPreview;
use answer_recorder::{
    AppState, ClipStore, Config, FileDevices, HttpUploader, Recorder, RecorderEvent,
    RecorderState, StaticIdentity,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "answer-recorder", version, about = "Record a video answer and upload it")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/answer-recorder")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the upload endpoint
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        uploads_dir: Option<String>,
    },
    /// Record from a prerecorded file and upload the clip
    Record {
        /// Clip replayed as the camera
        #[arg(long)]
        input: PathBuf,
        /// Session identity used in the uploaded filename
        #[arg(long)]
        email: String,
        #[arg(long)]
        url: Option<String>,
        /// Override the countdown ceiling in seconds
        #[arg(long)]
        countdown: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve {
            bind,
            port,
            uploads_dir,
        } => {
            if let Some(bind) = bind {
                cfg.service.http.bind = bind;
            }
            if let Some(port) = port {
                cfg.service.http.port = port;
            }
            if let Some(dir) = uploads_dir {
                cfg.storage.uploads_dir = dir;
            }
            serve(cfg).await
        }
        Command::Record {
            input,
            email,
            url,
            countdown,
        } => {
            if let Some(url) = url {
                cfg.recorder.upload_url = url;
            }
            if let Some(countdown) = countdown {
                cfg.recorder.countdown_secs = countdown;
            }
            record(cfg, input, email).await
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let addr = cfg.http_addr()?;
    info!("Uploads directory: {}", cfg.storage.uploads_dir);

    let state = AppState::new(
        ClipStore::new(&cfg.storage.uploads_dir),
        cfg.recorder.field_name.as_str(),
    );
    answer_recorder::http::serve(state, addr).await
}

async fn record(cfg: Config, input: PathBuf, email: String) -> Result<()> {
    let recorder = Recorder::new(
        cfg.recorder.to_recorder_config(),
        Arc::new(FileDevices::new(input)),
        Arc::new(StaticIdentity::new(email)),
        Arc::new(HttpUploader::new(cfg.recorder.upload_url.clone())),
        Arc::new(LogPreview),
    );

    let mut events = recorder.subscribe();
    recorder
        .start_recording()
        .await
        .context("Could not start recording")?;

    println!("Recording... press Enter to stop");
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    recorder.stop_recording().await?;
                    break;
                }
                // No terminal: let the countdown end the recording
                _ => stdin_open = false,
            },
            event = events.recv() => match event {
                Ok(RecorderEvent::CountdownTick { remaining }) => {
                    println!("Time remaining: {} seconds", remaining);
                }
                Ok(RecorderEvent::StateChanged(RecorderState::Stopped | RecorderState::Idle)) => break,
                Ok(_) => {}
                Err(_) => {
                    if recorder.state().await != RecorderState::Recording {
                        break;
                    }
                }
            }
        }
    }

    if let Some(clip) = recorder.clip().await {
        println!(
            "Recorded {} bytes ({:.1}s)",
            clip.len(),
            clip.duration.as_secs_f64()
        );
    }

    match recorder.upload_recording().await {
        Ok(receipt) => {
            println!("Upload successful! Stored at {}", receipt.file_path);
            Ok(())
        }
        Err(e) => {
            println!("Error: {}", e);
            Err(e.into())
        }
    }
}
