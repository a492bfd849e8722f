use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing::{error, info};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

mod api;
mod config;
mod job;
mod shutdown;
mod storage;
mod worker;

use crate::api::chat::ChatMessage;
use crate::api::image::GeneratedImage;
use crate::api::ArkClient;
use crate::config::Config;
use crate::job::{GenerationMode, Resolution, SubmitParams, VideoTaskTracker};
use crate::storage::TosUploader;
use crate::worker::PollWorker;

#[derive(Parser)]
#[command(name = "modelhub", about = "Console for a hosted generative AI API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream a chat completion to stdout
    Chat {
        /// User message
        #[arg(long)]
        message: String,
        /// Optional system prompt
        #[arg(long)]
        system: Option<String>,
        #[arg(long, default_value_t = 0.7)]
        temperature: f32,
    },
    /// Generate images and print or save them
    Image {
        #[arg(long)]
        prompt: String,
        #[arg(long, default_value = "1024x1024")]
        size: String,
        /// Number of images (1-4)
        #[arg(long, default_value_t = 1)]
        count: u8,
        /// Directory for decoded base64 images
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Submit a video generation task and poll it to completion
    Video {
        /// Scene description
        #[arg(long)]
        prompt: String,
        #[arg(long, value_enum, default_value_t = Resolution::P720)]
        resolution: Resolution,
        /// Clip length in seconds
        #[arg(long, default_value_t = 5)]
        duration: u32,
        /// Public URL of a source image (image-to-video)
        #[arg(long, conflicts_with = "image_file")]
        image_url: Option<String>,
        /// Local source image to upload first (image-to-video)
        #[arg(long)]
        image_file: Option<PathBuf>,
    },
}

/// Console layer plus daily-rotated files in the log directory
///
/// The console goes to stderr so streamed chat tokens on stdout stay
/// clean enough to pipe.
fn init_tracing(log_dir: &str) {
    std::fs::create_dir_all(log_dir).expect("Failed to create logs directory");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let app_file = tracing_appender::rolling::daily(log_dir, "app.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true);

    let app_layer = tracing_subscriber::fmt::layer()
        .with_writer(app_file)
        .with_ansi(false);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(error_layer)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = Config::from_env().expect("Failed to load configuration");

    init_tracing(&cfg.log_dir);

    let cli = Cli::parse();
    let client = ArkClient::new(cfg.base_url.clone(), cfg.api_key.clone());

    let result = match cli.command {
        Command::Chat {
            message,
            system,
            temperature,
        } => run_chat(&client, &cfg, message, system, temperature).await,
        Command::Image {
            prompt,
            size,
            count,
            out_dir,
        } => run_image(&client, &cfg, prompt, size, count, out_dir).await,
        Command::Video {
            prompt,
            resolution,
            duration,
            image_url,
            image_file,
        } => run_video(&client, &cfg, prompt, resolution, duration, image_url, image_file).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("command failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_chat(
    client: &ArkClient,
    cfg: &Config,
    message: String,
    system: Option<String>,
    temperature: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(message));

    info!(model = %cfg.chat_model, "starting chat completion");
    let stream = client
        .chat_stream(&cfg.chat_model, &messages, temperature)
        .await?;
    tokio::pin!(stream);

    // Blocks until the stream ends or errors; there is no cancellation
    let mut stdout = std::io::stdout();
    while let Some(token) = stream.next().await {
        let token = token?;
        stdout.write_all(token.as_bytes())?;
        stdout.flush()?;
    }
    println!();
    Ok(())
}

async fn run_image(
    client: &ArkClient,
    cfg: &Config,
    prompt: String,
    size: String,
    count: u8,
    out_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(model = %cfg.image_model, count, "generating images");
    let images = client
        .generate_images(&cfg.image_model, &prompt, &size, count)
        .await?;

    if images.is_empty() {
        println!("no images returned");
        return Ok(());
    }
    for (i, image) in images.iter().enumerate() {
        match image {
            GeneratedImage::Url(url) => println!("image {}: {url}", i + 1),
            GeneratedImage::Base64(b64) => {
                let bytes = BASE64.decode(b64)?;
                let path = out_dir.join(format!("image-{}.png", i + 1));
                tokio::fs::write(&path, bytes).await?;
                println!("image {}: saved to {}", i + 1, path.display());
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_video(
    client: &ArkClient,
    cfg: &Config,
    prompt: String,
    resolution: Resolution,
    duration: u32,
    image_url: Option<String>,
    image_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // A local file is uploaded first so the provider can fetch it by URL
    let source_image_url = match image_file {
        Some(path) => {
            let uploader = TosUploader::from_config(cfg.storage.as_ref())?;
            let bytes = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload.bin");
            let url = uploader.upload(file_name, bytes).await?;
            info!(url = %url, "source image uploaded");
            Some(url)
        }
        None => image_url,
    };

    let mode = if source_image_url.is_some() {
        GenerationMode::ImageToVideo
    } else {
        GenerationMode::TextToVideo
    };
    let params = SubmitParams {
        prompt,
        mode,
        resolution,
        duration,
        source_image_url,
    };

    let mut tracker = VideoTaskTracker::new();
    let job = tracker.submit(client, &cfg.video_model, params).await?;
    println!("task {} submitted ({})", job.task_id, job.mode);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        shutdown::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let worker = PollWorker::new(Duration::from_secs(cfg.poll_interval_secs));
    worker.run(client, &mut tracker, shutdown_rx).await;

    for job in tracker.jobs_newest_first() {
        println!("task {}: {}", job.task_id, job.status);
        if let Some(image) = &job.source_image_url {
            println!("  input image: {image}");
        }
        match (&job.status, &job.video_url) {
            (_, Some(url)) => println!("  video: {url}"),
            (crate::job::JobStatus::Succeeded, None) => {
                println!("  succeeded, but the response carried no playable URL")
            }
            _ => {}
        }
    }
    Ok(())
}
