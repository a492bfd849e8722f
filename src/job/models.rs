use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use validator::{Validate, ValidationError};

/// Job status enum representing the state of a video generation task
///
/// `Pending` is the only non-terminal state. `Failed` means the remote
/// service reported failure; `Error` means the polling call itself failed
/// and carries that failure's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
    Error(String),
}

impl JobStatus {
    /// Terminal states are never polled again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Error(msg) => write!(f, "error (polling failed: {msg})"),
        }
    }
}

/// How the video is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    TextToVideo,
    ImageToVideo,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::TextToVideo => write!(f, "text-to-video"),
            GenerationMode::ImageToVideo => write!(f, "image-to-video"),
        }
    }
}

/// Output resolution accepted by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resolution {
    #[value(name = "480p")]
    P480,
    #[value(name = "720p")]
    P720,
    #[value(name = "1080p")]
    P1080,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::P480 => write!(f, "480p"),
            Resolution::P720 => write!(f, "720p"),
            Resolution::P1080 => write!(f, "1080p"),
        }
    }
}

/// Validated inputs for one video task submission
#[derive(Debug, Validate)]
#[validate(schema(function = "validate_mode_inputs"))]
pub struct SubmitParams {
    #[validate(length(min = 1, message = "Prompt must not be empty"))]
    pub prompt: String,

    pub mode: GenerationMode,

    pub resolution: Resolution,

    /// Clip length in seconds
    #[validate(range(min = 1, max = 30, message = "Duration must be between 1 and 30 seconds"))]
    pub duration: u32,

    /// Source frame; required for image-to-video, rejected otherwise
    pub source_image_url: Option<String>,
}

fn validate_mode_inputs(params: &SubmitParams) -> Result<(), ValidationError> {
    match params.mode {
        GenerationMode::ImageToVideo if params.source_image_url.is_none() => {
            Err(ValidationError::new("source_image_required"))
        }
        GenerationMode::TextToVideo if params.source_image_url.is_some() => {
            Err(ValidationError::new("source_image_not_allowed"))
        }
        _ => Ok(()),
    }
}

/// One submitted video generation task, tracked from submission until a
/// terminal status
///
/// `task_id`, `prompt`, `mode` and `source_image_url` never change after
/// creation; `status` and `video_url` are mutated only by polling.
#[derive(Debug, Clone, Serialize)]
pub struct VideoJob {
    /// Identifier assigned by the remote service
    pub task_id: String,
    pub prompt: String,
    pub mode: GenerationMode,
    pub source_image_url: Option<String>,
    pub status: JobStatus,
    /// Playable media URL; set if and only if the job succeeded and the
    /// provider response carried one
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoJob {
    pub(crate) fn pending(
        task_id: String,
        prompt: String,
        mode: GenerationMode,
        source_image_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            prompt,
            mode,
            source_image_url,
            status: JobStatus::Pending,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
