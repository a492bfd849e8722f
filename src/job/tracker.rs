use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::api::{ApiError, ContentPart, VideoTaskApi};

use super::models::{GenerationMode, JobStatus, SubmitParams, VideoJob};

/// Why a submission produced no job
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid submission: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Session-scoped collection of video generation jobs
///
/// Jobs are appended on submission and never removed; polling visits them
/// in insertion order, display reads them newest first. The tracker is
/// only ever touched from the submit/poll flow of one task, so it carries
/// no synchronization.
#[derive(Default)]
pub struct VideoTaskTracker {
    jobs: Vec<VideoJob>,
}

impl VideoTaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs in insertion order
    pub fn jobs(&self) -> &[VideoJob] {
        &self.jobs
    }

    /// Jobs in display order, most recent submission first
    pub fn jobs_newest_first(&self) -> impl Iterator<Item = &VideoJob> {
        self.jobs.iter().rev()
    }

    /// True while at least one job still needs polling
    ///
    /// Governs whether the caller keeps scheduling poll ticks; an empty
    /// collection has no pending work.
    pub fn has_pending_work(&self) -> bool {
        self.jobs.iter().any(|job| !job.status.is_terminal())
    }

    /// Submit a new generation task and record it as a pending job
    ///
    /// Rendering parameters are appended to the prompt text the way the
    /// provider expects (`--resolution <r> --duration <d>`). A response
    /// without an `id` or `task_id` field is a malformed submission: it
    /// fails and no job is recorded.
    pub async fn submit<A: VideoTaskApi + Sync>(
        &mut self,
        api: &A,
        model: &str,
        params: SubmitParams,
    ) -> Result<&VideoJob, SubmitError> {
        params.validate()?;

        let prompt = params.prompt.trim().to_string();
        let prompt_with_params = format!(
            "{} --resolution {} --duration {}",
            prompt, params.resolution, params.duration
        );

        let mut content = vec![ContentPart::text(prompt_with_params)];
        if let (GenerationMode::ImageToVideo, Some(url)) =
            (params.mode, &params.source_image_url)
        {
            content.push(ContentPart::image_url(url.clone()));
        }

        let response = api.create_video_task(model, &content).await?;
        let task_id = response
            .get("id")
            .or_else(|| response.get("task_id"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ApiError::Submission(format!("no task id in response: {response}"))
            })?
            .to_string();

        info!(task_id = %task_id, mode = %params.mode, "video task submitted");
        self.jobs.push(VideoJob::pending(
            task_id,
            prompt,
            params.mode,
            params.source_image_url,
        ));
        Ok(self.jobs.last().expect("job was just pushed"))
    }

    /// Poll every non-terminal job once, in insertion order
    ///
    /// Status strings are matched case-insensitively against the known
    /// terminal vocabulary; anything unrecognized leaves the job pending
    /// for the next tick. A failed poll call marks that job `Error` and
    /// moves on, so one broken task never blocks the rest.
    pub async fn poll_all<A: VideoTaskApi + Sync>(&mut self, api: &A) {
        for job in self.jobs.iter_mut().filter(|j| !j.status.is_terminal()) {
            match api.get_video_task(&job.task_id).await {
                Ok(response) => {
                    let status = response
                        .get("status")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_lowercase();
                    match status.as_str() {
                        "succeeded" | "completed" | "success" => {
                            job.video_url = find_video_url(&response).map(str::to_owned);
                            job.status = JobStatus::Succeeded;
                            job.updated_at = Utc::now();
                            info!(
                                task_id = %job.task_id,
                                has_url = job.video_url.is_some(),
                                "video task succeeded"
                            );
                        }
                        "failed" | "error" => {
                            job.video_url = None;
                            job.status = JobStatus::Failed;
                            job.updated_at = Utc::now();
                            warn!(task_id = %job.task_id, "video task failed");
                        }
                        other => {
                            debug!(task_id = %job.task_id, status = other, "video task pending");
                        }
                    }
                }
                Err(e) => {
                    error!(task_id = %job.task_id, error = %e, "polling video task failed");
                    job.status = JobStatus::Error(e.to_string());
                    job.updated_at = Utc::now();
                }
            }
        }
    }
}

/// Depth-first search for a playable media URL in a provider response
///
/// Providers do not guarantee where the URL lives, so the whole response
/// is scanned: the first string that starts with an HTTP scheme and
/// contains `.mp4` or (case-insensitively) `video` wins. Map entries are
/// visited in `serde_json`'s key order, which keeps the result
/// deterministic.
pub fn find_video_url(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map.values().find_map(find_video_url),
        Value::Array(items) => items.iter().find_map(find_video_url),
        Value::String(s) if looks_like_video_url(s) => Some(s),
        _ => None,
    }
}

fn looks_like_video_url(s: &str) -> bool {
    s.starts_with("http") && (s.contains(".mp4") || s.to_lowercase().contains("video"))
}
