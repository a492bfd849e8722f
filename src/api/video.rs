use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::client::ArkClient;
use super::error::ApiError;

const CREATE_TIMEOUT: Duration = Duration::from_secs(120);
const GET_TIMEOUT: Duration = Duration::from_secs(60);

/// One part of a video generation request body
///
/// Text-to-video tasks carry a single `Text` part; image-to-video tasks
/// append an `ImageUrl` part referencing the source frame.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageRef {
    pub url: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageRef { url: url.into() },
        }
    }
}

#[derive(Serialize)]
struct CreateTaskBody<'a> {
    model: &'a str,
    content: &'a [ContentPart],
}

/// Remote operations needed by the video task tracker
///
/// The tracker only ever creates tasks and fetches their state; putting
/// those two calls behind a trait lets its state machine be exercised
/// against a stub.
#[async_trait]
pub trait VideoTaskApi {
    /// Create a generation task; returns the raw provider response
    async fn create_video_task(
        &self,
        model: &str,
        content: &[ContentPart],
    ) -> Result<Value, ApiError>;

    /// Fetch the current state of a task; the response shape beyond the
    /// `status` field is provider-defined
    async fn get_video_task(&self, task_id: &str) -> Result<Value, ApiError>;
}

#[async_trait]
impl VideoTaskApi for ArkClient {
    async fn create_video_task(
        &self,
        model: &str,
        content: &[ContentPart],
    ) -> Result<Value, ApiError> {
        let body = CreateTaskBody { model, content };
        self.post_json("/contents/generations/tasks", &body, CREATE_TIMEOUT)
            .await
    }

    async fn get_video_task(&self, task_id: &str) -> Result<Value, ApiError> {
        self.get_json(
            &format!("/contents/generations/tasks/{task_id}"),
            GET_TIMEOUT,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn content_parts_serialize_to_provider_shape() {
        let parts = vec![
            ContentPart::text("a cat --resolution 720p --duration 5"),
            ContentPart::image_url("https://cdn.example/cat.png"),
        ];
        assert_eq!(
            serde_json::to_value(&parts).unwrap(),
            json!([
                {"type": "text", "text": "a cat --resolution 720p --duration 5"},
                {"type": "image_url", "image_url": {"url": "https://cdn.example/cat.png"}},
            ])
        );
    }

    #[tokio::test]
    async fn create_and_get_hit_the_task_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contents/generations/tasks"))
            .and(body_json(json!({
                "model": "video-model",
                "content": [{"type": "text", "text": "a cat"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "task-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contents/generations/tasks/task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
            .mount(&server)
            .await;

        let client = ArkClient::new(server.uri(), "test-key");
        let created = client
            .create_video_task("video-model", &[ContentPart::text("a cat")])
            .await
            .unwrap();
        assert_eq!(created["id"], "task-1");

        let state = client.get_video_task("task-1").await.unwrap();
        assert_eq!(state["status"], "running");
    }
}
