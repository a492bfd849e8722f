use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::{check_status, ArkClient};
use super::error::ApiError;

const CHAT_TIMEOUT: Duration = Duration::from_secs(600);
const DONE_SENTINEL: &str = "[DONE]";

/// One entry of a chat conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

/// One decoded SSE frame of a streaming completion
#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: Option<ChunkDelta>,
    message: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

impl ChatChunk {
    /// Incremental text of the first choice, if the frame carries any
    fn into_content(self) -> Option<String> {
        let choice = self.choices.into_iter().next()?;
        choice.delta.or(choice.message)?.content
    }
}

impl ArkClient {
    /// Start a streaming chat completion
    ///
    /// Returns a stream of incremental content strings decoded from SSE
    /// `data:` frames. Empty frames are skipped, a literal `[DONE]` frame
    /// ends the stream, and malformed frames are dropped with a debug log
    /// so a transient bad chunk never aborts the whole completion. A
    /// non-2xx response or transport failure before streaming begins is
    /// returned from this call; a mid-stream failure surfaces as an
    /// `ApiError::Stream` item and terminates the stream.
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<impl Stream<Item = Result<String, ApiError>>, ApiError> {
        let body = ChatRequestBody {
            model,
            messages,
            temperature,
            stream: true,
        };
        let response = self
            .http()
            .post(self.url("/chat/completions"))
            .bearer_auth(self.api_key())
            .timeout(CHAT_TIMEOUT)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(async_stream::stream! {
            let mut events = response.bytes_stream().eventsource();
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(ApiError::Stream(e.to_string()));
                        return;
                    }
                };
                let data = event.data.trim();
                if data.is_empty() {
                    continue;
                }
                if data == DONE_SENTINEL {
                    break;
                }
                match serde_json::from_str::<ChatChunk>(data) {
                    Ok(chunk) => {
                        if let Some(content) = chunk.into_content() {
                            yield Ok(content);
                        }
                    }
                    Err(e) => debug!(error = %e, "skipping malformed stream frame"),
                }
            }
        })
    }
}
