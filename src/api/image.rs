use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::client::ArkClient;
use super::error::ApiError;

const IMAGE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Serialize)]
struct ImageRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageItem>,
}

#[derive(Deserialize)]
struct ImageItem {
    b64_json: Option<String>,
    url: Option<String>,
}

/// One generated image, delivered inline or by reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedImage {
    Base64(String),
    Url(String),
}

impl ArkClient {
    /// Generate `n` images for a prompt
    ///
    /// Response items carrying neither a base64 payload nor a URL are
    /// dropped with a warning.
    pub async fn generate_images(
        &self,
        model: &str,
        prompt: &str,
        size: &str,
        n: u8,
    ) -> Result<Vec<GeneratedImage>, ApiError> {
        let body = ImageRequestBody {
            model,
            prompt,
            n,
            size,
        };
        let response: ImageResponse = self
            .post_json("/images/generations", &body, IMAGE_TIMEOUT)
            .await?;

        let mut images = Vec::with_capacity(response.data.len());
        for item in response.data {
            match (item.b64_json, item.url) {
                (Some(b64), _) => images.push(GeneratedImage::Base64(b64)),
                (None, Some(url)) => images.push(GeneratedImage::Url(url)),
                (None, None) => warn!("image item carried neither b64_json nor url"),
            }
        }
        Ok(images)
    }
}
