use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;

/// HTTP adapter for the hosted model API
///
/// Owns a connection-pooled `reqwest::Client` and attaches the bearer
/// token to every request. Endpoint-specific calls live in the sibling
/// modules (`chat`, `image`, `video`); this type only knows how to issue
/// requests and normalize failures.
pub struct ArkClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ArkClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// POST a JSON body and return the decoded JSON response
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// GET and return the decoded JSON response
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-2xx response into `ApiError::RemoteApi`
///
/// The error body is kept as parsed JSON re-rendered to a compact string
/// when it is valid JSON, and as raw text otherwise.
pub(crate) async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.as_u16() < 400 {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body = match serde_json::from_str::<Value>(&text) {
        Ok(value) => value.to_string(),
        Err(_) => text,
    };
    Err(ApiError::RemoteApi {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn attaches_bearer_token_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = ArkClient::new(server.uri(), "test-key");
        let value: Value = client
            .post_json("/images/generations", &json!({}), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(value, json!({"data": []}));
    }

    #[tokio::test]
    async fn non_2xx_yields_remote_api_error_with_parsed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "bad size"}})),
            )
            .mount(&server)
            .await;

        let client = ArkClient::new(server.uri(), "test-key");
        let result: Result<Value, ApiError> = client
            .post_json("/images/generations", &json!({}), Duration::from_secs(5))
            .await;
        match result.unwrap_err() {
            ApiError::RemoteApi { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("bad size"));
            }
            other => panic!("expected RemoteApi, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contents/generations/tasks/t1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = ArkClient::new(server.uri(), "test-key");
        let result: Result<Value, ApiError> = client
            .get_json("/contents/generations/tasks/t1", Duration::from_secs(5))
            .await;
        match result.unwrap_err() {
            ApiError::RemoteApi { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("expected RemoteApi, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_yields_network_error() {
        // Port 1 is never listening
        let client = ArkClient::new("http://127.0.0.1:1", "test-key");
        let result: Result<Value, ApiError> = client
            .get_json("/contents/generations/tasks/t1", Duration::from_secs(5))
            .await;
        assert!(matches!(result.unwrap_err(), ApiError::Network(_)));
    }
}
