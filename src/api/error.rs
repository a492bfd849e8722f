use thiserror::Error;

/// Failures raised by the remote API adapter
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, refused connection, timeout.
    /// No response was received from the service.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-2xx status. `body` is the error
    /// body parsed as JSON when possible, raw text otherwise.
    #[error("api returned {status}: {body}")]
    RemoteApi { status: u16, body: String },

    /// The connection dropped or decoding broke after a streaming
    /// response had already begun
    #[error("stream error: {0}")]
    Stream(String),

    /// Task creation answered 2xx but carried no task identifier
    #[error("submission failed: {0}")]
    Submission(String),
}
