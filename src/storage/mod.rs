pub mod uploader;

use thiserror::Error;

pub use uploader::TosUploader;

/// Failures raised by the object storage uploader
#[derive(Debug, Error)]
pub enum StorageError {
    /// No storage credentials were configured at process start
    #[error("object storage is not configured; set TOS_AK and TOS_SK")]
    Unavailable,

    /// The store rejected or failed the upload
    #[error("upload failed: {0}")]
    Upload(String),
}
