use std::time::Duration;

use aws_config::Region;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::BehaviorVersion;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info};

use crate::config::StorageConfig;

use super::StorageError;

/// How long returned object URLs stay fetchable
const PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

/// Uploads local images to the S3-compatible object store so the video
/// endpoint can fetch them by URL
#[derive(Debug)]
pub struct TosUploader {
    client: S3Client,
    bucket: String,
}

impl TosUploader {
    pub fn new(cfg: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &cfg.access_key,
            &cfg.secret_key,
            None,
            None,
            "modelhub-tos",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(&cfg.endpoint)
            .credentials_provider(credentials)
            .build();
        Self {
            client: S3Client::from_conf(config),
            bucket: cfg.bucket.clone(),
        }
    }

    /// Build an uploader, failing when storage was never configured
    pub fn from_config(cfg: Option<&StorageConfig>) -> Result<Self, StorageError> {
        cfg.map(Self::new).ok_or(StorageError::Unavailable)
    }

    /// Upload a blob and return a presigned URL for it
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let key = object_key(file_name);
        debug!(bucket = %self.bucket, key = %key, size = bytes.len(), "uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let presigning = PresigningConfig::expires_in(PRESIGN_EXPIRY)
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let url = request.uri().to_string();
        info!(bucket = %self.bucket, key = %key, "object uploaded");
        Ok(url)
    }
}

/// Collision-resistant object key: upload time plus a random suffix,
/// keeping the original filename for operator recognition
fn object_key(file_name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("uploads/{}_{}_{}", Utc::now().timestamp(), suffix, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_keep_the_filename_under_the_uploads_prefix() {
        let key = object_key("cat.png");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("_cat.png"));
    }

    #[test]
    fn object_keys_differ_between_calls() {
        assert_ne!(object_key("cat.png"), object_key("cat.png"));
    }

    #[test]
    fn missing_config_means_storage_unavailable() {
        let err = TosUploader::from_config(None).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable));
    }
}
