use std::env;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Bearer token for the model API
    pub api_key: String,

    /// Base URL of the model API, without a trailing slash
    /// Format: https://HOST/api/v3
    pub base_url: String,

    /// Model identifier used by the `chat` command
    pub chat_model: String,

    /// Model identifier used by the `image` command
    pub image_model: String,

    /// Model identifier used by the `video` command
    pub video_model: String,

    /// Seconds between video task polls (clamped by the poll worker)
    pub poll_interval_secs: u64,

    /// Directory for rotated log files
    pub log_dir: String,

    /// Object storage credentials; `None` when TOS_AK/TOS_SK are not set,
    /// in which case local image upload is unavailable
    pub storage: Option<StorageConfig>,
}

/// Credentials and location of the S3-compatible object store
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - ARK_API_KEY: bearer token for the model API
    ///
    /// Optional environment variables:
    /// - ARK_BASE_URL, CHAT_MODEL, IMAGE_MODEL, VIDEO_MODEL
    /// - POLL_INTERVAL_SECS (default: 5)
    /// - LOG_DIR (default: logs)
    /// - TOS_AK, TOS_SK, TOS_ENDPOINT, TOS_REGION, TOS_BUCKET
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let api_key = env::var("ARK_API_KEY")
            .map_err(|_| "ARK_API_KEY must be set in .env file or environment".to_string())?;

        let base_url = env::var("ARK_BASE_URL")
            .unwrap_or_else(|_| "https://ark.ap-southeast.bytepluses.com/api/v3".to_string());

        let chat_model =
            env::var("CHAT_MODEL").unwrap_or_else(|_| "seed-1-6-250615".to_string());
        let image_model =
            env::var("IMAGE_MODEL").unwrap_or_else(|_| "seedream-3-0-t2i-250415".to_string());
        let video_model =
            env::var("VIDEO_MODEL").unwrap_or_else(|_| "seedance-1-0-pro-250528".to_string());

        let poll_interval_secs = env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        // Storage is optional: both keys must be present, everything else
        // falls back to the hosted store defaults
        let storage = match (env::var("TOS_AK"), env::var("TOS_SK")) {
            (Ok(access_key), Ok(secret_key)) => Some(StorageConfig {
                access_key,
                secret_key,
                endpoint: env::var("TOS_ENDPOINT").unwrap_or_else(|_| {
                    "https://tos-ap-southeast-1.bytepluses.com".to_string()
                }),
                region: env::var("TOS_REGION").unwrap_or_else(|_| "ap-southeast-1".to_string()),
                bucket: env::var("TOS_BUCKET").unwrap_or_else(|_| "modelarkbucket".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            api_key,
            base_url,
            chat_model,
            image_model,
            video_model,
            poll_interval_secs,
            log_dir,
            storage,
        })
    }
}
