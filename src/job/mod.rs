pub mod models;
pub mod tracker;

// Re-export commonly used types
pub use models::{GenerationMode, JobStatus, Resolution, SubmitParams, VideoJob};
pub use tracker::{SubmitError, VideoTaskTracker};
