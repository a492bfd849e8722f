pub mod chat;
pub mod client;
pub mod error;
pub mod image;
pub mod video;

// Re-export commonly used types
pub use client::ArkClient;
pub use error::ApiError;
pub use video::{ContentPart, VideoTaskApi};
