//! Text-to-image generation for the picture frame.
//!
//! Turns a prompt into a handful of image files on disk, either through an
//! OpenAI-compatible images endpoint or, in demo mode, by reusing images
//! already present in the image directory.

pub mod client;
pub mod demo;
pub mod prompt;

pub use client::GenerationClient;
pub use demo::demo_images;
pub use prompt::enrich_prompt;

/// Images requested per prompt, one per chooser button.
pub const IMAGES_PER_PROMPT: usize = 4;

/// Default provider endpoint.
pub const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

/// Unified error type for the generation-client crate.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("No API key configured for the generation provider")]
    MissingApiKey,
}
