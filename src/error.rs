//! Error types for the narrator

use thiserror::Error;

/// Result type alias for narrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while narrating
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Camera open or read error
    #[error("camera error: {0}")]
    Camera(String),

    /// Display window error
    #[error("display error: {0}")]
    Display(String),

    /// Frame resize/encode error
    #[error("encode error: {0}")]
    Encode(String),

    /// Vision completion API error
    #[error("vision error: {0}")]
    Vision(String),

    /// Narration worker error
    #[error("narration error: {0}")]
    Narration(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Audio error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Image codec error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
