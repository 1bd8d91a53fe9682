//! TOML configuration file loading
//!
//! Supports `~/.config/narrator/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct NarratorConfigFile {
    /// Vision model configuration
    #[serde(default)]
    pub vision: VisionFileConfig,

    /// Voice/TTS configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Camera configuration
    #[serde(default)]
    pub camera: CameraFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Path to a system message file
    pub system_message_file: Option<PathBuf>,

    /// Thread narrations into the next request
    pub keep_context: Option<bool>,
}

/// Vision completion configuration
#[derive(Debug, Default, Deserialize)]
pub struct VisionFileConfig {
    /// Model identifier (e.g. "gpt-4o")
    pub model: Option<String>,

    /// Completion token limit
    pub max_tokens: Option<u32>,
}

/// Voice output configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Voice identifier
    pub voice_id: Option<String>,

    /// TTS provider ("elevenlabs" or "openai")
    pub provider: Option<String>,

    /// TTS model
    pub model: Option<String>,
}

/// Camera configuration
#[derive(Debug, Default, Deserialize)]
pub struct CameraFileConfig {
    /// Device index
    pub index: Option<u32>,

    /// Directory snapshots are written to
    pub frames_dir: Option<PathBuf>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Default config file location
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("narrator").join("config.toml"))
}

/// Load the config file from its default location
///
/// A missing or unparsable file yields the empty overlay.
#[must_use]
pub fn load_config_file() -> NarratorConfigFile {
    let Some(path) = config_file_path() else {
        return NarratorConfigFile::default();
    };

    if !path.exists() {
        return NarratorConfigFile::default();
    }

    match parse_config_file(&path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
            NarratorConfigFile::default()
        }
    }
}

/// Parse a config file at `path`
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn parse_config_file(path: &Path) -> Result<NarratorConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
