//! Configuration management for the narrator
//!
//! Values are resolved as CLI > environment > config file > default. The
//! environment includes anything loaded from a `.env` file at startup.

pub mod file;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::narration::DEFAULT_MAX_TOKENS;
use crate::vision::DEFAULT_MODEL;
use crate::voice::{DEFAULT_ELEVENLABS_MODEL, DEFAULT_OPENAI_MODEL, TtsProvider};
use crate::{Error, Result};

use file::NarratorConfigFile;

/// Narration persona used when no system message file is given
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are Sir David Attenborough. Narrate the picture as if it is a nature documentary. Make it snarky and funny. Don't repeat yourself. Make it short. If I do anything remotely interesting, make a big deal about it!";

/// Directory (under the working directory) snapshots are written to
pub const FRAMES_DIR: &str = "frames";

/// Snapshot file name inside the frames directory
pub const SNAPSHOT_FILE: &str = "frame.jpg";

/// OpenAI voice used when none is configured
const DEFAULT_OPENAI_VOICE: &str = "alloy";

/// Narrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// TTS voice identifier
    pub voice_id: String,

    /// System message prepended to every request
    pub system_message: String,

    /// Directory snapshots are written to
    pub frames_dir: PathBuf,

    /// Camera device index
    pub camera_index: u32,

    /// Use the synthetic test pattern instead of a camera
    pub test_pattern: bool,

    /// Thread each narration into the next request
    pub keep_context: bool,

    /// Vision completion configuration
    pub vision: VisionConfig,

    /// Voice output configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Vision completion configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Model identifier
    pub model: String,

    /// Completion token limit
    pub max_tokens: u32,
}

/// Voice output configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// TTS backend
    pub provider: TtsProvider,

    /// TTS model identifier
    pub model: String,
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (vision, optional TTS)
    pub openai: Option<String>,

    /// `ElevenLabs` API key (TTS)
    pub elevenlabs: Option<String>,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("ApiKeys")
            .field("openai", &redact(&self.openai))
            .field("elevenlabs", &redact(&self.elevenlabs))
            .finish()
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Voice identifier (`-voice_id`)
    pub voice_id: Option<String>,

    /// System message file (`-txt_file`)
    pub txt_file: Option<PathBuf>,

    /// Camera device index
    pub camera: Option<u32>,

    /// Use the synthetic test pattern
    pub test_pattern: bool,

    /// Thread narrations between requests
    pub keep_context: bool,
}

impl Config {
    /// Load configuration from the process environment and config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is invalid or a required voice is missing
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let fc = file::load_config_file();
        let cwd = std::env::current_dir()?;
        Self::from_sources(overrides, fc, &cwd, |name| std::env::var(name).ok())
    }

    /// Resolve configuration from explicit sources
    ///
    /// # Errors
    ///
    /// Returns error if a value is invalid or a required voice is missing
    pub fn from_sources<E>(
        overrides: &ConfigOverrides,
        fc: NarratorConfigFile,
        working_dir: &Path,
        env: E,
    ) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            elevenlabs: env("ELEVEN_API_KEY")
                .or_else(|| env("ELEVENLABS_API_KEY"))
                .or(fc.api_keys.elevenlabs),
        };

        let provider = match env("NARRATOR_TTS_PROVIDER").or(fc.voice.provider) {
            Some(name) => name.parse()?,
            None => TtsProvider::ElevenLabs,
        };

        let default_tts_model = match provider {
            TtsProvider::ElevenLabs => DEFAULT_ELEVENLABS_MODEL,
            TtsProvider::OpenAI => DEFAULT_OPENAI_MODEL,
        };
        let voice = VoiceConfig {
            provider,
            model: env("NARRATOR_TTS_MODEL")
                .or(fc.voice.model)
                .unwrap_or_else(|| default_tts_model.to_string()),
        };

        let voice_id = overrides
            .voice_id
            .clone()
            .or_else(|| env("VOICE_ID"))
            .or(fc.voice.voice_id)
            .filter(|v| !v.trim().is_empty());
        let voice_id = match (voice_id, provider) {
            (Some(id), _) => id,
            (None, TtsProvider::OpenAI) => DEFAULT_OPENAI_VOICE.to_string(),
            (None, TtsProvider::ElevenLabs) => {
                return Err(Error::Config(
                    "voice id required: pass -voice_id or set VOICE_ID".to_string(),
                ));
            }
        };

        let max_tokens = match env("NARRATOR_MAX_TOKENS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid NARRATOR_MAX_TOKENS: {raw}")))?,
            None => fc.vision.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };
        let vision = VisionConfig {
            model: env("NARRATOR_MODEL")
                .or(fc.vision.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
        };

        let frames_dir = env("NARRATOR_FRAMES_DIR")
            .map(PathBuf::from)
            .or(fc.camera.frames_dir)
            .unwrap_or_else(|| working_dir.join(FRAMES_DIR));

        let txt_file = overrides.txt_file.clone().or(fc.system_message_file);
        let system_message = load_system_message(txt_file.as_deref());

        Ok(Self {
            voice_id,
            system_message,
            frames_dir,
            camera_index: overrides.camera.or(fc.camera.index).unwrap_or(0),
            test_pattern: overrides.test_pattern,
            keep_context: overrides.keep_context || fc.keep_context.unwrap_or(false),
            vision,
            voice,
            api_keys,
        })
    }

    /// Path of the most recent snapshot
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.frames_dir.join(SNAPSHOT_FILE)
    }

    /// Create the frames directory if it does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn ensure_frames_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.frames_dir)?;
        Ok(())
    }
}

/// Read the system message from `path`, falling back to the default
///
/// The file content is trimmed. A missing path or file yields
/// [`DEFAULT_SYSTEM_MESSAGE`]; a read failure is logged and also falls back.
#[must_use]
pub fn load_system_message(path: Option<&Path>) -> String {
    let Some(path) = path.filter(|p| p.exists()) else {
        return DEFAULT_SYSTEM_MESSAGE.to_string();
    };

    match std::fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), "loaded system message");
            content.trim().to_string()
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "error reading system message file");
            DEFAULT_SYSTEM_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn load(overrides: &ConfigOverrides, env: &[(&str, &str)]) -> Result<Config> {
        Config::from_sources(
            overrides,
            NarratorConfigFile::default(),
            Path::new("/work"),
            env_from(env),
        )
    }

    #[test]
    fn test_system_message_from_file_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.txt");
        std::fs::write(&path, "\n  Narrate like a sports commentator.  \n").unwrap();

        assert_eq!(
            load_system_message(Some(&path)),
            "Narrate like a sports commentator."
        );
    }

    #[test]
    fn test_system_message_missing_file_uses_default() {
        let path = Path::new("/definitely/not/here.txt");
        assert_eq!(load_system_message(Some(path)), DEFAULT_SYSTEM_MESSAGE);
        assert_eq!(load_system_message(None), DEFAULT_SYSTEM_MESSAGE);
    }

    #[test]
    fn test_system_message_unreadable_uses_default() {
        // A directory exists but cannot be read as text
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_system_message(Some(dir.path())), DEFAULT_SYSTEM_MESSAGE);
    }

    #[test]
    fn test_cli_voice_beats_env() {
        let overrides = ConfigOverrides {
            voice_id: Some("from-cli".to_string()),
            ..ConfigOverrides::default()
        };
        let config = load(&overrides, &[("VOICE_ID", "from-env")]).unwrap();
        assert_eq!(config.voice_id, "from-cli");
    }

    #[test]
    fn test_voice_from_env() {
        let config = load(&ConfigOverrides::default(), &[("VOICE_ID", "from-env")]).unwrap();
        assert_eq!(config.voice_id, "from-env");
        assert_eq!(config.voice.provider, TtsProvider::ElevenLabs);
    }

    #[test]
    fn test_elevenlabs_requires_voice() {
        let result = load(&ConfigOverrides::default(), &[]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_openai_tts_has_default_voice() {
        let config = load(&ConfigOverrides::default(), &[("NARRATOR_TTS_PROVIDER", "openai")]).unwrap();
        assert_eq!(config.voice_id, "alloy");
        assert_eq!(config.voice.model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_defaults() {
        let config = load(&ConfigOverrides::default(), &[("VOICE_ID", "v")]).unwrap();
        assert_eq!(config.vision.model, "gpt-4o");
        assert_eq!(config.vision.max_tokens, 500);
        assert_eq!(config.frames_dir, PathBuf::from("/work/frames"));
        assert_eq!(config.snapshot_path(), PathBuf::from("/work/frames/frame.jpg"));
        assert_eq!(config.camera_index, 0);
        assert!(!config.keep_context);
        assert_eq!(config.system_message, DEFAULT_SYSTEM_MESSAGE);
    }

    #[test]
    fn test_eleven_key_aliases() {
        let config = load(
            &ConfigOverrides::default(),
            &[("VOICE_ID", "v"), ("ELEVENLABS_API_KEY", "alias")],
        )
        .unwrap();
        assert_eq!(config.api_keys.elevenlabs.as_deref(), Some("alias"));

        let config = load(
            &ConfigOverrides::default(),
            &[
                ("VOICE_ID", "v"),
                ("ELEVEN_API_KEY", "primary"),
                ("ELEVENLABS_API_KEY", "alias"),
            ],
        )
        .unwrap();
        assert_eq!(config.api_keys.elevenlabs.as_deref(), Some("primary"));
    }

    #[test]
    fn test_invalid_max_tokens() {
        let result = load(
            &ConfigOverrides::default(),
            &[("VOICE_ID", "v"), ("NARRATOR_MAX_TOKENS", "lots")],
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_file_overlay_applies_below_env() {
        let fc: NarratorConfigFile = toml::from_str(
            r#"
            keep_context = true
            [voice]
            voice_id = "file-voice"
            [vision]
            model = "file-model"
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            &ConfigOverrides::default(),
            fc,
            Path::new("/work"),
            env_from(&[("NARRATOR_MODEL", "env-model")]),
        )
        .unwrap();

        assert_eq!(config.voice_id, "file-voice");
        assert_eq!(config.vision.model, "env-model");
        assert!(config.keep_context);
    }

    #[test]
    fn test_api_keys_redacted_in_debug() {
        let keys = ApiKeys {
            openai: Some("sk-secret".to_string()),
            elevenlabs: None,
        };
        let printed = format!("{keys:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("redacted"));
    }
}
