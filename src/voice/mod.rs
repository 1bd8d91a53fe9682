//! Voice output
//!
//! Narration text is synthesized by a TTS provider and played on the
//! default output device.

mod playback;
mod tts;

use async_trait::async_trait;

use crate::{Error, Result};

pub use playback::{AudioPlayback, DecodedAudio, decode_mp3};
pub use tts::{DEFAULT_ELEVENLABS_MODEL, DEFAULT_OPENAI_MODEL, TextToSpeech, TtsProvider};

/// Something that can say a line of text out loud
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak `text` with `voice`, returning once playback has finished
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn speak(&self, text: &str, voice: &str) -> Result<()>;
}

/// TTS synthesis followed by local playback
pub struct VoiceOutput {
    tts: TextToSpeech,
}

impl VoiceOutput {
    /// Speak through `tts` on the default output device
    #[must_use]
    pub const fn new(tts: TextToSpeech) -> Self {
        Self { tts }
    }
}

#[async_trait]
impl Speaker for VoiceOutput {
    async fn speak(&self, text: &str, voice: &str) -> Result<()> {
        let mp3 = self.tts.synthesize(text, voice).await?;

        tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_mp3(&mp3))
            .await
            .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
    }
}
