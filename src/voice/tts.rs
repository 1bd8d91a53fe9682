//! Text-to-speech (TTS) synthesis

use futures::StreamExt;

use crate::{Error, Result};

/// Default ElevenLabs model
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

/// Default OpenAI speech model
pub const DEFAULT_OPENAI_MODEL: &str = "tts-1";

/// TTS provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtsProvider {
    OpenAI,
    ElevenLabs,
}

impl std::str::FromStr for TtsProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "elevenlabs" | "eleven" => Ok(Self::ElevenLabs),
            "openai" => Ok(Self::OpenAI),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: String,
    model: String,
    speed: f32,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a new TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_openai(api_key: String, model: String, speed: f32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            speed,
            provider: TtsProvider::OpenAI,
        })
    }

    /// Create a new TTS instance using ElevenLabs
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new_elevenlabs(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            speed: 1.0, // ElevenLabs doesn't use speed in the same way
            provider: TtsProvider::ElevenLabs,
        })
    }

    /// Backend in use
    #[must_use]
    pub const fn provider(&self) -> TtsProvider {
        self.provider
    }

    /// Synthesize text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `voice` - Provider voice identifier
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format). The whole clip is downloaded before this
    /// returns; playback starts afterwards.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let response = match self.provider {
            TtsProvider::OpenAI => self.request_openai(text, voice).await?,
            TtsProvider::ElevenLabs => self.request_elevenlabs(text, voice).await?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("{:?} TTS error {status}: {body}", self.provider)));
        }

        let started = std::time::Instant::now();
        let mut stream = response.bytes_stream();
        let mut audio = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if audio.is_empty() {
                tracing::trace!(
                    latency_ms = started.elapsed().as_millis(),
                    "first audio chunk received"
                );
            }
            audio.extend_from_slice(&chunk);
        }

        tracing::debug!(bytes = audio.len(), provider = ?self.provider, "speech synthesized");
        Ok(audio)
    }

    /// Start an OpenAI TTS request
    async fn request_openai(&self, text: &str, voice: &str) -> Result<reqwest::Response> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice,
            speed: self.speed,
        };

        Ok(self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?)
    }

    /// Start an ElevenLabs TTS request on the low-latency `/stream` endpoint
    async fn request_elevenlabs(&self, text: &str, voice: &str) -> Result<reqwest::Response> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = elevenlabs_stream_url(voice);

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        Ok(self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "audio/mpeg")
            .json(&request)
            .send()
            .await?)
    }
}

fn elevenlabs_stream_url(voice: &str) -> String {
    format!("https://api.elevenlabs.io/v1/text-to-speech/{voice}/stream")
}
