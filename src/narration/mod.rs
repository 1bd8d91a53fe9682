//! Describe-and-speak worker
//!
//! One run: encode the snapshot, ask the vision model for a narration,
//! release the capture state, then speak the narration. Steps are strictly
//! sequential; the completion signal fires before speech starts so the next
//! capture is not gated on audio playback.

mod encode;
mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::camera::Frame;
use crate::vision::{CompletionClient, ConversationTurn};
use crate::voice::Speaker;
use crate::{Error, Result};

pub use encode::{TARGET_WIDTH, encode_frame, is_permission_denied, resize_to_width, scaled_height};
pub use script::Script;

/// Prompt sent alongside every snapshot
pub const DESCRIBE_PROMPT: &str = "Describe this image";

/// Default completion token limit
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Per-process narration parameters
#[derive(Debug, Clone)]
pub struct NarrationSettings {
    /// TTS voice identifier
    pub voice: String,
    /// Persona/instruction prepended to every request
    pub system_message: String,
    /// Completion token limit
    pub max_tokens: u32,
    /// Where the most recent resized snapshot is written
    pub snapshot_path: PathBuf,
}

/// Resizes and saves a snapshot, returning it as base64 JPEG
///
/// `Ok(None)` means the snapshot was skipped and no request should be made.
pub type FrameEncoder = fn(&Frame, &Path) -> Result<Option<String>>;

/// Runs describe-and-speak requests against the configured collaborators
pub struct Narrator {
    completion: Arc<dyn CompletionClient>,
    speaker: Arc<dyn Speaker>,
    settings: NarrationSettings,
    encoder: FrameEncoder,
}

impl Narrator {
    /// Create a narrator encoding snapshots with [`encode_frame`]
    #[must_use]
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        speaker: Arc<dyn Speaker>,
        settings: NarrationSettings,
    ) -> Self {
        Self {
            completion,
            speaker,
            settings,
            encoder: encode_frame,
        }
    }

    /// Replace the snapshot encoder
    #[must_use]
    pub const fn with_encoder(mut self, encoder: FrameEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Per-process settings
    #[must_use]
    pub const fn settings(&self) -> &NarrationSettings {
        &self.settings
    }

    /// Describe `frame` and speak the result
    ///
    /// `on_done` is invoked with the extended script once the description
    /// has arrived, before speech. When the snapshot was skipped it gets the
    /// unchanged script. If the completion call fails it is never invoked.
    ///
    /// Returns `script` extended with the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns error if encoding (other than a permission failure), the
    /// completion call, or speech fails
    pub async fn run<F>(&self, frame: Frame, script: Script, on_done: F) -> Result<Script>
    where
        F: FnOnce(&Script) + Send,
    {
        let snapshot_path = self.settings.snapshot_path.clone();
        let encode = self.encoder;
        let encoded = tokio::task::spawn_blocking(move || encode(&frame, &snapshot_path))
            .await
            .map_err(|e| Error::Encode(format!("encode task failed: {e}")))??;

        let Some(jpeg_base64) = encoded else {
            on_done(&script);
            return Ok(script);
        };

        let messages = script.request_messages(
            &self.settings.system_message,
            ConversationTurn::user_with_jpeg(DESCRIBE_PROMPT, &jpeg_base64),
        );

        tracing::debug!(
            provider = self.completion.name(),
            turns = messages.len(),
            max_tokens = self.settings.max_tokens,
            "requesting narration"
        );

        let reply = self
            .completion
            .complete(&messages, self.settings.max_tokens)
            .await?;

        let script = script.with_reply(reply.clone());
        on_done(&script);

        println!("{reply}");
        tracing::info!(chars = reply.len(), "narration received");

        self.speaker.speak(&reply, &self.settings.voice).await?;

        Ok(script)
    }
}
