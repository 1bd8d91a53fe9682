//! Vision completion API
//!
//! The narrator only needs "messages in, text out"; providers implement
//! [`CompletionClient`].

mod openai;
mod types;

use async_trait::async_trait;

use crate::Result;

pub use openai::{DEFAULT_MODEL, OpenAiVision};
pub use types::{ContentPart, ConversationTurn, ImageUrl, Role, TurnContent};

/// A chat completion backend that accepts image input
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit the conversation and return the generated reply text
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply is empty
    async fn complete(&self, messages: &[ConversationTurn], max_tokens: u32) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
