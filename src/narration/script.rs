//! Running conversation script

use crate::vision::ConversationTurn;

/// Ordered conversation turns sent ahead of each new request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    turns: Vec<ConversationTurn>,
}

impl Script {
    /// Empty script
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Turns in order
    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True before any reply has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Script extended with an assistant reply
    #[must_use]
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.turns.push(ConversationTurn::assistant(text));
        self
    }

    /// Full message list for a request: system, prior turns, then `next`
    #[must_use]
    pub fn request_messages(
        &self,
        system_message: &str,
        next: ConversationTurn,
    ) -> Vec<ConversationTurn> {
        let mut messages = Vec::with_capacity(self.turns.len() + 2);
        messages.push(ConversationTurn::system(system_message));
        messages.extend(self.turns.iter().cloned());
        messages.push(next);
        messages
    }
}

impl From<Vec<ConversationTurn>> for Script {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }
}
