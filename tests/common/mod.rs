//! Shared test utilities

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use narrator::capture::CaptureState;
use narrator::vision::{CompletionClient, ConversationTurn};
use narrator::voice::Speaker;
use narrator::{Error, NarrationSettings, Narrator, Result};

/// Ordered record of collaborator calls
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Completion client returning a fixed reply
pub struct MockCompletion {
    pub reply: String,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<Vec<ConversationTurn>>>,
    pub gate: Option<Arc<Notify>>,
    pub log: EventLog,
}

impl MockCompletion {
    pub fn new(reply: &str, log: EventLog) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            gate: None,
            log,
        }
    }

    /// Hold every request until the gate is notified
    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, messages: &[ConversationTurn], _max_tokens: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());
        self.log.push("complete");

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.fail {
            return Err(Error::Vision("mock failure".to_string()));
        }
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Speaker that records what it was asked to say
pub struct MockSpeaker {
    pub spoken: Mutex<Vec<(String, String)>>,
    pub busy_when_speaking: Mutex<Vec<bool>>,
    pub state: Option<Arc<CaptureState>>,
    pub gate: Option<Arc<Notify>>,
    pub fail: bool,
    pub log: EventLog,
}

impl MockSpeaker {
    pub fn new(log: EventLog) -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            busy_when_speaking: Mutex::new(Vec::new()),
            state: None,
            gate: None,
            fail: false,
            log,
        }
    }

    /// Hold every playback until the gate is notified
    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Record the capture state's busy flag at each speak call
    #[must_use]
    pub fn observing(mut self, state: Arc<CaptureState>) -> Self {
        self.state = Some(state);
        self
    }
}

#[async_trait]
impl Speaker for MockSpeaker {
    async fn speak(&self, text: &str, voice: &str) -> Result<()> {
        self.log.push("speak");
        if let Some(state) = &self.state {
            self.busy_when_speaking.lock().unwrap().push(state.is_busy());
        }
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.fail {
            return Err(Error::Tts("mock playback failure".to_string()));
        }
        Ok(())
    }
}

/// Settings writing snapshots under `dir`
pub fn settings(dir: &Path) -> NarrationSettings {
    NarrationSettings {
        voice: "test-voice".to_string(),
        system_message: "You are a nature documentary narrator.".to_string(),
        max_tokens: 500,
        snapshot_path: dir.join("frame.jpg"),
    }
}

/// Narrator over the given mocks
pub fn narrator(
    completion: &Arc<MockCompletion>,
    speaker: &Arc<MockSpeaker>,
    dir: &Path,
) -> Arc<Narrator> {
    Arc::new(Narrator::new(
        Arc::clone(completion) as Arc<dyn CompletionClient>,
        Arc::clone(speaker) as Arc<dyn Speaker>,
        settings(dir),
    ))
}
