//! Trigger handling
//!
//! Accepts a capture trigger only while idle and runs the describe-and-speak
//! worker on the tokio runtime, so the foreground loop never waits on the
//! network or on audio.
//!
//! The busy flag is released as soon as the description arrives, so a
//! worker that is still speaking may overlap with the next one describing.
//! Only one worker is ever between trigger and description. With context
//! kept, the extended script is published at that same point, before the
//! busy flag clears.

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};

use super::{ANALYZING_STATUS, CaptureState};
use crate::camera::Frame;
use crate::narration::{Narrator, Script};
use crate::{Error, Result};

type Worker = JoinHandle<Result<Script>>;

/// Starts at most one narration at a time
pub struct CaptureDispatcher {
    state: Arc<CaptureState>,
    narrator: Arc<Narrator>,
    runtime: Handle,
    keep_context: bool,
    script: Arc<Mutex<Script>>,
    workers: Vec<Worker>,
    scheduled: u64,
}

impl CaptureDispatcher {
    /// Create a dispatcher spawning workers on `runtime`
    #[must_use]
    pub fn new(state: Arc<CaptureState>, narrator: Arc<Narrator>, runtime: Handle) -> Self {
        Self {
            state,
            narrator,
            runtime,
            keep_context: false,
            script: Arc::new(Mutex::new(Script::new())),
            workers: Vec::new(),
            scheduled: 0,
        }
    }

    /// Feed each finished narration back into the next request
    #[must_use]
    pub const fn keep_context(mut self, keep: bool) -> Self {
        self.keep_context = keep;
        self
    }

    /// Shared capture state
    #[must_use]
    pub const fn state(&self) -> &Arc<CaptureState> {
        &self.state
    }

    /// Number of workers started so far
    #[must_use]
    pub const fn scheduled(&self) -> u64 {
        self.scheduled
    }

    /// Workers not yet collected (describing or still speaking)
    #[must_use]
    pub fn pending(&self) -> usize {
        self.workers.len()
    }

    /// Script the next request will be built on
    #[must_use]
    pub fn script(&self) -> Script {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle a capture trigger for the frame currently on screen
    ///
    /// Returns `false` without side effects if a request is already in flight.
    pub fn on_trigger(&mut self, frame: &Frame) -> bool {
        if !self.state.try_begin(ANALYZING_STATUS) {
            tracing::debug!("capture ignored, narration in flight");
            return false;
        }

        // Pick up any narration that finished since the last poll
        self.poll();

        let frame = frame.clone();
        let script = if self.keep_context {
            self.script()
        } else {
            Script::new()
        };
        let narrator = Arc::clone(&self.narrator);
        let state = Arc::clone(&self.state);
        let context = self.keep_context.then(|| Arc::clone(&self.script));

        self.workers.push(self.runtime.spawn(async move {
            narrator
                .run(frame, script, move |extended| {
                    if let Some(context) = context {
                        *context.lock().unwrap_or_else(PoisonError::into_inner) = extended.clone();
                    }
                    state.finish();
                })
                .await
        }));
        self.scheduled += 1;

        tracing::info!(request = self.scheduled, "capture accepted, describing frame");
        true
    }

    /// Collect finished workers without blocking
    pub fn poll(&mut self) {
        let mut finished = Vec::new();
        self.workers.retain_mut(|worker| match worker.now_or_never() {
            Some(joined) => {
                finished.push(joined);
                false
            }
            None => true,
        });

        for joined in finished {
            let _ = self.record(joined);
        }
    }

    /// Wait for the oldest outstanding worker, if any
    ///
    /// Returns the worker's outcome; errors are also logged.
    pub async fn wait(&mut self) -> Option<Result<Script>> {
        if self.workers.is_empty() {
            return None;
        }
        let worker = self.workers.remove(0);
        Some(self.record(worker.await))
    }

    /// Block until every outstanding worker finishes
    ///
    /// Must be called from outside the runtime (the display thread).
    pub fn drain(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        tracing::info!(pending = self.workers.len(), "waiting for narration in progress to finish");
        for worker in std::mem::take(&mut self.workers) {
            let joined = self.runtime.block_on(worker);
            let _ = self.record(joined);
        }
    }

    fn record(&self, joined: std::result::Result<Result<Script>, JoinError>) -> Result<Script> {
        let outcome = joined
            .unwrap_or_else(|e| Err(Error::Narration(format!("narration task failed: {e}"))));

        if let Err(e) = &outcome {
            if self.state.is_busy() {
                tracing::error!(error = %e, "narration failed, capture stays blocked");
            } else {
                tracing::error!(error = %e, "narration failed");
            }
        }
        outcome
    }
}
