//! Shared capture status

use tokio::sync::watch;

/// Caption shown while a request is in flight
pub const ANALYZING_STATUS: &str = "Analyzing Image...";

/// Snapshot of the capture state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStatus {
    /// A describe-and-speak request is in flight
    pub busy: bool,
    /// Caption drawn over the live view
    pub text: String,
}

/// Busy flag and status caption shared by the dispatcher and its worker
///
/// The foreground only ever moves the state from idle to busy, the worker's
/// completion signal only from busy to idle.
#[derive(Debug)]
pub struct CaptureState {
    tx: watch::Sender<CaptureStatus>,
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureState {
    /// Create an idle state
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CaptureStatus::default());
        Self { tx }
    }

    /// Mark a request in flight unless one already is
    ///
    /// Returns `false`, leaving the state untouched, when already busy.
    pub fn try_begin(&self, text: &str) -> bool {
        self.tx.send_if_modified(|status| {
            if status.busy {
                return false;
            }
            status.busy = true;
            status.text = text.to_string();
            true
        })
    }

    /// Clear the busy flag and caption
    pub fn finish(&self) {
        self.tx.send_modify(|status| {
            status.busy = false;
            status.text.clear();
        });
    }

    /// Whether a request is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.tx.borrow().busy
    }

    /// Current caption
    #[must_use]
    pub fn status_text(&self) -> String {
        self.tx.borrow().text.clone()
    }

    /// Copy of the full state
    #[must_use]
    pub fn snapshot(&self) -> CaptureStatus {
        self.tx.borrow().clone()
    }

    /// Watch state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CaptureStatus> {
        self.tx.subscribe()
    }

    /// Wait until no request is in flight
    pub async fn wait_idle(&self) {
        let mut rx = self.tx.subscribe();
        // Sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|status| !status.busy).await;
    }
}
