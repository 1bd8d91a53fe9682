//! Threaded frame source
//!
//! A background thread polls a [`VideoSource`] and keeps the latest frame in
//! a shared slot. The display loop reads the slot without ever waiting on
//! the camera.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use super::Frame;
use crate::{Error, Result};

/// Pause after a failed read so a dead camera doesn't spin the thread
const READ_FAILURE_BACKOFF: Duration = Duration::from_millis(10);

/// Anything that can produce frames on demand
///
/// Implementations may block in [`grab`](Self::grab) until a frame is ready.
/// They are created and used on the polling thread, so they need not be `Send`.
pub trait VideoSource {
    /// Read the next frame
    ///
    /// # Errors
    ///
    /// Returns error if the device could not deliver a frame
    fn grab(&mut self) -> Result<Frame>;
}

/// Lifecycle of a [`FrameSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Opened with one frame already grabbed; not polling yet
    Constructed,
    /// Background polling active
    Running,
    /// Polling thread has exited
    Stopped,
}

type Slot = Arc<Mutex<Arc<Frame>>>;

/// Continuously refreshed latest-frame buffer
pub struct FrameSource {
    slot: Slot,
    stop: Arc<AtomicBool>,
    start_tx: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
    state: SourceState,
}

impl FrameSource {
    /// Open a source on a dedicated polling thread
    ///
    /// `open` runs on that thread, then one frame is grabbed before this
    /// returns so [`read`](Self::read) always has something to show.
    ///
    /// # Errors
    ///
    /// Returns error if the source cannot be opened or the first grab fails
    pub fn open<F, S>(open: F) -> Result<Self>
    where
        F: FnOnce() -> Result<S> + Send + 'static,
        S: VideoSource + 'static,
    {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<Slot>>(1);
        let (start_tx, start_rx) = mpsc::channel::<()>();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let worker = std::thread::Builder::new()
            .name("frame-source".to_string())
            .spawn(move || {
                let (mut source, slot) = match open().and_then(|mut s| s.grab().map(|f| (s, f))) {
                    Ok((source, first)) => {
                        let slot = Arc::new(Mutex::new(Arc::new(first)));
                        if ready_tx.send(Ok(Arc::clone(&slot))).is_err() {
                            return;
                        }
                        (source, slot)
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                // Sender dropped without a start means we were stopped early
                if start_rx.recv().is_err() {
                    return;
                }

                poll_frames(&mut source, &slot, &stop_flag);
            })?;

        let slot = match ready_rx.recv() {
            Ok(Ok(slot)) => slot,
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(Error::Camera("frame source thread exited".to_string()));
            }
        };

        tracing::debug!("frame source opened");

        Ok(Self {
            slot,
            stop,
            start_tx: Some(start_tx),
            worker: Some(worker),
            state: SourceState::Constructed,
        })
    }

    /// Begin background polling
    ///
    /// Calling this more than once, or after [`stop`](Self::stop), does nothing.
    pub fn start(&mut self) -> &mut Self {
        if self.state != SourceState::Constructed {
            return self;
        }

        if let Some(tx) = self.start_tx.take() {
            if tx.send(()).is_ok() {
                self.state = SourceState::Running;
                tracing::debug!("frame source polling started");
            }
        }

        self
    }

    /// Latest captured frame
    #[must_use]
    pub fn read(&self) -> Arc<Frame> {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SourceState {
        self.state
    }

    /// Signal the polling thread and wait for it to exit
    ///
    /// At most one more poll may complete after the signal.
    pub fn stop(&mut self) {
        if self.state == SourceState::Stopped {
            return;
        }

        self.stop.store(true, Ordering::Release);
        // Wakes a thread still waiting for start()
        self.start_tx = None;

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("frame source thread panicked");
            }
        }

        self.state = SourceState::Stopped;
        tracing::debug!("frame source stopped");
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_frames<S: VideoSource>(source: &mut S, slot: &Slot, stop: &AtomicBool) {
    let mut grabbed = true;

    while !stop.load(Ordering::Acquire) {
        match source.grab() {
            Ok(frame) => {
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(frame);
                if !grabbed {
                    tracing::trace!("camera reads recovered");
                }
                grabbed = true;
            }
            Err(e) => {
                if grabbed {
                    tracing::trace!(error = %e, "camera read failed, keeping previous frame");
                }
                grabbed = false;
                std::thread::sleep(READ_FAILURE_BACKOFF);
            }
        }
    }
}
