//! Capture triggering and the shared busy/status state

mod dispatcher;
mod state;

pub use dispatcher::CaptureDispatcher;
pub use state::{ANALYZING_STATUS, CaptureState, CaptureStatus};
