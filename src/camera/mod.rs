//! Video input
//!
//! Frames come from a [`VideoSource`] (native webcam or a synthetic
//! pattern) and are buffered by a [`FrameSource`] polling thread.

mod frame;
mod pattern;
mod source;
mod webcam;

pub use frame::Frame;
pub use pattern::TestPattern;
pub use source::{FrameSource, SourceState, VideoSource};
pub use webcam::{CameraInfo, Webcam, list_cameras};
