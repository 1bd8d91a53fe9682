//! Narrator - webcam snapshots described by a vision model and spoken aloud
//!
//! This library provides the pieces of the narrator:
//! - Threaded camera capture with a latest-frame slot
//! - Capture triggering guarded by a shared busy flag
//! - The describe-and-speak worker (vision completion, then TTS)
//! - The foreground display loop
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  read()   ┌──────────────┐  on_trigger  ┌───────────────────┐
//! │ FrameSource  ├──────────►│ DisplayLoop  ├─────────────►│ CaptureDispatcher │
//! │ (poll thread)│           │ (main thread)│              └─────────┬─────────┘
//! └──────────────┘           └──────▲───────┘                        │ spawn
//!                                   │ status          ┌──────────────▼──────────┐
//!                                   └─────────────────┤ Narrator (tokio task)   │
//!                                     CaptureState    │ encode → vision → speak │
//!                                                     └─────────────────────────┘
//! ```

pub mod camera;
pub mod capture;
pub mod config;
pub mod display;
pub mod error;
pub mod narration;
pub mod vision;
pub mod voice;

pub use camera::{Frame, FrameSource, SourceState, TestPattern, VideoSource, Webcam};
pub use capture::{CaptureDispatcher, CaptureState, CaptureStatus};
pub use config::{Config, ConfigOverrides, load_system_message};
pub use display::{Command, DesktopWindow, DisplayLoop, Screen};
pub use error::{Error, Result};
pub use narration::{NarrationSettings, Narrator, Script};
pub use vision::{CompletionClient, ConversationTurn, OpenAiVision};
pub use voice::{Speaker, TextToSpeech, VoiceOutput};
