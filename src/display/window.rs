//! Desktop window via minifb

use minifb::{Key, KeyRepeat, ScaleMode, Window, WindowOptions};

use super::{Command, Screen};
use crate::{Error, Result};

/// Window title
pub const WINDOW_TITLE: &str = "Narrator";

const TARGET_FPS: usize = 60;

/// Native window showing the live view
pub struct DesktopWindow {
    window: Window,
}

impl DesktopWindow {
    /// Open a resizable window sized for `width`×`height` frames
    ///
    /// # Errors
    ///
    /// Returns error if the platform refuses to create a window
    pub fn open(width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            WINDOW_TITLE,
            width,
            height,
            WindowOptions {
                resize: true,
                scale_mode: ScaleMode::AspectRatioStretch,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| Error::Display(e.to_string()))?;

        window.set_target_fps(TARGET_FPS);
        tracing::debug!(width, height, "display window opened");

        Ok(Self { window })
    }
}

impl Screen for DesktopWindow {
    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn present(&mut self, buffer: &[u32], width: usize, height: usize) -> Result<()> {
        self.window
            .update_with_buffer(buffer, width, height)
            .map_err(|e| Error::Display(e.to_string()))
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(command_for_key)
            .collect()
    }
}

/// Keyboard binding
#[must_use]
pub const fn command_for_key(key: Key) -> Option<Command> {
    match key {
        Key::Q => Some(Command::Quit),
        Key::D => Some(Command::Describe),
        _ => None,
    }
}
