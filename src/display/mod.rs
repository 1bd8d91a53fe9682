//! Foreground display loop
//!
//! Shows the live view with the status caption and turns key presses into
//! capture triggers. Runs on the main thread; never waits on the camera or
//! on a narration.

mod caption;
mod window;

use std::ops::ControlFlow;

use crate::Result;
use crate::camera::FrameSource;
use crate::capture::CaptureDispatcher;

pub use caption::{CAPTION_COLOR, CAPTION_ORIGIN, draw_caption};
pub use window::{DesktopWindow, WINDOW_TITLE, command_for_key};

/// User command decoded from input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Leave the loop and shut down
    Quit,
    /// Describe the frame currently on screen
    Describe,
}

/// A surface frames are presented on
pub trait Screen {
    /// False once the user closed the surface
    fn is_open(&self) -> bool;

    /// Show a `0RGB` buffer
    ///
    /// # Errors
    ///
    /// Returns error if the surface cannot be updated
    fn present(&mut self, buffer: &[u32], width: usize, height: usize) -> Result<()>;

    /// Commands entered since the last call
    fn poll_commands(&mut self) -> Vec<Command>;
}

/// Render/poll loop tying the frame source to the dispatcher
pub struct DisplayLoop<S: Screen> {
    screen: S,
    frames: FrameSource,
    dispatcher: CaptureDispatcher,
    buffer: Vec<u32>,
}

impl<S: Screen> DisplayLoop<S> {
    /// Loop presenting `frames` on `screen`, triggering through `dispatcher`
    #[must_use]
    pub const fn new(screen: S, frames: FrameSource, dispatcher: CaptureDispatcher) -> Self {
        Self {
            screen,
            frames,
            dispatcher,
            buffer: Vec::new(),
        }
    }

    /// Run until quit, then shut down
    ///
    /// Shutdown closes the screen, stops the frame source and waits for any
    /// narration still in progress.
    ///
    /// # Errors
    ///
    /// Returns error if presenting a frame fails
    pub fn run(mut self) -> Result<()> {
        let result = loop {
            match self.tick() {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.shutdown();
        result
    }

    /// One iteration: draw, present, handle input
    ///
    /// # Errors
    ///
    /// Returns error if presenting the frame fails
    pub fn tick(&mut self) -> Result<ControlFlow<()>> {
        self.dispatcher.poll();

        let frame = self.frames.read();
        let (width, height) = (frame.width() as usize, frame.height() as usize);

        frame.write_0rgb(&mut self.buffer);
        let status = self.dispatcher.state().status_text();
        if !status.is_empty() {
            draw_caption(&mut self.buffer, width, height, &status);
        }

        self.screen.present(&self.buffer, width, height)?;

        if !self.screen.is_open() {
            tracing::debug!("window closed");
            return Ok(ControlFlow::Break(()));
        }

        for command in self.screen.poll_commands() {
            match command {
                Command::Quit => return Ok(ControlFlow::Break(())),
                Command::Describe => {
                    self.dispatcher.on_trigger(&frame);
                }
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn shutdown(self) {
        let Self {
            screen,
            mut frames,
            mut dispatcher,
            ..
        } = self;

        drop(screen);
        frames.stop();
        dispatcher.drain();
        tracing::info!(narrations = dispatcher.scheduled(), "narrator stopped");
    }
}
