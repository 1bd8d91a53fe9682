//! Synthetic video source for running without a webcam

use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};

use super::{Frame, VideoSource};
use crate::Result;

/// Scrolling colour gradient at a fixed frame rate
pub struct TestPattern {
    width: u32,
    height: u32,
    interval: Duration,
    last: Option<Instant>,
    tick: u32,
}

impl TestPattern {
    /// Create a pattern of the given size, paced at `fps` frames per second
    ///
    /// An `fps` of zero disables pacing.
    #[must_use]
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        let interval = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };

        Self {
            width,
            height,
            interval,
            last: None,
            tick: 0,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render(&self) -> RgbImage {
        let (w, h, t) = (self.width.max(1), self.height.max(1), self.tick);
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let r = ((x + t) * 255 / w) as u8;
            let g = (y * 255 / h) as u8;
            let b = (t.wrapping_mul(3) % 256) as u8;
            Rgb([r, g, b])
        })
    }
}

impl VideoSource for TestPattern {
    fn grab(&mut self) -> Result<Frame> {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());

        let frame = Frame::from_image(self.render());
        self.tick = (self.tick + 4) % self.width.max(1);
        Ok(frame)
    }
}
