//! Captured video frames

use image::RgbImage;

use crate::{Error, Result};

/// A single RGB8 frame (height × width × 3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap an existing RGB image
    #[must_use]
    pub const fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    /// Build a frame from tightly packed RGB8 bytes
    ///
    /// # Errors
    ///
    /// Returns error if the buffer length does not match `width * height * 3`
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        RgbImage::from_raw(width, height, data)
            .map(Self::from_image)
            .ok_or_else(|| {
                Error::Camera(format!(
                    "frame buffer of {len} bytes does not fit {width}x{height} RGB"
                ))
            })
    }

    /// Frame width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True when the frame holds no pixels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Borrow the underlying image
    #[must_use]
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Write the frame as packed `0RGB` words, the layout window buffers expect
    pub fn write_0rgb(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            self.image
                .pixels()
                .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2])),
        );
    }
}
