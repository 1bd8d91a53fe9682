//! Snapshot resize and JPEG encoding

use std::io::{Cursor, ErrorKind};
use std::path::Path;

use base64::Engine;
use image::imageops::{self, FilterType};
use image::{ImageError, ImageFormat, RgbImage};

use crate::camera::Frame;
use crate::{Error, Result};

/// Width snapshots are scaled to before upload
pub const TARGET_WIDTH: u32 = 250;

/// Height that keeps the aspect ratio at `target_width`
///
/// # Errors
///
/// Returns error for a zero-width source
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> Result<u32> {
    if width == 0 {
        return Err(Error::Encode("cannot scale a zero-width frame".to_string()));
    }

    let scaled = (f64::from(height) * f64::from(target_width) / f64::from(width)).round();
    Ok((scaled as u32).max(1))
}

/// Scale `frame` to `target_width`, keeping its aspect ratio
///
/// # Errors
///
/// Returns error for a zero-width frame
pub fn resize_to_width(frame: &Frame, target_width: u32) -> Result<RgbImage> {
    let height = scaled_height(frame.width(), frame.height(), target_width)?;
    Ok(imageops::resize(
        frame.image(),
        target_width,
        height,
        FilterType::Triangle,
    ))
}

/// Resize, save a copy to `save_path`, and return the JPEG as base64
///
/// Returns `Ok(None)` when the copy cannot be written for lack of
/// permission; the request should be dropped.
///
/// # Errors
///
/// Returns error for any other resize, write, or encode failure
pub fn encode_frame(frame: &Frame, save_path: &Path) -> Result<Option<String>> {
    let resized = resize_to_width(frame, TARGET_WIDTH)?;

    if let Err(e) = resized.save_with_format(save_path, ImageFormat::Jpeg) {
        if is_permission_denied(&e) {
            tracing::warn!(path = %save_path.display(), error = %e, "snapshot not writable");
            println!("Failed to capture image, retry in a moment");
            return Ok(None);
        }
        return Err(e.into());
    }

    let mut jpeg = Cursor::new(Vec::new());
    resized.write_to(&mut jpeg, ImageFormat::Jpeg)?;

    tracing::debug!(
        width = resized.width(),
        height = resized.height(),
        bytes = jpeg.get_ref().len(),
        path = %save_path.display(),
        "snapshot encoded"
    );

    Ok(Some(
        base64::engine::general_purpose::STANDARD.encode(jpeg.into_inner()),
    ))
}

/// Whether a save failed only for lack of permission
#[must_use]
pub fn is_permission_denied(error: &ImageError) -> bool {
    matches!(error, ImageError::IoError(e) if e.kind() == ErrorKind::PermissionDenied)
}
