//! Native webcam access via nokhwa

use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};

use super::{Frame, VideoSource};
use crate::{Error, Result};

/// A camera as reported by the platform backend
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Backend index
    pub index: String,
    /// Human readable device name
    pub name: String,
    /// Backend specific details
    pub misc: String,
}

/// List cameras the native backend can see
///
/// # Errors
///
/// Returns error if the backend cannot be queried
pub fn list_cameras() -> Result<Vec<CameraInfo>> {
    let cameras = nokhwa::query(ApiBackend::Auto).map_err(|e| Error::Camera(e.to_string()))?;

    Ok(cameras
        .into_iter()
        .map(|info| CameraInfo {
            index: info.index().to_string(),
            name: info.human_name(),
            misc: info.misc(),
        })
        .collect())
}

/// An open webcam stream
pub struct Webcam {
    camera: Camera,
}

impl Webcam {
    /// Open the camera at `index` and start streaming
    ///
    /// # Errors
    ///
    /// Returns error if the device is missing or refuses to stream
    pub fn open(index: u32) -> Result<Self> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), format)
            .map_err(|e| Error::Camera(format!("failed to open camera {index}: {e}")))?;

        camera
            .open_stream()
            .map_err(|e| Error::Camera(format!("failed to start camera stream: {e}")))?;

        let resolution = camera.resolution();
        tracing::info!(
            camera = %camera.info().human_name(),
            width = resolution.width(),
            height = resolution.height(),
            fps = camera.frame_rate(),
            "camera opened"
        );

        Ok(Self { camera })
    }
}

impl VideoSource for Webcam {
    fn grab(&mut self) -> Result<Frame> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| Error::Camera(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::Camera(e.to_string()))?;

        // Rebuild through raw bytes; nokhwa may link a different `image` release
        let (width, height) = (decoded.width(), decoded.height());
        Frame::from_rgb(width, height, decoded.into_raw())
    }
}

impl Drop for Webcam {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!(error = %e, "failed to stop camera stream");
        }
    }
}
