//! Representative frame acquisition.
//!
//! The diagnosis server extracts one frame from the uploaded video and reports
//! the video's native size next to it. The preview image may be downscaled, so
//! the native size is tracked separately from the decoded pixels.

use std::path::{Path, PathBuf};

use image::GenericImageView;
use tracing::{debug, info};

use crate::error::AppError;
use crate::geometry::Frame;

/// Supported still-frame extensions
pub const SUPPORTED_FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff"];

/// Check if a file looks like a frame image we can decode
pub fn is_supported_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decoded preview plus the native frame description.
#[derive(Debug, Clone)]
pub struct RepresentativeFrame {
    pub frame: Frame,
    /// RGBA8 pixels of the preview image
    pub rgba: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// Supplies a representative frame for ROI selection.
pub trait FrameSource {
    fn representative_frame(&self) -> Result<RepresentativeFrame, AppError>;
}

/// Frame read from an image file on disk.
#[derive(Debug, Clone)]
pub struct ImageFileFrameSource {
    path: PathBuf,
    native_size: Option<(u32, u32)>,
}

impl ImageFileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            native_size: None,
        }
    }

    /// Report `width x height` as the native size instead of the image's own.
    pub fn with_native_size(mut self, width: u32, height: u32) -> Self {
        self.native_size = Some((width, height));
        self
    }

    fn load_error(&self, reason: impl ToString) -> AppError {
        AppError::FrameLoad {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Native dimensions without decoding the whole image.
    pub fn probe_size(&self) -> Result<(u32, u32), AppError> {
        if let Some(size) = self.native_size {
            return Ok(size);
        }
        let size = imagesize::size(&self.path).map_err(|e| self.load_error(e))?;
        let width = u32::try_from(size.width).map_err(|e| self.load_error(e))?;
        let height = u32::try_from(size.height).map_err(|e| self.load_error(e))?;
        Ok((width, height))
    }
}

impl FrameSource for ImageFileFrameSource {
    fn representative_frame(&self) -> Result<RepresentativeFrame, AppError> {
        if !is_supported_frame(&self.path) {
            return Err(self.load_error("unsupported file type"));
        }
        let (native_width, native_height) = self.probe_size()?;
        let frame = Frame::new(native_width, native_height, self.path.display().to_string())?;

        let img = image::open(&self.path)?;
        let (pixel_width, pixel_height) = img.dimensions();
        if (pixel_width, pixel_height) != (native_width, native_height) {
            debug!(
                pixel_width,
                pixel_height, native_width, native_height, "preview differs from native size"
            );
        }
        info!("loaded frame {} ({native_width}x{native_height})", self.path.display());

        Ok(RepresentativeFrame {
            frame,
            rgba: img.to_rgba8().into_raw(),
            pixel_width,
            pixel_height,
        })
    }
}
