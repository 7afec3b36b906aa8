//! Error types for the ROI core and the host application.

use thiserror::Error;

/// Validation failures raised by the ROI core.
///
/// Degenerate selections and pointer events that arrive before a layout has
/// been measured are not errors; the gesture machine drops them silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoiError {
    /// Frame with zero native dimensions.
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },
    /// Viewport that is empty, negative or not finite.
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    /// Operation needs a frame bound through `initialize`.
    #[error("no frame has been initialized")]
    NotInitialized,
}

/// Errors surfaced by the host application and the collaborator adapters.
#[derive(Debug, Error)]
pub enum AppError {
    /// The representative frame could not be read.
    #[error("failed to load frame {path}: {reason}")]
    FrameLoad { path: String, reason: String },
    /// Image decoding failure.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// I/O error while reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Diagnosis request serialisation failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Core validation failure.
    #[error(transparent)]
    Roi(#[from] RoiError),
    /// The window could not be created or crashed.
    #[error("window error: {0}")]
    Window(String),
}
