//! ROI selection core.
//!
//! Fits a representative video frame into a viewport, maps pointer positions
//! between display and native pixel space, and drives the rectangle-drawing
//! gesture that produces the region of interest sent for diagnosis.

pub mod config;
pub mod error;
pub mod frame_source;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod mapper;
pub mod submission;

pub use error::{AppError, RoiError};
pub use geometry::{
    DisplayGeometry, DisplayPoint, DisplayRect, Frame, ImageLayout, NativePoint, Roi,
    ViewportGeometry,
};
pub use gesture::{
    GestureState, OverlayStyle, PointerId, RoiEvent, RoiObserver, RoiOverlay, RoiTool,
    DEFAULT_MIN_ROI_SIZE,
};
pub use layout::{compute_display_geometry, VerticalAlign};
pub use mapper::CoordinateMapper;
