//! Value types shared by the layout engine, the coordinate mapper and the
//! gesture state machine.

use serde::{Deserialize, Serialize};

use crate::error::RoiError;

/// Representative frame of a recorded or uploaded video.
///
/// Produced by a frame source; the ROI core only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    native_width: u32,
    native_height: u32,
    image_uri: String,
}

impl Frame {
    /// Create a frame, rejecting zero dimensions.
    pub fn new(
        native_width: u32,
        native_height: u32,
        image_uri: impl Into<String>,
    ) -> Result<Self, RoiError> {
        if native_width == 0 || native_height == 0 {
            return Err(RoiError::InvalidFrame {
                width: native_width,
                height: native_height,
            });
        }
        Ok(Self {
            native_width,
            native_height,
            image_uri: image_uri.into(),
        })
    }

    pub fn native_width(&self) -> u32 {
        self.native_width
    }

    pub fn native_height(&self) -> u32 {
        self.native_height
    }

    pub fn image_uri(&self) -> &str {
        &self.image_uri
    }
}

/// Space the hosting surface offers for the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub available_width: f32,
    pub available_height: f32,
}

impl ViewportGeometry {
    pub fn new(available_width: f32, available_height: f32) -> Self {
        Self {
            available_width,
            available_height,
        }
    }

    /// Viewport for a container whose height may not be measured yet.
    ///
    /// A `measured_height` of zero falls back to `screen_height * fraction`.
    pub fn with_fallback_height(
        available_width: f32,
        measured_height: f32,
        screen_height: f32,
        fraction: f32,
    ) -> Self {
        let available_height = if measured_height > 0.0 {
            measured_height
        } else {
            screen_height * fraction
        };
        Self::new(available_width, available_height)
    }

    pub(crate) fn validate(&self) -> Result<(), RoiError> {
        let w = self.available_width;
        let h = self.available_height;
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(RoiError::InvalidViewport {
                width: w,
                height: h,
            });
        }
        Ok(())
    }
}

/// Size and placement of the scaled frame inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub display_width: f32,
    pub display_height: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// On-screen box of the area the frame is drawn into, measured after layout.
/// Pointer positions are relative to the same parent as this box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageLayout {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: f32,
    pub height: f32,
}

impl ImageLayout {
    pub fn new(origin_x: f32, origin_y: f32, width: f32, height: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            width,
            height,
        }
    }

    /// True when the box has actually been laid out.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.origin_x.is_finite()
            && self.origin_y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

impl DisplayPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativePoint {
    pub x: u32,
    pub y: u32,
}

/// Rectangle in display coordinates, used only for painting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Region of interest in native frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    /// Zero-size rectangle anchored at `point`.
    pub fn at(point: NativePoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            width: 0,
            height: 0,
        }
    }

    /// Normalised rectangle spanned by two corners, whatever the drag direction.
    pub fn spanning(a: NativePoint, b: NativePoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    /// Keep the rectangle inside `frame`, shrinking the size rather than
    /// moving the origin.
    pub fn clamped_to(self, frame: &Frame) -> Self {
        let x = self.x.min(frame.native_width());
        let y = self.y.min(frame.native_height());
        Self {
            x,
            y,
            width: self.width.min(frame.native_width() - x),
            height: self.height.min(frame.native_height() - y),
        }
    }

    /// Both sides strictly larger than `min_size`.
    pub fn exceeds(&self, min_size: u32) -> bool {
        self.width > min_size && self.height > min_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(100, 50, "frame.png").unwrap()
    }

    #[test]
    fn test_zero_sized_frame_rejected() {
        assert_eq!(
            Frame::new(0, 1080, "x"),
            Err(RoiError::InvalidFrame {
                width: 0,
                height: 1080
            })
        );
        assert!(Frame::new(1920, 0, "x").is_err());
    }

    #[test]
    fn test_spanning_normalises_direction() {
        let a = NativePoint { x: 50, y: 50 };
        let b = NativePoint { x: 45, y: 40 };
        assert_eq!(
            Roi::spanning(a, b),
            Roi {
                x: 45,
                y: 40,
                width: 5,
                height: 10
            }
        );
        assert_eq!(Roi::spanning(a, b), Roi::spanning(b, a));
    }

    #[test]
    fn test_clamp_shrinks_instead_of_moving() {
        let roi = Roi {
            x: 90,
            y: 40,
            width: 30,
            height: 30,
        }
        .clamped_to(&frame());
        assert_eq!(
            roi,
            Roi {
                x: 90,
                y: 40,
                width: 10,
                height: 10
            }
        );
    }

    #[test]
    fn test_fallback_height() {
        let vp = ViewportGeometry::with_fallback_height(400.0, 0.0, 1000.0, 0.8);
        assert_eq!(vp.available_height, 800.0);
        let vp = ViewportGeometry::with_fallback_height(400.0, 600.0, 1000.0, 0.8);
        assert_eq!(vp.available_height, 600.0);
    }
}
