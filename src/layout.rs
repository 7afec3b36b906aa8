//! Layout engine: fits a native frame into the available viewport while
//! keeping its aspect ratio.

use crate::error::RoiError;
use crate::geometry::{DisplayGeometry, Frame, ViewportGeometry};

/// Vertical placement of the scaled frame inside the viewport.
///
/// The frame is always centred horizontally when narrower than the viewport.
/// Vertically it is top-aligned unless `Center` is requested; switching
/// changes where pointer positions land in native space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
}

impl VerticalAlign {
    pub fn from_center_flag(center: bool) -> Self {
        if center {
            Self::Center
        } else {
            Self::Top
        }
    }
}

/// Scale `native_width x native_height` into `available_width x available_height`.
pub fn compute_display_geometry(
    native_width: u32,
    native_height: u32,
    available_width: f32,
    available_height: f32,
    align: VerticalAlign,
) -> Result<DisplayGeometry, RoiError> {
    if native_width == 0 || native_height == 0 {
        return Err(RoiError::InvalidFrame {
            width: native_width,
            height: native_height,
        });
    }
    ViewportGeometry::new(available_width, available_height).validate()?;

    let aspect_ratio = native_width as f32 / native_height as f32;

    let width_based_height = available_width / aspect_ratio;
    let height_based_width = available_height * aspect_ratio;

    let (mut display_width, mut display_height) = if width_based_height <= available_height {
        (available_width, width_based_height)
    } else {
        (height_based_width, available_height)
    };

    // Very tall frames: the viewport height is the hard limit.
    if display_height > available_height {
        display_height = available_height;
        display_width = available_height * aspect_ratio;
    }

    let x_offset = if display_width < available_width {
        (available_width - display_width) / 2.0
    } else {
        0.0
    };

    let y_offset = match align {
        VerticalAlign::Center if display_height < available_height => {
            (available_height - display_height) / 2.0
        }
        _ => 0.0,
    };

    Ok(DisplayGeometry {
        display_width,
        display_height,
        x_offset,
        y_offset,
    })
}

/// Convenience wrapper over [`compute_display_geometry`] for bound values.
pub fn fit_frame(
    frame: &Frame,
    viewport: &ViewportGeometry,
    align: VerticalAlign,
) -> Result<DisplayGeometry, RoiError> {
    compute_display_geometry(
        frame.native_width(),
        frame.native_height(),
        viewport.available_width,
        viewport.available_height,
        align,
    )
}
