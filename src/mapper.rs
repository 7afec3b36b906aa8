//! Coordinate mapper between display space (pointer positions, painting) and
//! native frame pixels.

use tracing::trace;

use crate::error::RoiError;
use crate::geometry::{
    DisplayGeometry, DisplayPoint, DisplayRect, Frame, ImageLayout, NativePoint, Roi,
    ViewportGeometry,
};
use crate::layout::{fit_frame, VerticalAlign};

/// Translate a pointer position into native pixels.
///
/// The result is rounded to the nearest pixel and clamped to
/// `[0, native_width] x [0, native_height]`.
pub fn to_native(
    display_x: f32,
    display_y: f32,
    layout: &ImageLayout,
    geometry: &DisplayGeometry,
    frame: &Frame,
) -> NativePoint {
    let native_w = frame.native_width() as f32;
    let native_h = frame.native_height() as f32;
    let scale_x = native_w / geometry.display_width;
    let scale_y = native_h / geometry.display_height;

    let adjusted_x = display_x - layout.origin_x - geometry.x_offset;
    let adjusted_y = display_y - layout.origin_y - geometry.y_offset;

    NativePoint {
        x: clamp_round(adjusted_x * scale_x, frame.native_width()),
        y: clamp_round(adjusted_y * scale_y, frame.native_height()),
    }
}

fn clamp_round(value: f32, max: u32) -> u32 {
    let rounded = value.round();
    if rounded.is_nan() || rounded <= 0.0 {
        0
    } else if rounded >= max as f32 {
        max
    } else {
        rounded as u32
    }
}

/// Project a native rectangle back onto the screen for painting.
pub fn to_display(
    roi: &Roi,
    layout: &ImageLayout,
    geometry: &DisplayGeometry,
    frame: &Frame,
) -> DisplayRect {
    let scale_x = geometry.display_width / frame.native_width() as f32;
    let scale_y = geometry.display_height / frame.native_height() as f32;

    DisplayRect {
        x: roi.x as f32 * scale_x + layout.origin_x + geometry.x_offset,
        y: roi.y as f32 * scale_y + layout.origin_y + geometry.y_offset,
        width: roi.width as f32 * scale_x,
        height: roi.height as f32 * scale_y,
    }
}

/// Frame, display geometry and the most recently measured layout, bundled so
/// the gesture machine always maps through current values.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    frame: Frame,
    viewport: ViewportGeometry,
    align: VerticalAlign,
    geometry: DisplayGeometry,
    layout: Option<ImageLayout>,
}

impl CoordinateMapper {
    pub fn new(
        frame: Frame,
        viewport: ViewportGeometry,
        align: VerticalAlign,
    ) -> Result<Self, RoiError> {
        let geometry = fit_frame(&frame, &viewport, align)?;
        Ok(Self {
            frame,
            viewport,
            align,
            geometry,
            layout: None,
        })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn viewport(&self) -> ViewportGeometry {
        self.viewport
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    pub fn layout(&self) -> Option<ImageLayout> {
        self.layout
    }

    /// Recompute display geometry for a new viewport. A failed validation
    /// keeps the previous geometry.
    pub fn set_viewport(&mut self, viewport: ViewportGeometry) -> Result<(), RoiError> {
        self.geometry = fit_frame(&self.frame, &viewport, self.align)?;
        self.viewport = viewport;
        Ok(())
    }

    /// Record the latest measured layout.
    pub fn set_layout(&mut self, layout: ImageLayout) {
        self.layout = Some(layout);
    }

    /// Screen rectangle the frame image occupies.
    pub fn image_rect(&self) -> Option<DisplayRect> {
        let layout = self.layout.filter(ImageLayout::is_measured)?;
        Some(DisplayRect {
            x: layout.origin_x + self.geometry.x_offset,
            y: layout.origin_y + self.geometry.y_offset,
            width: self.geometry.display_width,
            height: self.geometry.display_height,
        })
    }

    /// Native position under `point`, or `None` while no usable layout exists.
    pub fn to_native(&self, point: DisplayPoint) -> Option<NativePoint> {
        match self.layout.filter(ImageLayout::is_measured) {
            Some(layout) => Some(to_native(
                point.x,
                point.y,
                &layout,
                &self.geometry,
                &self.frame,
            )),
            None => {
                trace!(?point, "no measured layout, pointer ignored");
                None
            }
        }
    }

    pub fn to_display(&self, roi: &Roi) -> Option<DisplayRect> {
        let layout = self.layout.filter(ImageLayout::is_measured)?;
        Some(to_display(roi, &layout, &self.geometry, &self.frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_display_geometry;

    fn hd_mapper() -> CoordinateMapper {
        let frame = Frame::new(1920, 1080, "frame.png").unwrap();
        let mut mapper =
            CoordinateMapper::new(frame, ViewportGeometry::new(400.0, 800.0), VerticalAlign::Top)
                .unwrap();
        mapper.set_layout(ImageLayout::new(0.0, 0.0, 400.0, 800.0));
        mapper
    }

    #[test]
    fn test_full_frame_corners() {
        let mapper = hd_mapper();
        assert_eq!(
            mapper.to_native(DisplayPoint::new(0.0, 0.0)),
            Some(NativePoint { x: 0, y: 0 })
        );
        assert_eq!(
            mapper.to_native(DisplayPoint::new(400.0, 225.0)),
            Some(NativePoint { x: 1920, y: 1080 })
        );
    }

    #[test]
    fn test_points_outside_image_are_clamped() {
        let mapper = hd_mapper();
        assert_eq!(
            mapper.to_native(DisplayPoint::new(-30.0, 700.0)),
            Some(NativePoint { x: 0, y: 1080 })
        );
    }

    #[test]
    fn test_origin_and_offset_are_subtracted() {
        let frame = Frame::new(1080, 1920, "portrait.png").unwrap();
        let geometry =
            compute_display_geometry(1080, 1920, 800.0, 400.0, VerticalAlign::Top).unwrap();
        let layout = ImageLayout::new(10.0, 20.0, 800.0, 400.0);
        // Left edge of the pillarboxed image sits at 10 + 287.5.
        let p = to_native(297.5, 20.0, &layout, &geometry, &frame);
        assert_eq!(p, NativePoint { x: 0, y: 0 });
        let p = to_native(297.5 + 112.5, 220.0, &layout, &geometry, &frame);
        assert_eq!(p, NativePoint { x: 540, y: 960 });
    }

    #[test]
    fn test_stale_layout_is_a_no_op() {
        let frame = Frame::new(1920, 1080, "frame.png").unwrap();
        let mut mapper =
            CoordinateMapper::new(frame, ViewportGeometry::new(400.0, 800.0), VerticalAlign::Top)
                .unwrap();
        assert_eq!(mapper.to_native(DisplayPoint::new(10.0, 10.0)), None);
        mapper.set_layout(ImageLayout::default());
        assert_eq!(mapper.to_native(DisplayPoint::new(10.0, 10.0)), None);
        assert_eq!(mapper.to_display(&Roi::default()), None);
    }

    #[test]
    fn test_viewport_change_keeps_layout() {
        let mut mapper = hd_mapper();
        mapper.set_viewport(ViewportGeometry::new(800.0, 800.0)).unwrap();
        assert_eq!(mapper.geometry().display_width, 800.0);
        assert_eq!(
            mapper.to_native(DisplayPoint::new(800.0, 450.0)),
            Some(NativePoint { x: 1920, y: 1080 })
        );
        assert!(mapper.set_viewport(ViewportGeometry::new(0.0, 800.0)).is_err());
        assert_eq!(mapper.geometry().display_width, 800.0);
    }
}
