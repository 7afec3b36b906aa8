//! Properties that must hold for every frame, viewport and drag.

use proptest::prelude::*;
use roi_tool::{
    compute_display_geometry, CoordinateMapper, DisplayPoint, Frame, GestureState, ImageLayout,
    PointerId, Roi, RoiObserver, RoiTool, VerticalAlign, ViewportGeometry, DEFAULT_MIN_ROI_SIZE,
};

const EPS: f32 = 1e-4;
const TOUCH: PointerId = PointerId(3);

#[derive(Default)]
struct Selections(Vec<Roi>);

impl RoiObserver for Selections {
    fn on_roi_selected(&mut self, roi: Roi) {
        self.0.push(roi);
    }
    fn on_cancelled(&mut self) {}
}

fn align() -> impl Strategy<Value = VerticalAlign> {
    prop_oneof![Just(VerticalAlign::Top), Just(VerticalAlign::Center)]
}

fn bound_tool(
    (width, height): (u32, u32),
    (aw, ah): (f32, f32),
    (ox, oy): (f32, f32),
    align: VerticalAlign,
) -> RoiTool<Selections> {
    let mut tool = RoiTool::new(Selections::default()).with_vertical_align(align);
    tool.initialize(
        Frame::new(width, height, "frame.png").unwrap(),
        ViewportGeometry::new(aw, ah),
    )
    .unwrap();
    tool.viewport_measured(ImageLayout::new(ox, oy, aw, ah));
    tool
}

proptest! {
    #[test]
    fn display_fits_viewport_and_keeps_aspect(
        width in 1u32..10_000,
        height in 1u32..10_000,
        aw in 1.0f32..5000.0,
        ah in 1.0f32..5000.0,
        align in align(),
    ) {
        let g = compute_display_geometry(width, height, aw, ah, align).unwrap();
        prop_assert!(g.display_width <= aw * (1.0 + EPS), "{g:?}");
        prop_assert!(g.display_height <= ah * (1.0 + EPS), "{g:?}");
        let expected = width as f32 / height as f32;
        let actual = g.display_width / g.display_height;
        prop_assert!(((actual - expected) / expected).abs() < EPS, "{g:?}");
        prop_assert!(g.x_offset >= 0.0 && g.y_offset >= 0.0, "{g:?}");
    }

    #[test]
    fn native_display_round_trip_within_one_pixel(
        width in 16u32..4096,
        height in 16u32..4096,
        aw in 100.0f32..2000.0,
        ah in 100.0f32..2000.0,
        ox in 0.0f32..500.0,
        oy in 0.0f32..500.0,
        align in align(),
        fx in 0.0f64..=1.0,
        fy in 0.0f64..=1.0,
    ) {
        let frame = Frame::new(width, height, "frame.png").unwrap();
        let mut mapper = CoordinateMapper::new(frame, ViewportGeometry::new(aw, ah), align).unwrap();
        mapper.set_layout(ImageLayout::new(ox, oy, aw, ah));

        let x = (fx * width as f64).round() as u32;
        let y = (fy * height as f64).round() as u32;
        let rect = mapper.to_display(&Roi { x, y, width: 0, height: 0 }).unwrap();
        let back = mapper.to_native(DisplayPoint::new(rect.x, rect.y)).unwrap();
        prop_assert!(back.x.abs_diff(x) <= 1, "x {x} -> {}", back.x);
        prop_assert!(back.y.abs_diff(y) <= 1, "y {y} -> {}", back.y);
    }

    #[test]
    fn every_drag_stays_inside_the_frame(
        size in (1u32..4096, 1u32..4096),
        viewport in (50.0f32..2000.0, 50.0f32..2000.0),
        origin in (0.0f32..300.0, 0.0f32..300.0),
        align in align(),
        start in (-500.0f32..3000.0, -500.0f32..3000.0),
        path in prop::collection::vec((-500.0f32..3000.0, -500.0f32..3000.0), 1..40),
    ) {
        let mut tool = bound_tool(size, viewport, origin, align);
        tool.pointer_down(TOUCH, DisplayPoint::new(start.0, start.1));
        for &(x, y) in &path {
            tool.pointer_move(TOUCH, DisplayPoint::new(x, y));
            let roi = tool.in_progress().unwrap();
            prop_assert!(roi.x + roi.width <= size.0, "{roi:?} in {size:?}");
            prop_assert!(roi.y + roi.height <= size.1, "{roi:?} in {size:?}");
        }

        let last = tool.in_progress().unwrap();
        tool.pointer_up(TOUCH, DisplayPoint::new(start.0, start.1));
        if last.exceeds(DEFAULT_MIN_ROI_SIZE) {
            prop_assert_eq!(&tool.observer().0, &vec![last]);
            prop_assert_eq!(tool.state(), GestureState::Committed(last));
        } else {
            prop_assert!(tool.observer().0.is_empty());
            prop_assert_eq!(tool.state(), GestureState::Idle);
        }
    }

    #[test]
    fn thin_releases_never_select(
        start in (20.0f32..380.0, 20.0f32..205.0),
        small in -9.5f32..=9.5,
        large in -200.0f32..200.0,
        thin_side_is_width in any::<bool>(),
    ) {
        // 400x225 is shown 1:1 in a 400x800 viewport.
        let mut tool = bound_tool((400, 225), (400.0, 800.0), (0.0, 0.0), VerticalAlign::Top);
        let (dx, dy) = if thin_side_is_width { (small, large) } else { (large, small) };
        tool.pointer_down(TOUCH, DisplayPoint::new(start.0, start.1));
        tool.pointer_move(TOUCH, DisplayPoint::new(start.0 + dx, start.1 + dy));
        let roi = tool.in_progress().unwrap();
        prop_assert!(roi.width <= 10 || roi.height <= 10, "{roi:?}");
        tool.pointer_up(TOUCH, DisplayPoint::new(start.0 + dx, start.1 + dy));
        prop_assert!(tool.observer().0.is_empty());
        prop_assert_eq!(tool.state(), GestureState::Idle);
    }
}
