use criterion::{black_box, criterion_group, criterion_main, Criterion};
use roi_tool::{
    compute_display_geometry, DisplayPoint, Frame, ImageLayout, PointerId, RoiTool, VerticalAlign,
    ViewportGeometry,
};

fn bench_layout(c: &mut Criterion) {
    c.bench_function("compute_display_geometry", |b| {
        b.iter(|| {
            compute_display_geometry(
                black_box(1920),
                black_box(1080),
                black_box(411.0),
                black_box(683.0),
                VerticalAlign::Top,
            )
        })
    });
}

fn bench_drag(c: &mut Criterion) {
    let mut tool = RoiTool::new(());
    tool.initialize(
        Frame::new(3840, 2160, "uhd.png").expect("valid frame"),
        ViewportGeometry::new(1280.0, 720.0),
    )
    .expect("valid viewport");
    tool.viewport_measured(ImageLayout::new(0.0, 40.0, 1280.0, 720.0));

    c.bench_function("drag_240_moves", |b| {
        b.iter(|| {
            tool.pointer_down(PointerId(0), DisplayPoint::new(640.0, 400.0));
            for i in 0..240 {
                let t = i as f32;
                tool.pointer_move(PointerId(0), DisplayPoint::new(640.0 - t * 2.5, 400.0 - t));
            }
            tool.pointer_up(PointerId(0), DisplayPoint::new(40.0, 160.0));
            black_box(tool.committed())
        })
    });
}

criterion_group!(benches, bench_layout, bench_drag);
criterion_main!(benches);
