use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lazyload_core::ElementId;
use lazyload_foundation::{ObserverConfig, VisibilityDetector};
use lazyload_ui_graphics::Rect;

const TILE_HEIGHT: f32 = 180.0;

fn gallery(count: u32) -> VisibilityDetector {
    let mut detector = VisibilityDetector::new(ObserverConfig::default());
    for index in 0..count {
        detector.watch(ElementId(index));
    }
    detector
}

fn tile_bounds(id: ElementId) -> Option<Rect> {
    Some(Rect::new(0.0, id.0 as f32 * TILE_HEIGHT, 360.0, TILE_HEIGHT))
}

fn bench_scroll_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility_scroll");
    for count in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut detector = gallery(count);
            let mut offset = 0.0f32;
            b.iter(|| {
                offset = (offset + 37.0) % (count as f32 * TILE_HEIGHT);
                let viewport = Rect::new(0.0, offset, 360.0, 640.0);
                black_box(detector.observe(viewport, tile_bounds));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scroll_pass);
criterion_main!(benches);
