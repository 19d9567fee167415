//! Render benchmark: Measure one render tick without the device.
//!
//! Target: < 50µs for a 128×64 panel with 8 rows

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oled_rows::render::compose_frame;
use oled_rows::{Canvas, CommitGate, DisplayConfig, MonoFontRasterizer};

fn status_rows(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Row {i}: 42% 1h 5m")).collect()
}

fn compose_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_frame");
    for (width, height) in [(128u32, 32u32), (128, 64)] {
        let config = DisplayConfig::new(width, height, 8, 1);
        let rows = status_rows(config.row_count());
        let mut canvas = Canvas::new(width, height);
        let mut rasterizer = MonoFontRasterizer::for_glyph_height(config.font_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &rows,
            |b, rows| {
                b.iter(|| {
                    compose_frame(&mut canvas, black_box(rows), &config, &mut rasterizer);
                });
            },
        );
    }
    group.finish();
}

fn pack_pages(c: &mut Criterion) {
    let config = DisplayConfig::new(128, 64, 8, 1);
    let mut canvas = Canvas::new(128, 64);
    let mut rasterizer = MonoFontRasterizer::for_glyph_height(8);
    compose_frame(&mut canvas, &status_rows(8), &config, &mut rasterizer);

    c.bench_function("to_pages_128x64", |b| b.iter(|| black_box(&canvas).to_pages()));
}

fn publish_and_read(c: &mut Criterion) {
    let gate = CommitGate::new(8);
    let rows = status_rows(8);

    c.bench_function("commit_gate_publish_read", |b| {
        b.iter(|| {
            gate.publish(black_box(&rows));
            black_box(gate.read())
        });
    });
}

criterion_group!(benches, compose_full_frame, pack_pages, publish_and_read);
criterion_main!(benches);
