//! Benchmarks for candidate generators and the full detection pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{GrayImage, Luma};
use pupil_tracking::{
    config::DetectionConfig,
    detection::{create_generator, DetectionMethod},
    Config, EyeMode, Landmark, LandmarkSet, PupilEngine,
};

/// Eye-sized patch with a dark disk and mild pixel noise
fn noisy_eye(size: u32, diameter: f64) -> GrayImage {
    let center = f64::from(size) / 2.0;
    GrayImage::from_fn(size, size, |x, y| {
        let noise = rand::random::<u8>() % 12;
        if (f64::from(x) - center).hypot(f64::from(y) - center) <= diameter / 2.0 {
            Luma([30 + noise])
        } else {
            Luma([190 + noise])
        }
    })
}

fn benchmark_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("generators");
    let config = DetectionConfig::default();

    for size in [40u32, 80] {
        let roi = noisy_eye(size, f64::from(size) / 3.0);
        for method in DetectionMethod::ALL {
            let generator = create_generator(method, &config);
            group.bench_with_input(BenchmarkId::new(method.name(), size), &roi, |b, roi| {
                b.iter(|| black_box(generator.generate(black_box(roi))));
            });
        }
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let (width, height) = (640u32, 480u32);
    let centers = [(400.0, 220.0), (240.0, 220.0)];
    let frame = GrayImage::from_fn(width, height, |x, y| {
        let (fx, fy) = (f64::from(x), f64::from(y));
        let dark = centers.iter().any(|c: &(f64, f64)| (fx - c.0).hypot(fy - c.1) <= 12.0);
        let base: u8 = if dark { 35 } else { 185 };
        Luma([base + rand::random::<u8>() % 10])
    });

    let mut points = vec![Landmark::new(0.5, 0.5); 478];
    for (base, center) in [(473usize, centers[0]), (468, centers[1])] {
        let ring = [(0.0, 0.0), (15.0, 0.0), (0.0, -15.0), (-15.0, 0.0), (0.0, 15.0)];
        for (offset, (dx, dy)) in ring.into_iter().enumerate() {
            points[base + offset] = Landmark::new((center.0 + dx) / f64::from(width), (center.1 + dy) / f64::from(height));
        }
    }
    let landmarks = LandmarkSet::new(points);

    let mut group = c.benchmark_group("pipeline");
    for mode in [EyeMode::Left, EyeMode::Both] {
        let mut engine = PupilEngine::new(Config::default()).expect("default config is valid");
        group.bench_with_input(BenchmarkId::new("detect", mode), &mode, |b, &mode| {
            b.iter(|| black_box(engine.detect(black_box(&frame), &landmarks, mode)));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_generators, benchmark_pipeline);
criterion_main!(benches);
