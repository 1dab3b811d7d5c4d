//! Pixel Diff Benchmarks
//!
//! Benchmarks for perceptual diffing and header cropping.
//!
//! Run with: `cargo bench --bench diff_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use shotdiff::{compare_decoded, diff_images, CompareOptions, CropConfig, DiffOptions};

fn page(width: u32, height: u32, seed: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            ((x + seed) % 256) as u8,
            ((y * 3) % 256) as u8,
            ((x ^ y) % 256) as u8,
            255,
        ])
    })
}

fn bench_diff_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_identical");

    for (w, h) in [(320, 240), (1280, 720)] {
        let img = page(w, h, 0);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{h}")),
            &img,
            |bench, img| {
                bench.iter(|| {
                    let result = diff_images(black_box(img), black_box(img), &DiffOptions::default());
                    black_box(result.unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_diff_changed(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_changed");

    for include_aa in [false, true] {
        let a = page(640, 480, 0);
        let b = page(640, 480, 1);
        let options = DiffOptions::default().with_include_anti_aliasing(include_aa);
        group.bench_with_input(
            BenchmarkId::from_parameter(if include_aa { "include_aa" } else { "ignore_aa" }),
            &(a, b),
            |bench, (a, b)| {
                bench.iter(|| {
                    let result = diff_images(black_box(a), black_box(b), &options);
                    black_box(result.unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_compare_with_crop(c: &mut Criterion) {
    let a = DynamicImage::ImageRgba8(page(390, 844, 0));
    let b = DynamicImage::ImageRgba8(page(390, 844, 0));
    let options = CompareOptions::default().with_platform(CropConfig::new(47));

    c.bench_function("compare_decoded_with_crop", |bench| {
        bench.iter(|| {
            let result = compare_decoded(black_box(&a), black_box(&b), &options);
            black_box(result.unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_diff_identical,
    bench_diff_changed,
    bench_compare_with_crop
);
criterion_main!(benches);
