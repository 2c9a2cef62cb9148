//! Benchmarks for the quality checks, composition, and seeking.
//!
//! Run with: cargo bench
//! Run with all features: cargo bench --all-features
//!
//! The seek benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::{hint::black_box, path::Path, time::Duration};

use criterion::{BenchmarkId, Criterion};
use ffmpeg_next::util::log::Level as LogLevel;
use image::{DynamicImage, Rgb, RgbImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use vidsheet::compositor::compose;
use vidsheet::quality::{is_blank, is_blurry, is_unsafe};
use vidsheet::{
    CompositeOptions, CompositeResources, FfmpegDecoder, Filter, Frame, FrameDecoder, SeekMode,
    VideoMetadata,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn noise_frame(width: u32, height: u32, seed: u64) -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(seed);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255)])
    }))
}

fn benchmark_quality_checks(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("quality gate");
    for (width, height) in [(320, 180), (1280, 720), (1920, 1080)] {
        let frame = noise_frame(width, height, 1);
        let label = format!("{width}x{height}");
        group.bench_with_input(BenchmarkId::new("blank", &label), &frame, |bencher, frame| {
            bencher.iter(|| is_blank(black_box(frame), 85));
        });
        group.bench_with_input(BenchmarkId::new("blur", &label), &frame, |bencher, frame| {
            bencher.iter(|| is_blurry(black_box(frame), 62));
        });
        group.bench_with_input(BenchmarkId::new("skin", &label), &frame, |bencher, frame| {
            bencher.iter(|| is_unsafe(black_box(frame)));
        });
    }
    group.finish();
}

fn benchmark_composition(criterion: &mut Criterion) {
    let metadata = VideoMetadata::synthetic("bench.mp4", Duration::from_secs(600), 1280, 720);
    let frames: Vec<Frame> = (0..16)
        .map(|index| Frame::new(noise_frame(1280, 720, index), Duration::from_secs(index * 30)))
        .collect();

    let mut group = criterion.benchmark_group("composition");
    group.sample_size(20);

    let plain = CompositeOptions {
        columns: 4,
        header: false,
        timestamps: false,
        ..CompositeOptions::default()
    };
    group.bench_function("16 thumbnails", |bencher| {
        bencher.iter(|| {
            compose(&frames, &metadata, &plain, &CompositeResources::default()).unwrap()
        });
    });

    let filtered = CompositeOptions {
        filters: vec![Filter::Sepia, Filter::Fancy],
        border_width: 2,
        seed: Some(7),
        ..plain.clone()
    };
    group.bench_function("16 thumbnails with filters", |bencher| {
        bencher.iter(|| {
            compose(&frames, &metadata, &filtered, &CompositeResources::default()).unwrap()
        });
    });

    group.finish();
}

fn benchmark_seeking(criterion: &mut Criterion) {
    ffmpeg_next::util::log::set_level(LogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let mut group = criterion.benchmark_group("seek and decode");
    for mode in [SeekMode::Fast, SeekMode::Accurate] {
        group.bench_function(format!("{mode:?}"), |bencher| {
            let mut decoder = FfmpegDecoder::open(SAMPLE_VIDEO).unwrap();
            bencher.iter(|| {
                decoder
                    .seek_and_decode(Duration::from_millis(3_500), mode)
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_quality_checks,
    benchmark_composition,
    benchmark_seeking,
);
criterion::criterion_main!(benches);
