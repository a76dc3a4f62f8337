//! Benchmarks for sampling and archive assembly.
//!
//! Run with: cargo bench
//!
//! The FFmpeg benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`; the synthetic ones always run.

use std::{hint::black_box, path::Path, time::Duration};

use criterion::Criterion;
use framezip::{
    ExtractOptions, FfmpegLogLevel, FfmpegMedia, Limits, MediaElement, PixelFormat,
    SyntheticMedia, archive, sampler,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn benchmark_synthetic_sampling(criterion: &mut Criterion) {
    let limits = Limits::default();
    let mut group = criterion.benchmark_group("synthetic sampling");

    for (label, interval) in [("100 frames", 0.1), ("10 frames", 1.0)] {
        let options = ExtractOptions::new().with_interval(interval).unwrap();
        group.bench_function(label, |bencher| {
            bencher.iter(|| {
                let mut media = SyntheticMedia::new(Duration::from_secs(10), 320, 240);
                black_box(sampler::sample(&mut media, &options, &limits).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_archive_assembly(criterion: &mut Criterion) {
    let mut media = SyntheticMedia::new(Duration::from_secs(50), 320, 240);
    let options = ExtractOptions::new().with_interval(1.0).unwrap();
    let frames = sampler::sample(&mut media, &options, &Limits::default()).unwrap();

    criterion.bench_function("build archive (50 frames, 320x240)", |bencher| {
        bencher.iter(|| {
            black_box(archive::build_archive(&frames, "bench").unwrap());
        });
    });
}

fn benchmark_ffmpeg_seek(criterion: &mut Criterion) {
    framezip::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let mut media = FfmpegMedia::open(SAMPLE_VIDEO).unwrap();
    criterion.bench_function("seek and capture (mid-video)", |bencher| {
        bencher.iter(|| {
            media.seek(Duration::from_secs(5)).unwrap();
            black_box(media.capture(PixelFormat::Rgba8).unwrap());
        });
    });
}

fn benchmark_ffmpeg_sampling(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let limits = Limits::default();
    let mut group = criterion.benchmark_group("ffmpeg sampling");
    group.sample_size(10);

    for format in [PixelFormat::Rgb8, PixelFormat::Rgba8, PixelFormat::Gray8] {
        let options = ExtractOptions::new()
            .with_interval(2.0)
            .unwrap()
            .with_pixel_format(format);
        group.bench_function(format!("{format:?}"), |bencher| {
            bencher.iter(|| {
                let mut media = FfmpegMedia::open(SAMPLE_VIDEO).unwrap();
                black_box(sampler::sample(&mut media, &options, &limits).unwrap());
            });
        });
    }

    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_synthetic_sampling,
    benchmark_archive_assembly,
    benchmark_ffmpeg_seek,
    benchmark_ffmpeg_sampling,
);
criterion::criterion_main!(benches);
