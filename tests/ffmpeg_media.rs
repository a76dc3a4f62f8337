//! FFmpeg-backed extraction tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use framezip::{
    ExtractOptions, FfmpegMedia, Limits, MediaElement, PixelFormat, RunState, Session,
    SourceCandidate, sampler, validation,
};
use zip::ZipArchive;

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn open_reads_metadata() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let media = FfmpegMedia::open(path).expect("Failed to open fixture");
    let video = media.metadata().video.as_ref().expect("fixture has video");
    assert_eq!((video.width, video.height), (320, 240));
    assert!((video.frames_per_second - 25.0).abs() < 0.01);

    let seconds = media.duration().as_secs_f64();
    assert!((seconds - 10.0).abs() < 0.2, "duration was {seconds}");
    assert_eq!(media.position(), Duration::ZERO);
}

#[test]
fn seek_and_capture_at_natural_size() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = FfmpegMedia::open(path).expect("Failed to open fixture");
    for seconds in [0, 3, 9] {
        media.seek(Duration::from_secs(seconds)).unwrap();
        for format in [PixelFormat::Rgb8, PixelFormat::Rgba8, PixelFormat::Gray8] {
            let picture = media.capture(format).unwrap();
            assert_eq!((picture.width(), picture.height()), (320, 240));
        }
    }
}

#[test]
fn seeking_backwards_works() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = FfmpegMedia::open(path).expect("Failed to open fixture");
    media.seek(Duration::from_secs(8)).unwrap();
    let late = media.capture(PixelFormat::Rgb8).unwrap().to_rgb8();
    media.seek(Duration::from_secs(1)).unwrap();
    let early = media.capture(PixelFormat::Rgb8).unwrap().to_rgb8();

    assert_eq!(media.position(), Duration::from_secs(1));
    assert_ne!(late.as_raw(), early.as_raw());
}

#[test]
fn sample_whole_fixture() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = FfmpegMedia::open(path).expect("Failed to open fixture");
    let options = ExtractOptions::new().with_interval(2.0).unwrap();
    let frames = sampler::sample(&mut media, &options, &Limits::default()).unwrap();

    let planned = sampler::planned_frame_count(media.duration(), options.interval());
    assert_eq!(frames.len() as u64, planned);
    assert_eq!(frames[2].timestamp(), Duration::from_secs(4));
    assert!(frames.iter().all(|frame| frame.dimensions() == (320, 240)));
    assert_eq!(media.position(), Duration::ZERO);
}

#[test]
fn session_end_to_end() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut session = Session::new();
    session.load_path(path).expect("Failed to load fixture");
    session.set_interval("2.5").unwrap();
    session.set_archive_name("sample video");
    session.extract().unwrap();
    assert_eq!(session.state(), RunState::Complete);
    assert!(session.frames().len() >= 4);

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let archive = session.archive().unwrap().expect("frames were captured");
    let saved = archive.save_in(directory.path()).unwrap();
    assert_eq!(saved.file_name().unwrap(), "sample_video.zip");

    let bytes = std::fs::read(saved).unwrap();
    let mut reader = ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert!(reader.by_name("frames/frame_4_7.50s.png").is_ok());
}

#[test]
fn inspect_fixture() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let candidate = SourceCandidate::from_path(path).unwrap();
    assert_eq!(candidate.content_type.as_deref(), Some("video/mp4"));

    let media = FfmpegMedia::open(path).expect("Failed to open fixture");
    let report = validation::inspect(
        &candidate,
        Some(media.metadata()),
        Duration::from_secs(1),
        &Limits::default(),
    );
    assert!(report.is_valid(), "{report}");
    assert!(report.info.iter().any(|line| line.contains("Video:")));
    assert!(report.info.iter().any(|line| line.contains("frames at 1.0s interval")));
}
