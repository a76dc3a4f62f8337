//! Archive assembly integration tests.
//!
//! Archives are read back with `zip::ZipArchive` to check their layout.

use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use framezip::{
    ExtractOptions, Frame, Limits, OperationType, ProgressCallback, ProgressInfo, Session,
    SourceCandidate, SyntheticMedia, archive, sampler,
};
use zip::ZipArchive;

fn frames(seconds: u64, interval_seconds: f64) -> Vec<Frame> {
    let mut media = SyntheticMedia::new(Duration::from_secs(seconds), 6, 4);
    let options = ExtractOptions::new().with_interval(interval_seconds).unwrap();
    sampler::sample(&mut media, &options, &Limits::default()).unwrap()
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut reader = ZipArchive::new(Cursor::new(bytes)).expect("archive should be readable");
    (0..reader.len())
        .map(|index| reader.by_index(index).unwrap().name().to_string())
        .collect()
}

#[test]
fn five_frame_run_end_to_end() {
    let frames = frames(10, 2.0);
    let archive = archive::build_archive(&frames, "holiday").unwrap().unwrap();

    assert_eq!(archive.file_name(), "holiday.zip");
    assert_eq!(archive.entry_count(), 5);

    let names = entry_names(archive.bytes());
    assert_eq!(
        names,
        vec![
            "frames/",
            "frames/frame_1_0.00s.png",
            "frames/frame_2_2.00s.png",
            "frames/frame_3_4.00s.png",
            "frames/frame_4_6.00s.png",
            "frames/frame_5_8.00s.png",
        ]
    );
}

#[test]
fn entries_hold_the_frame_pngs() {
    let frames = frames(3, 1.0);
    let archive = archive::build_archive(&frames, "clip").unwrap().unwrap();
    let mut reader = ZipArchive::new(Cursor::new(archive.bytes())).unwrap();

    for frame in &frames {
        let mut entry = reader
            .by_name(&format!("frames/{}", frame.file_name()))
            .expect("entry should exist");
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, frame.png_bytes());

        let picture = image::load_from_memory(&contents).unwrap();
        assert_eq!((picture.width(), picture.height()), (6, 4));
    }
}

#[test]
fn archive_name_is_sanitized() {
    let frames = frames(1, 1.0);
    let cases = [
        ("../../etc/passwd", "______etc_passwd.zip"),
        ("my clip", "my_clip.zip"),
        ("", "extracted_frames.zip"),
        ("/// ...", "extracted_frames.zip"),
    ];
    for (base_name, expected) in cases {
        let archive = archive::build_archive(&frames, base_name).unwrap().unwrap();
        assert_eq!(archive.file_name(), expected, "{base_name:?}");
    }

    let long_name = "n".repeat(300);
    let archive = archive::build_archive(&frames, &long_name).unwrap().unwrap();
    assert_eq!(archive.file_name().len(), 100 + ".zip".len());
}

#[test]
fn fractional_timestamps_use_two_decimals() {
    let frames = frames(1, 0.3);
    let archive = archive::build_archive(&frames, "fractions").unwrap().unwrap();
    let names = entry_names(archive.bytes());
    assert_eq!(
        &names[1..],
        &[
            "frames/frame_1_0.00s.png",
            "frames/frame_2_0.30s.png",
            "frames/frame_3_0.60s.png",
            "frames/frame_4_0.90s.png",
        ]
    );
}

#[test]
fn empty_run_offers_no_archive() {
    assert!(archive::build_archive(&[], "nothing").unwrap().is_none());

    let empty = frames(0, 1.0);
    assert!(empty.is_empty());
    assert!(archive::build_archive(&empty, "nothing").unwrap().is_none());
}

#[test]
fn save_in_writes_and_overwrites() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let archive = archive::build_archive(&frames(2, 1.0), "saved").unwrap().unwrap();

    std::fs::write(directory.path().join("saved.zip"), b"stale").unwrap();
    let path = archive.save_in(directory.path()).unwrap();

    assert_eq!(path, directory.path().join("saved.zip"));
    assert_eq!(std::fs::read(&path).unwrap(), archive.bytes());
}

#[derive(Default)]
struct RecordingProgress {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

#[test]
fn session_archive_uses_name_and_reports_progress() {
    let recorder = Arc::new(RecordingProgress::default());
    let mut session = Session::new();
    session.set_options(ExtractOptions::new().with_progress(recorder.clone()));
    session.set_archive_name("session output");
    session
        .load_media(
            SourceCandidate::new("clip.ogg", 1024, Some("video/ogg")),
            Box::new(SyntheticMedia::new(Duration::from_secs(4), 4, 4)),
        )
        .unwrap();

    assert!(session.archive().unwrap().is_none(), "no run yet");

    session.extract().unwrap();
    let archive = session.archive().unwrap().unwrap();
    assert_eq!(archive.file_name(), "session_output.zip");
    assert_eq!(archive.entry_count(), 4);

    let infos = recorder.infos.lock().unwrap();
    let assembly: Vec<&ProgressInfo> = infos
        .iter()
        .filter(|info| info.operation == OperationType::ArchiveAssembly)
        .collect();
    assert_eq!(assembly.len(), 4);
    assert_eq!(assembly.last().unwrap().percentage, 100);
}
