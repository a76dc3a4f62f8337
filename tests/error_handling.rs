//! Error handling integration tests.
//!
//! These tests verify that meaningful, actionable errors are returned for
//! the various failure conditions.

use std::{path::Path, time::Duration};

use framezip::{
    ErrorCategory, FfmpegMedia, FramezipError, Limits, Session, SourceCandidate, validation,
};

#[test]
fn open_nonexistent_file() {
    let result = FfmpegMedia::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = FfmpegMedia::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn load_path_of_missing_file() {
    let mut session = Session::new();
    let error = session.load_path("missing/clip.mp4").unwrap_err();
    assert!(matches!(error, FramezipError::FileOpen { .. }));
    assert_eq!(error.category(), ErrorCategory::RejectedInput);
    assert!(session.source().is_none());
}

#[test]
fn load_path_of_garbage_passes_validation_but_fails_to_open() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("garbage.webm");
    std::fs::write(&path, vec![0_u8; 4096]).expect("Failed to write file");

    let mut session = Session::new();
    let error = session.load_path(&path).unwrap_err();
    assert!(
        matches!(error, FramezipError::FileOpen { .. } | FramezipError::NoVideoStream),
        "Unexpected error: {error}"
    );
    assert!(session.source().is_none());
}

#[test]
fn candidate_without_path_cannot_be_opened() {
    let mut session = Session::new();
    let candidate = SourceCandidate::new("clip.mp4", 10, Some("video/mp4"));
    let error = session.load(candidate).unwrap_err();
    assert!(matches!(error, FramezipError::FileOpen { .. }));
}

#[test]
fn unsupported_extension_lists_supported_formats() {
    let candidate = SourceCandidate::new("notes.txt", 10, Some("text/plain"));
    let error = validation::validate_candidate(&candidate, &Limits::default()).unwrap_err();
    let message = error.to_string();
    assert!(
        message.contains("MP4, WEBM, OGG, MOV, AVI"),
        "Error should list supported formats: {message}"
    );
}

#[test]
fn missing_content_type_is_reported_as_unknown() {
    let candidate = SourceCandidate::new("clip.mp4", 10, None);
    let error = validation::validate_candidate(&candidate, &Limits::default()).unwrap_err();
    assert!(error.to_string().contains("unknown"), "{error}");
}

#[test]
fn too_many_frames_message_has_one_decimal() {
    let error = FramezipError::TooManyFrames {
        estimated: 1234,
        max_frames: 1000,
        minimum_interval: 1.2345,
    };
    let message = error.to_string();
    assert!(message.contains("at least 1.2 seconds"), "{message}");
}

#[test]
fn run_failure_keeps_its_cause() {
    let error = FramezipError::RunFailed(Box::new(FramezipError::VideoDecodeError(
        "corrupt packet".to_string(),
    )));
    assert_eq!(error.category(), ErrorCategory::RunFailure);
    assert!(!error.to_string().contains("corrupt packet"));

    let cause = std::error::Error::source(&error).expect("cause should be kept");
    assert!(cause.to_string().contains("corrupt packet"));
}

#[test]
fn duration_error_is_a_limit_violation() {
    let error = FramezipError::DurationTooLong {
        duration: Duration::from_secs(3600),
        max_duration: Duration::from_secs(1800),
    };
    assert_eq!(error.category(), ErrorCategory::LimitExceeded);
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let result = FfmpegMedia::open(path);
    assert!(matches!(result, Err(FramezipError::NoVideoStream)));
}
