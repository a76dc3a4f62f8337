//! Error types for the `framezip` crate.
//!
//! This module defines [`FramezipError`], the unified error type returned by
//! all fallible operations in the crate, and [`ErrorCategory`], which groups
//! the variants by how a caller is expected to react to them.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;
use zip::result::ZipError;

/// How a failure relates to the session that produced it.
///
/// Every category leaves the session in a stable, retryable state; none of
/// them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The candidate source was refused before any processing. Previously
    /// loaded state is kept.
    RejectedInput,
    /// A pre-flight ceiling (duration or frame count) would be exceeded, so
    /// the run never started.
    LimitExceeded,
    /// A run started and failed part-way; the session is back to idle.
    RunFailure,
    /// A setting or selection was out of range and was not applied.
    InvalidSetting,
    /// A lower-level failure (I/O, codec, archive) outside a run.
    Internal,
}

/// The unified error type for all `framezip` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramezipError {
    /// The file is larger than the configured byte ceiling.
    #[error("File is too large ({size} bytes); choose a file of at most {max_size} bytes")]
    FileTooLarge {
        /// Size of the candidate file in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        max_size: u64,
    },

    /// The file name extension is not in the allowed set.
    #[error("Unsupported file extension {extension:?}; supported formats: {allowed}")]
    UnsupportedExtension {
        /// Lower-cased extension, empty when the name has none.
        extension: String,
        /// Human-readable list of accepted extensions.
        allowed: String,
    },

    /// The declared content type is not in the allowed set.
    #[error("File type check failed ({content_type}); choose a valid video file")]
    UnsupportedContentType {
        /// The declared type, or `"unknown"` when none was declared.
        content_type: String,
    },

    /// The media file could not be opened by the decoder.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the decoder.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// No source has been loaded into the session.
    #[error("No video loaded")]
    NoSource,

    /// The source is longer than the configured duration ceiling.
    #[error("Video is too long ({duration:?}); choose a video of at most {max_duration:?}")]
    DurationTooLong {
        /// Natural duration of the source.
        duration: Duration,
        /// Configured ceiling.
        max_duration: Duration,
    },

    /// The interval would produce more frames than the configured ceiling.
    #[error(
        "Too many frames to extract (estimated {estimated}, limit {max_frames}); \
         set the interval to at least {minimum_interval:.1} seconds"
    )]
    TooManyFrames {
        /// `ceil(duration / interval)`.
        estimated: u64,
        /// Configured frame ceiling.
        max_frames: u64,
        /// `duration / max_frames`, in seconds.
        minimum_interval: f64,
    },

    /// The sampling interval is not a number within the accepted range.
    #[error("Interval must be a number between {min} and {max} seconds (got {value})")]
    InvalidInterval {
        /// The rejected input, as typed.
        value: String,
        /// Lower bound in seconds.
        min: f64,
        /// Upper bound in seconds.
        max: f64,
    },

    /// A frame index outside the captured sequence was requested.
    #[error("Frame {index} is out of range (run has {frame_count} frames)")]
    FrameOutOfRange {
        /// The requested 0-based index.
        index: usize,
        /// Number of captured frames.
        frame_count: usize,
    },

    /// A run failed after it started. The cause is kept as the error source.
    #[error("An error occurred while extracting frames; please try again with a different video")]
    RunFailed(#[source] Box<FramezipError>),

    /// A video frame could not be decoded or rasterized.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// An error from the `zip` crate while assembling the archive.
    #[error("Archive error: {0}")]
    ArchiveError(#[from] ZipError),
}

impl FramezipError {
    /// Classify this error.
    ///
    /// # Example
    ///
    /// ```
    /// use framezip::{ErrorCategory, FramezipError};
    ///
    /// let error = FramezipError::FileTooLarge { size: 10, max_size: 5 };
    /// assert_eq!(error.category(), ErrorCategory::RejectedInput);
    /// ```
    pub fn category(&self) -> ErrorCategory {
        match self {
            FramezipError::FileTooLarge { .. }
            | FramezipError::UnsupportedExtension { .. }
            | FramezipError::UnsupportedContentType { .. }
            | FramezipError::FileOpen { .. }
            | FramezipError::NoVideoStream => ErrorCategory::RejectedInput,
            FramezipError::DurationTooLong { .. } | FramezipError::TooManyFrames { .. } => {
                ErrorCategory::LimitExceeded
            }
            FramezipError::RunFailed(_) => ErrorCategory::RunFailure,
            FramezipError::NoSource
            | FramezipError::InvalidInterval { .. }
            | FramezipError::FrameOutOfRange { .. } => ErrorCategory::InvalidSetting,
            FramezipError::VideoDecodeError(_)
            | FramezipError::FfmpegError(_)
            | FramezipError::IoError(_)
            | FramezipError::ImageError(_)
            | FramezipError::ArchiveError(_) => ErrorCategory::Internal,
        }
    }
}

impl From<FfmpegError> for FramezipError {
    fn from(error: FfmpegError) -> Self {
        FramezipError::FfmpegError(error.to_string())
    }
}
