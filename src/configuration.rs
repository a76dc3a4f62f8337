//! Extraction configuration.
//!
//! [`Limits`] holds the safety ceilings that guard input acceptance and
//! pre-flight checks. [`ExtractOptions`] is a builder that carries the
//! user-editable settings of a run (sampling interval and archive name)
//! together with operational settings such as the progress callback.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use framezip::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}%", info.percentage);
//!     }
//! }
//!
//! let options = ExtractOptions::new()
//!     .with_interval(2.0)?
//!     .with_archive_name("holiday")
//!     .with_progress(Arc::new(LogProgress));
//! assert_eq!(options.interval().as_secs_f64(), 2.0);
//! # Ok::<(), framezip::FramezipError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use ffmpeg_next::format::Pixel;

use crate::error::FramezipError;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Largest accepted source file: 500 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;
/// Longest accepted source: 30 minutes.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(30 * 60);
/// Most frames a single run may capture.
pub const DEFAULT_MAX_FRAMES: u64 = 1000;
/// Accepted file name extensions, lower-case, without the dot.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov", "avi"];
/// Accepted declared content types.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "video/x-msvideo",
];

/// Smallest accepted sampling interval, in seconds.
pub const MIN_INTERVAL_SECONDS: f64 = 0.1;
/// Largest accepted sampling interval, in seconds.
pub const MAX_INTERVAL_SECONDS: f64 = 60.0;
/// Interval used until the user picks another one.
pub const DEFAULT_INTERVAL_SECONDS: f64 = 1.0;

/// Maximum archive base name length, in characters.
pub const MAX_ARCHIVE_NAME_LENGTH: usize = 100;
/// Archive base name used when the sanitized name is unusable.
pub const DEFAULT_ARCHIVE_NAME: &str = "extracted_frames";

/// Pixel layout of the rasterized picture before PNG encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB (24 bpp).
    Rgb8,
    /// 8-bit RGBA with opaque alpha (32 bpp), as a 2D canvas produces.
    #[default]
    Rgba8,
    /// 8-bit grayscale (8 bpp).
    Gray8,
}

impl PixelFormat {
    /// Map to the corresponding FFmpeg pixel format constant.
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Rgba8 => Pixel::RGBA,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }

    /// Bytes per pixel in a tightly packed buffer of this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Safety ceilings applied to sources and runs.
///
/// The defaults are 500 MiB, the five common browser-playable containers,
/// 30 minutes, and 1000 frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
    /// Accepted extensions, lower-case, without the dot.
    pub allowed_extensions: Vec<String>,
    /// Accepted declared content types, lower-case.
    pub allowed_content_types: Vec<String>,
    /// Longest accepted source.
    pub max_duration: Duration,
    /// Most frames one run may capture.
    pub max_frames: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|extension| extension.to_string())
                .collect(),
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|content_type| content_type.to_string())
                .collect(),
            max_duration: DEFAULT_MAX_DURATION,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl Limits {
    /// Default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file size ceiling in bytes.
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the duration ceiling.
    #[must_use]
    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = duration;
        self
    }

    /// Set the frame-count ceiling. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = frames.max(1);
        self
    }

    /// Replace the accepted extensions. Leading dots are stripped.
    #[must_use]
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|extension| extension.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Replace the accepted content types.
    #[must_use]
    pub fn with_allowed_content_types<I, S>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_content_types = content_types
            .into_iter()
            .map(|content_type| content_type.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// `"MP4, WEBM, OGG, MOV, AVI"` for the default limits.
    pub(crate) fn allowed_extensions_display(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|extension| extension.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Parse a typed interval, in seconds, and check it against the accepted
/// range.
///
/// # Errors
///
/// Returns [`FramezipError::InvalidInterval`] if `value` is not a finite
/// number within `[0.1, 60]`.
pub fn parse_interval(value: &str) -> Result<Duration, FramezipError> {
    let invalid = || FramezipError::InvalidInterval {
        value: value.to_string(),
        min: MIN_INTERVAL_SECONDS,
        max: MAX_INTERVAL_SECONDS,
    };
    let seconds = value.trim().parse::<f64>().map_err(|_| invalid())?;
    interval_from_seconds(seconds).ok_or_else(invalid)
}

/// `Some` when `seconds` is within the accepted interval range.
pub(crate) fn interval_from_seconds(seconds: f64) -> Option<Duration> {
    if seconds.is_finite() && (MIN_INTERVAL_SECONDS..=MAX_INTERVAL_SECONDS).contains(&seconds) {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

/// Truncate a typed archive name to [`MAX_ARCHIVE_NAME_LENGTH`] characters.
///
/// Character filtering happens later, when the archive is named.
pub(crate) fn truncate_archive_name(name: &str) -> String {
    name.chars().take(MAX_ARCHIVE_NAME_LENGTH).collect()
}

/// Settings for one extraction run.
///
/// The interval and archive name are the user-editable part; everything
/// else tunes reporting and rasterization.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) interval: Duration,
    pub(crate) archive_name: String,
    pub(crate) pixel_format: PixelFormat,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Fire the progress callback every N captures.
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("interval", &self.interval)
            .field("archive_name", &self.archive_name)
            .field("pixel_format", &self.pixel_format)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Defaults: 1 second interval, archive name `extracted_frames`, RGBA
    /// rasterization, no progress callback.
    pub fn new() -> Self {
        Self {
            interval: Duration::from_secs_f64(DEFAULT_INTERVAL_SECONDS),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            pixel_format: PixelFormat::default(),
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Set the sampling interval in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`FramezipError::InvalidInterval`] if `seconds` lies outside
    /// `[0.1, 60]` or is not finite.
    pub fn with_interval(mut self, seconds: f64) -> Result<Self, FramezipError> {
        self.interval =
            interval_from_seconds(seconds).ok_or_else(|| FramezipError::InvalidInterval {
                value: seconds.to_string(),
                min: MIN_INTERVAL_SECONDS,
                max: MAX_INTERVAL_SECONDS,
            })?;
        Ok(self)
    }

    /// Set the archive base name, truncated to 100 characters.
    #[must_use]
    pub fn with_archive_name(mut self, name: impl AsRef<str>) -> Self {
        self.archive_name = truncate_archive_name(name.as_ref());
        self
    }

    /// Set the pixel layout used before PNG encoding.
    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The archive base name as typed (truncated, not yet sanitized).
    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }

    /// The rasterization pixel layout.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }
}
