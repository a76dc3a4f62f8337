//! Input validation.
//!
//! [`validate_candidate`] is the gate every source passes before it is
//! opened: size, then extension, then declared content type. [`inspect`]
//! runs the same checks plus the media and pre-flight checks without
//! stopping at the first problem, and collects the findings in a
//! [`ValidationReport`].
//!
//! # Example
//!
//! ```
//! use framezip::{Limits, SourceCandidate, validation};
//!
//! let candidate = SourceCandidate::new("clip.mkv", 1024, Some("video/x-matroska"));
//! let error = validation::validate_candidate(&candidate, &Limits::default()).unwrap_err();
//! assert!(error.to_string().contains("Unsupported file extension"));
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::{
    configuration::Limits,
    error::FramezipError,
    metadata::MediaMetadata,
    sampler,
    source::SourceCandidate,
};

/// Accept or reject a candidate source.
///
/// # Errors
///
/// - [`FramezipError::FileTooLarge`] if the size exceeds the ceiling.
/// - [`FramezipError::UnsupportedExtension`] if the extension is not
///   allowed.
/// - [`FramezipError::UnsupportedContentType`] if the declared type is
///   missing or not allowed.
pub fn validate_candidate(
    candidate: &SourceCandidate,
    limits: &Limits,
) -> Result<(), FramezipError> {
    let result = check_size(candidate, limits)
        .and_then(|()| check_extension(candidate, limits))
        .and_then(|()| check_content_type(candidate, limits));
    if let Err(error) = &result {
        log::warn!("Rejected {}: {error}", candidate.name);
    }
    result
}

fn check_size(candidate: &SourceCandidate, limits: &Limits) -> Result<(), FramezipError> {
    if candidate.size > limits.max_file_size {
        return Err(FramezipError::FileTooLarge {
            size: candidate.size,
            max_size: limits.max_file_size,
        });
    }
    Ok(())
}

fn check_extension(candidate: &SourceCandidate, limits: &Limits) -> Result<(), FramezipError> {
    let extension = candidate.extension().unwrap_or_default();
    if !limits.allowed_extensions.contains(&extension) {
        return Err(FramezipError::UnsupportedExtension {
            extension,
            allowed: limits.allowed_extensions_display(),
        });
    }
    Ok(())
}

fn check_content_type(candidate: &SourceCandidate, limits: &Limits) -> Result<(), FramezipError> {
    let declared = candidate
        .content_type
        .as_deref()
        .map(str::to_ascii_lowercase);
    match declared {
        Some(content_type) if limits.allowed_content_types.contains(&content_type) => Ok(()),
        other => Err(FramezipError::UnsupportedContentType {
            content_type: other.unwrap_or_else(|| "unknown".to_string()),
        }),
    }
}

/// Findings about a source, grouped by severity.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Issues that do not block extraction.
    pub warnings: Vec<String>,
    /// Issues that will prevent loading or extraction.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// `true` if no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of findings (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Check a candidate and, when available, its metadata against `limits`
/// for a run at `interval`.
///
/// Unlike [`validate_candidate`], every check runs and all findings are
/// reported.
pub fn inspect(
    candidate: &SourceCandidate,
    metadata: Option<&MediaMetadata>,
    interval: Duration,
    limits: &Limits,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.info.push(format!(
        "File: {} ({} bytes, {})",
        candidate.name,
        candidate.size,
        candidate.content_type.as_deref().unwrap_or("unknown type"),
    ));
    for check in [check_size, check_extension, check_content_type] {
        if let Err(error) = check(candidate, limits) {
            report.errors.push(error.to_string());
        }
    }

    let Some(metadata) = metadata else {
        report
            .errors
            .push("Media could not be opened for decoding".to_string());
        return report;
    };

    match &metadata.video {
        None => report.errors.push("No video stream found".to_string()),
        Some(video) => {
            if video.width == 0 || video.height == 0 {
                report.errors.push(format!(
                    "Invalid video dimensions: {}×{}",
                    video.width, video.height,
                ));
            }
            if video.frames_per_second > 240.0 {
                report.warnings.push(format!(
                    "Unusually high frame rate ({:.1} fps); seeking may be slow",
                    video.frames_per_second,
                ));
            }
            report.info.push(format!(
                "Video: {} {}×{} @ {:.2} fps",
                video.codec, video.width, video.height, video.frames_per_second,
            ));
        }
    }

    if metadata.duration == Duration::ZERO {
        report
            .warnings
            .push("Media duration is zero; no frames would be captured".to_string());
    }

    match sampler::preflight(metadata.duration, interval, limits) {
        Ok(planned) => report.info.push(format!(
            "{planned} frames at {:.1}s interval",
            interval.as_secs_f64(),
        )),
        Err(error) => report.errors.push(error.to_string()),
    }

    report
}
