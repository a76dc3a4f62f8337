//! The sampling engine: seek, capture, collect.
//!
//! [`sample`] walks the timeline of a [`MediaElement`] at a fixed interval
//! and returns one [`Frame`] per stop. A pre-flight check rejects runs whose
//! duration or projected frame count exceed the configured [`Limits`]
//! before anything is captured.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use framezip::{ExtractOptions, Limits, SyntheticMedia, sampler};
//!
//! let mut media = SyntheticMedia::new(Duration::from_secs(10), 16, 9);
//! let options = ExtractOptions::new().with_interval(2.0)?;
//! let frames = sampler::sample(&mut media, &options, &Limits::default())?;
//! assert_eq!(frames.len(), 5);
//! assert_eq!(frames[4].timestamp(), Duration::from_secs(8));
//! # Ok::<(), framezip::FramezipError>(())
//! ```

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use image::imageops::FilterType;

use crate::{
    configuration::{ExtractOptions, Limits},
    error::FramezipError,
    frame::Frame,
    media::MediaElement,
    progress::{OperationType, ProgressTracker},
};

/// `ceil(duration / interval)`, the number of stops a run would make
/// without a frame ceiling.
///
/// Computed in whole nanoseconds so it agrees with the `interval * k` stops
/// taken by [`sample`].
pub fn planned_frame_count(duration: Duration, interval: Duration) -> u64 {
    if interval.is_zero() {
        return u64::MAX;
    }
    let stops = duration.as_nanos().div_ceil(interval.as_nanos());
    u64::try_from(stops).unwrap_or(u64::MAX)
}

/// Smallest interval, in seconds, that keeps `duration` within
/// `max_frames` captures.
pub fn minimum_interval(duration: Duration, max_frames: u64) -> f64 {
    duration.as_secs_f64() / max_frames.max(1) as f64
}

/// `min(round(position / duration * 100), 100)`.
pub fn progress_percentage(position: Duration, duration: Duration) -> u8 {
    if duration.is_zero() {
        return 100;
    }
    let percentage = (position.as_secs_f64() / duration.as_secs_f64() * 100.0).round();
    percentage.clamp(0.0, 100.0) as u8
}

/// Check duration and projected frame count against `limits`.
///
/// Returns the number of frames the run will capture.
///
/// # Errors
///
/// - [`FramezipError::DurationTooLong`] if `duration` exceeds the ceiling.
/// - [`FramezipError::TooManyFrames`] if `ceil(duration / interval)`
///   exceeds the frame ceiling; the error carries `duration / max_frames`
///   as the minimum workable interval.
pub fn preflight(
    duration: Duration,
    interval: Duration,
    limits: &Limits,
) -> Result<u64, FramezipError> {
    if duration > limits.max_duration {
        log::warn!(
            "Rejecting run: duration {:.2}s exceeds {:.2}s",
            duration.as_secs_f64(),
            limits.max_duration.as_secs_f64(),
        );
        return Err(FramezipError::DurationTooLong {
            duration,
            max_duration: limits.max_duration,
        });
    }

    let estimated = planned_frame_count(duration, interval);
    if estimated > limits.max_frames {
        let minimum_interval = minimum_interval(duration, limits.max_frames);
        log::warn!(
            "Rejecting run: {estimated} frames at {:.2}s interval exceed {} (minimum interval {minimum_interval:.1}s)",
            interval.as_secs_f64(),
            limits.max_frames,
        );
        return Err(FramezipError::TooManyFrames {
            estimated,
            max_frames: limits.max_frames,
            minimum_interval,
        });
    }

    Ok(estimated)
}

/// Returns the playhead to the start when dropped, whichever way the run
/// ends.
struct PlayheadReset<'a, M: MediaElement + ?Sized> {
    media: &'a mut M,
}

impl<M: MediaElement + ?Sized> Drop for PlayheadReset<'_, M> {
    fn drop(&mut self) {
        if let Err(error) = self.media.seek(Duration::ZERO) {
            log::warn!("Failed to reset playhead: {error}");
        }
    }
}

impl<M: MediaElement + ?Sized> Deref for PlayheadReset<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.media
    }
}

impl<M: MediaElement + ?Sized> DerefMut for PlayheadReset<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.media
    }
}

/// Capture one frame every `options.interval()` from `media`.
///
/// Stops are at `k * interval` for `k = 0, 1, ...` while the stop lies
/// before the end of the media and fewer than `limits.max_frames` frames
/// have been taken. Each stop seeks, waits for the picture, rasterizes it at
/// the source's natural dimensions, and encodes it as PNG. The playhead is
/// back at zero when this returns, on success and on error.
///
/// # Errors
///
/// Pre-flight errors from [`preflight`] (nothing is captured), or the
/// first seek, capture, or encode error.
pub fn sample<M: MediaElement + ?Sized>(
    media: &mut M,
    options: &ExtractOptions,
    limits: &Limits,
) -> Result<Vec<Frame>, FramezipError> {
    let duration = media.duration();
    let interval = options.interval();
    let (width, height) = media.dimensions();

    let planned = preflight(duration, interval, limits)?;
    let count = planned.min(limits.max_frames);

    log::debug!(
        "Sampling {count} frames every {:.2}s from {:.2}s of {width}x{height} video",
        interval.as_secs_f64(),
        duration.as_secs_f64(),
    );

    let mut media = PlayheadReset { media };
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::FrameExtraction,
        Some(count),
        options.batch_size,
    );
    let mut frames = Vec::with_capacity(count as usize);

    for index in 0..count {
        let timestamp = interval * index as u32;
        if timestamp >= duration {
            break;
        }

        media.seek(timestamp)?;
        let mut picture = media.capture(options.pixel_format())?;
        if (picture.width(), picture.height()) != (width, height) {
            picture = picture.resize_exact(width, height, FilterType::Triangle);
        }
        frames.push(Frame::encode(index as usize, timestamp, &picture)?);

        let next_position = interval * (index as u32 + 1);
        tracker.advance(progress_percentage(next_position, duration), Some(timestamp));
    }
    tracker.finish();

    log::info!("Captured {} frames", frames.len());
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    #[test]
    fn planned_count_rounds_up() {
        assert_eq!(planned_frame_count(seconds(10.0), seconds(2.0)), 5);
        assert_eq!(planned_frame_count(seconds(10.0), seconds(3.0)), 4);
        assert_eq!(planned_frame_count(seconds(1.0), seconds(0.1)), 10);
        assert_eq!(planned_frame_count(Duration::ZERO, seconds(1.0)), 0);
    }

    #[test]
    fn planned_count_is_exact_at_the_frame_ceiling() {
        let cases = [(700, 700), (1400, 1400), (1050, 1050), (70, 70)];
        for (duration_seconds, interval_millis) in cases {
            let duration = Duration::from_secs(duration_seconds);
            let interval = Duration::from_millis(interval_millis);
            assert_eq!(planned_frame_count(duration, interval), 1000);
            assert_eq!(preflight(duration, interval, &Limits::default()).unwrap(), 1000);
        }
        assert_eq!(planned_frame_count(Duration::from_millis(700_001), Duration::from_millis(700)), 1001);
    }

    #[test]
    fn percentage_is_rounded_and_capped() {
        let duration = seconds(10.0);
        assert_eq!(progress_percentage(seconds(3.333), duration), 33);
        assert_eq!(progress_percentage(seconds(6.66), duration), 67);
        assert_eq!(progress_percentage(seconds(12.0), duration), 100);
        assert_eq!(progress_percentage(seconds(1.0), Duration::ZERO), 100);
    }

    #[test]
    fn preflight_reports_minimum_interval() {
        let limits = Limits::default();
        let error = preflight(seconds(1500.0), seconds(1.0), &limits).unwrap_err();
        match error {
            FramezipError::TooManyFrames {
                estimated,
                max_frames,
                minimum_interval,
            } => {
                assert_eq!(estimated, 1500);
                assert_eq!(max_frames, 1000);
                assert!((minimum_interval - 1.5).abs() < 1e-9);
            }
            other => panic!("Expected TooManyFrames, got: {other}"),
        }
    }

    #[test]
    fn preflight_rejects_long_sources_first() {
        let error = preflight(seconds(1800.5), seconds(60.0), &Limits::default()).unwrap_err();
        assert!(matches!(error, FramezipError::DurationTooLong { .. }));
        assert_eq!(preflight(seconds(1800.0), seconds(2.0), &Limits::default()).unwrap(), 900);
    }
}
