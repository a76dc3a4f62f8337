//! Media metadata types.
//!
//! Metadata is read once when a source is opened and cached for as long as
//! the source stays loaded.

use std::time::Duration;

/// Container-level and video stream metadata for a loaded source.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct MediaMetadata {
    /// Video stream metadata, if a video stream is present.
    pub video: Option<VideoMetadata>,
    /// Natural duration of the media.
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"avi"`).
    pub format: String,
}

/// Metadata for the video stream.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Natural frame width in pixels.
    pub width: u32,
    /// Natural frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame rate.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl MediaMetadata {
    /// Natural pixel dimensions, `(0, 0)` without a video stream.
    pub fn dimensions(&self) -> (u32, u32) {
        self.video
            .as_ref()
            .map_or((0, 0), |video| (video.width, video.height))
    }
}
