//! Media elements: the seekable, capturable picture source behind a session.
//!
//! [`MediaElement`] is the seam between the sampling engine and whatever
//! decodes the video. [`FfmpegMedia`] decodes real files through
//! `ffmpeg-next`; [`SyntheticMedia`] renders deterministic pictures and is
//! used for tests and benchmarks where no fixture file is available.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, GrayImage, Rgb, RgbImage, RgbaImage};

use crate::{
    configuration::PixelFormat,
    conversion,
    error::FramezipError,
    metadata::{MediaMetadata, VideoMetadata},
};

/// A seekable video whose currently displayed picture can be captured.
///
/// Calls are strictly sequential: [`seek`](MediaElement::seek) returns only
/// once the picture at the new position is ready, and
/// [`capture`](MediaElement::capture) always reads the picture selected by
/// the most recent seek.
pub trait MediaElement {
    /// Metadata read when the media was opened.
    fn metadata(&self) -> &MediaMetadata;

    /// Natural duration.
    fn duration(&self) -> Duration {
        self.metadata().duration
    }

    /// Natural pixel dimensions `(width, height)`.
    fn dimensions(&self) -> (u32, u32) {
        self.metadata().dimensions()
    }

    /// Current playhead position.
    fn position(&self) -> Duration;

    /// Move the playhead to `position` and block until the picture there is
    /// ready to capture.
    fn seek(&mut self, position: Duration) -> Result<(), FramezipError>;

    /// Rasterize the currently displayed picture at natural dimensions.
    fn capture(&mut self, format: PixelFormat) -> Result<DynamicImage, FramezipError>;
}

/// FFmpeg-backed media element.
///
/// Holds the demuxer and a persistent decoder. Every seek jumps to the
/// nearest keyframe before the target and decodes forward until the picture
/// covering the target is reached.
pub struct FfmpegMedia {
    input_context: Input,
    decoder: VideoDecoder,
    video_stream_index: usize,
    time_base: Rational,
    metadata: MediaMetadata,
    path: PathBuf,
    position: Duration,
    current_frame: Option<VideoFrame>,
}

impl Debug for FfmpegMedia {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegMedia")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl FfmpegMedia {
    /// Open a media file and read its video metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FramezipError::FileOpen`] if FFmpeg cannot open or decode
    /// the file, or [`FramezipError::NoVideoStream`] if it has no video.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use framezip::{FfmpegMedia, MediaElement};
    ///
    /// let media = FfmpegMedia::open("input.mp4")?;
    /// println!("{:?} {:?}", media.duration(), media.dimensions());
    /// # Ok::<(), framezip::FramezipError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramezipError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |reason: String| FramezipError::FileOpen {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening media file: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FramezipError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(|error| {
            open_error(format!("Failed to read video codec parameters: {error}"))
        })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let mut frames_per_second = conversion::rational_to_fps(stream.avg_frame_rate());
        if frames_per_second == 0.0 {
            frames_per_second = conversion::rational_to_fps(stream.rate());
        }
        let frame_count = (duration.as_secs_f64() * frames_per_second) as u64;

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = MediaMetadata {
            video: Some(VideoMetadata {
                width: decoder.width(),
                height: decoder.height(),
                frames_per_second,
                frame_count,
                codec,
            }),
            duration,
            format: input_context.format().name().to_string(),
        };

        log::info!(
            "Opened media file: {} (format={}, duration={:.2}s, {}x{} @ {:.2} fps)",
            path.display(),
            metadata.format,
            duration.as_secs_f64(),
            decoder.width(),
            decoder.height(),
            frames_per_second,
        );

        Ok(Self {
            input_context,
            decoder,
            video_stream_index,
            time_base,
            metadata,
            path,
            position: Duration::ZERO,
            current_frame: None,
        })
    }

    /// Path the media was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Half a frame period in seconds, used to accept a picture whose
    /// timestamp rounds onto the target.
    fn half_frame_seconds(&self) -> f64 {
        match &self.metadata.video {
            Some(video) if video.frames_per_second > 0.0 => 0.5 / video.frames_per_second,
            _ => 0.0,
        }
    }
}

impl MediaElement for FfmpegMedia {
    fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn seek(&mut self, position: Duration) -> Result<(), FramezipError> {
        let target_seconds = position.as_secs_f64();
        let tolerance = self.half_frame_seconds();
        let seek_timestamp = conversion::duration_to_seek_timestamp(position);

        log::debug!("Seeking {} to {:.3}s", self.path.display(), target_seconds);

        self.input_context.seek(seek_timestamp, ..seek_timestamp)?;
        self.decoder.flush();

        let mut decoded_frame = VideoFrame::empty();
        let mut previous_frame: Option<VideoFrame> = None;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            self.decoder.send_packet(&packet)?;

            while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame
                    .timestamp()
                    .or_else(|| decoded_frame.pts())
                    .unwrap_or(0);
                let seconds = conversion::pts_to_seconds(pts, self.time_base);

                if seconds + tolerance >= target_seconds {
                    self.current_frame = Some(decoded_frame);
                    self.position = position;
                    return Ok(());
                }
                previous_frame = Some(std::mem::replace(&mut decoded_frame, VideoFrame::empty()));
            }
        }

        // Past the last packet: drain the decoder, then fall back to the
        // final picture, which is what stays on screen at the very end.
        self.decoder.send_eof()?;
        while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame
                .timestamp()
                .or_else(|| decoded_frame.pts())
                .unwrap_or(0);
            let seconds = conversion::pts_to_seconds(pts, self.time_base);

            if seconds + tolerance >= target_seconds {
                self.current_frame = Some(decoded_frame);
                self.position = position;
                return Ok(());
            }
            previous_frame = Some(std::mem::replace(&mut decoded_frame, VideoFrame::empty()));
        }

        match previous_frame {
            Some(frame) => {
                self.current_frame = Some(frame);
                self.position = position;
                Ok(())
            }
            None => Err(FramezipError::VideoDecodeError(format!(
                "No picture could be decoded at {target_seconds:.3}s"
            ))),
        }
    }

    fn capture(&mut self, format: PixelFormat) -> Result<DynamicImage, FramezipError> {
        let decoded_frame = self.current_frame.as_ref().ok_or_else(|| {
            FramezipError::VideoDecodeError("No picture has been decoded yet".to_string())
        })?;
        let (width, height) = self.metadata.dimensions();

        let mut scaler = ScalingContext::get(
            decoded_frame.format(),
            decoded_frame.width(),
            decoded_frame.height(),
            format.to_ffmpeg_pixel(),
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;
        let mut converted_frame = VideoFrame::empty();
        scaler.run(decoded_frame, &mut converted_frame)?;

        let buffer =
            conversion::frame_to_buffer(&converted_frame, width, height, format.bytes_per_pixel());
        buffer_to_image(buffer, width, height, format)
    }
}

fn buffer_to_image(
    buffer: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<DynamicImage, FramezipError> {
    let image = match format {
        PixelFormat::Rgb8 => RgbImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8),
        PixelFormat::Rgba8 => {
            RgbaImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgba8)
        }
        PixelFormat::Gray8 => {
            GrayImage::from_raw(width, height, buffer).map(DynamicImage::ImageLuma8)
        }
    };
    image.ok_or_else(|| {
        FramezipError::VideoDecodeError(
            "Failed to construct image from decoded frame data".to_string(),
        )
    })
}

/// Deterministic media element that renders a picture derived from the
/// playhead position.
///
/// Every pixel of the captured picture has the colour returned by
/// [`SyntheticMedia::colour_at`], so tests can tell which position a frame
/// was captured at. A failure can be injected at a chosen capture.
///
/// ```
/// use std::time::Duration;
///
/// use framezip::{MediaElement, PixelFormat, SyntheticMedia};
///
/// let mut media = SyntheticMedia::new(Duration::from_secs(10), 32, 18);
/// media.seek(Duration::from_secs(2))?;
/// let picture = media.capture(PixelFormat::Rgb8)?;
/// assert_eq!((picture.width(), picture.height()), (32, 18));
/// # Ok::<(), framezip::FramezipError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticMedia {
    metadata: MediaMetadata,
    position: Duration,
    seek_history: Vec<Duration>,
    capture_count: usize,
    fail_at_capture: Option<usize>,
}

impl SyntheticMedia {
    /// A synthetic 30 fps video of the given duration and dimensions.
    pub fn new(duration: Duration, width: u32, height: u32) -> Self {
        let frames_per_second = 30.0;
        Self {
            metadata: MediaMetadata {
                video: Some(VideoMetadata {
                    width,
                    height,
                    frames_per_second,
                    frame_count: (duration.as_secs_f64() * frames_per_second) as u64,
                    codec: "synthetic".to_string(),
                }),
                duration,
                format: "synthetic".to_string(),
            },
            position: Duration::ZERO,
            seek_history: Vec::new(),
            capture_count: 0,
            fail_at_capture: None,
        }
    }

    /// A synthetic source with no video stream.
    pub fn audio_only(duration: Duration) -> Self {
        let mut media = Self::new(duration, 0, 0);
        media.metadata.video = None;
        media
    }

    /// Make the capture with this 0-based ordinal fail.
    #[must_use]
    pub fn failing_at_capture(mut self, ordinal: usize) -> Self {
        self.fail_at_capture = Some(ordinal);
        self
    }

    /// Every position passed to [`seek`](MediaElement::seek), in order.
    pub fn seek_history(&self) -> &[Duration] {
        &self.seek_history
    }

    /// Number of captures attempted so far.
    pub fn capture_count(&self) -> usize {
        self.capture_count
    }

    /// The colour rendered at `position`.
    pub fn colour_at(position: Duration) -> Rgb<u8> {
        let centiseconds = position.as_millis() / 10;
        Rgb([
            (centiseconds % 256) as u8,
            ((centiseconds / 256) % 256) as u8,
            0x80,
        ])
    }
}

impl MediaElement for SyntheticMedia {
    fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn seek(&mut self, position: Duration) -> Result<(), FramezipError> {
        self.seek_history.push(position);
        self.position = position.min(self.metadata.duration);
        Ok(())
    }

    fn capture(&mut self, format: PixelFormat) -> Result<DynamicImage, FramezipError> {
        let ordinal = self.capture_count;
        self.capture_count += 1;
        if self.fail_at_capture == Some(ordinal) {
            return Err(FramezipError::VideoDecodeError(format!(
                "synthetic failure at capture {ordinal}"
            )));
        }

        let (width, height) = self.dimensions();
        let picture = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Self::colour_at(self.position),
        ));
        Ok(match format {
            PixelFormat::Rgb8 => picture,
            PixelFormat::Rgba8 => DynamicImage::ImageRgba8(picture.to_rgba8()),
            PixelFormat::Gray8 => DynamicImage::ImageLuma8(picture.to_luma8()),
        })
    }
}
