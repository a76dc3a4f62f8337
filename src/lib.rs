//! # framezip
//!
//! Sample still frames from a video at a fixed interval and bundle them as a
//! zip archive.
//!
//! `framezip` validates a candidate video (size, extension, declared type),
//! walks its timeline every N seconds, rasterizes the picture at each stop
//! into a lossless PNG, and packs the results as
//! `frames/frame_<n>_<t>s.png` entries of a single archive. Decoding is
//! powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framezip::Session;
//!
//! let mut session = Session::new();
//! session.load_path("input.mp4")?;
//! session.set_interval("2.5")?;
//! let frames = session.extract()?;
//! println!("captured {} frames", frames.len());
//!
//! if let Some(archive) = session.archive()? {
//!     let path = archive.save_in(".")?;
//!     println!("wrote {}", path.display());
//! }
//! # Ok::<(), framezip::FramezipError>(())
//! ```
//!
//! ### Without a session
//!
//! The building blocks are usable on their own. Any [`MediaElement`] can be
//! sampled; [`SyntheticMedia`] produces deterministic pictures without
//! touching FFmpeg.
//!
//! ```
//! use std::time::Duration;
//!
//! use framezip::{ExtractOptions, Limits, SyntheticMedia, archive, sampler};
//!
//! let mut media = SyntheticMedia::new(Duration::from_millis(2500), 32, 18);
//! let options = ExtractOptions::new().with_interval(1.0)?;
//! let frames = sampler::sample(&mut media, &options, &Limits::default())?;
//!
//! let names: Vec<String> = frames.iter().map(|frame| frame.file_name()).collect();
//! assert_eq!(names, ["frame_1_0.00s.png", "frame_2_1.00s.png", "frame_3_2.00s.png"]);
//!
//! let archive = archive::build_archive(&frames, "clip")?;
//! assert!(archive.is_some());
//! # Ok::<(), framezip::FramezipError>(())
//! ```
//!
//! ## Features
//!
//! - **Input validation**: byte ceiling, extension and content-type allow
//!   lists, with actionable error messages
//! - **Pre-flight limits**: duration and projected frame-count ceilings
//!   checked before anything is captured, reporting the minimum workable
//!   interval
//! - **Interval sampling**: frame `k` is taken at exactly `(k - 1) * interval`
//! - **Progress reporting**: cooperative callbacks during capture and
//!   archive assembly
//! - **Archive assembly**: deflated zip with a sanitized file name
//! - **Lightbox navigation**: open, step and close over captured frames
//!   without wraparound
//! - **Inspection**: a full [`ValidationReport`] without loading the source
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod archive;
pub mod configuration;
mod conversion;
pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod lightbox;
pub mod media;
pub mod metadata;
pub mod progress;
pub mod sampler;
pub mod session;
pub mod source;
pub mod validation;

pub use archive::Archive;
pub use configuration::{ExtractOptions, Limits, PixelFormat};
pub use error::{ErrorCategory, FramezipError};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::Frame;
pub use lightbox::Lightbox;
pub use media::{FfmpegMedia, MediaElement, SyntheticMedia};
pub use metadata::{MediaMetadata, VideoMetadata};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use session::{LoadedSource, RunState, Session};
pub use source::SourceCandidate;
pub use validation::ValidationReport;
