//! The extraction session.
//!
//! A [`Session`] owns everything one user works with: the loaded source,
//! the run settings, the captured frames, and the lightbox. Replacing the
//! source or clearing the results drops what they supersede.
//!
//! # Example
//!
//! ```no_run
//! use framezip::Session;
//!
//! let mut session = Session::new();
//! session.load_path("input.mp4")?;
//! session.set_interval("2")?;
//! session.set_archive_name("holiday");
//! session.extract()?;
//!
//! if let Some(archive) = session.archive()? {
//!     archive.save_in(".")?;
//! }
//! # Ok::<(), framezip::FramezipError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::Path,
    time::Duration,
};

use crate::{
    archive::{self, Archive},
    configuration::{self, ExtractOptions, Limits},
    error::{ErrorCategory, FramezipError},
    frame::Frame,
    lightbox::Lightbox,
    media::{FfmpegMedia, MediaElement},
    metadata::MediaMetadata,
    sampler,
    source::SourceCandidate,
    validation,
};

/// Where the session is in its run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run in progress and no results on hand.
    #[default]
    Idle,
    /// A run is capturing frames.
    ///
    /// Only held while [`Session::extract`] borrows the session, so callers
    /// never observe it between calls. Live progress arrives through the
    /// [`ProgressCallback`](crate::ProgressCallback) set on
    /// [`ExtractOptions`].
    Running {
        /// Percentage at the start of the run.
        progress: u8,
    },
    /// The last run finished; its frames are available.
    Complete,
}

/// A validated, opened source owned by a session.
pub struct LoadedSource {
    candidate: SourceCandidate,
    media: Box<dyn MediaElement>,
}

impl LoadedSource {
    /// The file as it was selected.
    pub fn candidate(&self) -> &SourceCandidate {
        &self.candidate
    }

    /// Metadata read when the source was opened.
    pub fn metadata(&self) -> &MediaMetadata {
        self.media.metadata()
    }

    /// The media element behind this source.
    pub fn media(&self) -> &dyn MediaElement {
        self.media.as_ref()
    }
}

impl Debug for LoadedSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LoadedSource")
            .field("candidate", &self.candidate)
            .field("metadata", self.metadata())
            .finish_non_exhaustive()
    }
}

impl Drop for LoadedSource {
    fn drop(&mut self) {
        log::debug!("Released source {}", self.candidate.name);
    }
}

/// One user's working state.
pub struct Session {
    limits: Limits,
    options: ExtractOptions,
    source: Option<LoadedSource>,
    frames: Vec<Frame>,
    state: RunState,
    lightbox: Lightbox,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session")
            .field("limits", &self.limits)
            .field("options", &self.options)
            .field("source", &self.source)
            .field("frame_count", &self.frames.len())
            .field("state", &self.state)
            .field("lightbox", &self.lightbox)
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An empty session with default limits and settings.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// An empty session with custom limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            options: ExtractOptions::new(),
            source: None,
            frames: Vec::new(),
            state: RunState::Idle,
            lightbox: Lightbox::default(),
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Replace all run settings at once.
    pub fn set_options(&mut self, options: ExtractOptions) {
        self.options = options;
    }

    /// Apply a typed interval, in seconds.
    ///
    /// Input that does not parse or lies outside `[0.1, 60]` is rejected and
    /// the previous interval stays in effect.
    ///
    /// # Errors
    ///
    /// Returns [`FramezipError::InvalidInterval`] for rejected input.
    pub fn set_interval(&mut self, value: &str) -> Result<Duration, FramezipError> {
        let interval = configuration::parse_interval(value)?;
        self.options.interval = interval;
        Ok(interval)
    }

    /// Apply a typed archive base name, truncated to 100 characters.
    pub fn set_archive_name(&mut self, name: &str) {
        self.options.archive_name = configuration::truncate_archive_name(name);
    }

    /// Validate and open the file at `path`, replacing the current source.
    ///
    /// The declared content type is inferred from the extension.
    ///
    /// # Errors
    ///
    /// See [`load`](Session::load).
    pub fn load_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), FramezipError> {
        let candidate = SourceCandidate::from_path(path)?;
        self.load(candidate)
    }

    /// Validate and open `candidate`, replacing the current source.
    ///
    /// On any error the previous source, frames and selection are untouched.
    ///
    /// # Errors
    ///
    /// Validation errors from
    /// [`validate_candidate`](crate::validation::validate_candidate), then
    /// [`FramezipError::FileOpen`] or [`FramezipError::NoVideoStream`] if
    /// the file cannot be decoded.
    pub fn load(&mut self, candidate: SourceCandidate) -> Result<(), FramezipError> {
        validation::validate_candidate(&candidate, &self.limits)?;
        let path = candidate
            .path
            .clone()
            .ok_or_else(|| FramezipError::FileOpen {
                path: candidate.name.clone().into(),
                reason: "candidate has no path on disk".to_string(),
            })?;
        let media = FfmpegMedia::open(&path)?;
        self.adopt(candidate, Box::new(media));
        Ok(())
    }

    /// Validate `candidate` and adopt an already opened media element for
    /// it, replacing the current source.
    ///
    /// # Errors
    ///
    /// Validation errors, or [`FramezipError::NoVideoStream`] if `media`
    /// has no video. On error the previous state is untouched.
    pub fn load_media(
        &mut self,
        candidate: SourceCandidate,
        media: Box<dyn MediaElement>,
    ) -> Result<(), FramezipError> {
        validation::validate_candidate(&candidate, &self.limits)?;
        if media.metadata().video.is_none() {
            return Err(FramezipError::NoVideoStream);
        }
        self.adopt(candidate, media);
        Ok(())
    }

    fn adopt(&mut self, candidate: SourceCandidate, media: Box<dyn MediaElement>) {
        self.source = None;
        self.clear_results();
        log::info!(
            "Loaded {} ({} bytes, {:.2}s)",
            candidate.name,
            candidate.size,
            media.duration().as_secs_f64(),
        );
        self.source = Some(LoadedSource { candidate, media });
    }

    /// The loaded source, if any.
    pub fn source(&self) -> Option<&LoadedSource> {
        self.source.as_ref()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// 0 before a run or after a failed one, 100 once complete.
    ///
    /// Percentages during a run go to the options' progress callback.
    pub fn progress(&self) -> u8 {
        match self.state {
            RunState::Idle => 0,
            RunState::Running { progress } => progress,
            RunState::Complete => 100,
        }
    }

    /// Frames of the last completed run.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Run the sampling engine over the loaded source.
    ///
    /// Earlier results are discarded first. On success the session is
    /// [`RunState::Complete`]; on any error it is back to
    /// [`RunState::Idle`]. Either way the source's playhead is at zero.
    /// Progress is reported to the callback in [`Session::options`] as
    /// [`OperationType::FrameExtraction`](crate::OperationType::FrameExtraction).
    ///
    /// # Errors
    ///
    /// - [`FramezipError::NoSource`] if nothing is loaded.
    /// - [`FramezipError::DurationTooLong`] / [`FramezipError::TooManyFrames`]
    ///   from the pre-flight check; nothing was captured.
    /// - [`FramezipError::RunFailed`] wrapping whatever broke mid-run.
    pub fn extract(&mut self) -> Result<&[Frame], FramezipError> {
        let source = self.source.as_mut().ok_or(FramezipError::NoSource)?;

        self.frames = Vec::new();
        self.lightbox.reset(0);
        self.state = RunState::Running { progress: 0 };

        match sampler::sample(source.media.as_mut(), &self.options, &self.limits) {
            Ok(frames) => {
                self.lightbox.reset(frames.len());
                self.frames = frames;
                self.state = RunState::Complete;
                Ok(&self.frames)
            }
            Err(error) => {
                self.state = RunState::Idle;
                if error.category() == ErrorCategory::LimitExceeded {
                    return Err(error);
                }
                log::error!("Frame extraction failed: {error}");
                Err(FramezipError::RunFailed(Box::new(error)))
            }
        }
    }

    /// Discard the results of the last run and return to idle, keeping the
    /// source and settings.
    pub fn restart(&mut self) {
        self.clear_results();
    }

    fn clear_results(&mut self) {
        self.frames = Vec::new();
        self.lightbox.reset(0);
        self.state = RunState::Idle;
    }

    /// Bundle the frames of the completed run.
    ///
    /// Returns `Ok(None)` when there is no completed run or it captured no
    /// frames.
    ///
    /// # Errors
    ///
    /// Returns archive serialization errors.
    pub fn archive(&self) -> Result<Option<Archive>, FramezipError> {
        if self.state != RunState::Complete {
            return Ok(None);
        }
        archive::build_archive_reporting(
            &self.frames,
            self.options.archive_name(),
            self.options.progress.clone(),
            self.options.batch_size,
        )
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut Lightbox {
        &mut self.lightbox
    }

    /// The frame on show in the lightbox.
    pub fn selected_frame(&self) -> Option<&Frame> {
        self.lightbox
            .selected()
            .and_then(|index| self.frames.get(index))
    }
}
