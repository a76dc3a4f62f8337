//! Archive assembly.
//!
//! Bundles captured frames into a single zip archive with the layout
//!
//! ```text
//! frames/
//!   frame_1_0.00s.png
//!   frame_2_2.00s.png
//!   ...
//! ```
//!
//! and names the archive after a sanitized, user-chosen base name.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use framezip::{ExtractOptions, Limits, SyntheticMedia, archive, sampler};
//!
//! let mut media = SyntheticMedia::new(Duration::from_secs(4), 8, 8);
//! let options = ExtractOptions::new().with_interval(2.0)?;
//! let frames = sampler::sample(&mut media, &options, &Limits::default())?;
//!
//! let archive = archive::build_archive(&frames, "my clip")?.expect("frames were captured");
//! assert_eq!(archive.file_name(), "my_clip.zip");
//! assert_eq!(archive.entry_count(), 2);
//! # Ok::<(), framezip::FramezipError>(())
//! ```

use std::{
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    configuration::{DEFAULT_ARCHIVE_NAME, MAX_ARCHIVE_NAME_LENGTH},
    error::FramezipError,
    frame::Frame,
    progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker},
};

/// Folder every frame entry is placed in.
pub const FRAMES_FOLDER: &str = "frames";

fn is_allowed_name_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_' || character == '-'
}

/// Make `name` safe to use as a file name.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_` and the result is cut
/// to 100 characters. A name that is empty or has no allowed character at
/// all falls back to `extracted_frames`.
///
/// ```
/// use framezip::archive::sanitize_archive_name;
///
/// assert_eq!(sanitize_archive_name("../../etc/passwd"), "______etc_passwd");
/// assert_eq!(sanitize_archive_name(""), "extracted_frames");
/// ```
pub fn sanitize_archive_name(name: &str) -> String {
    if !name.chars().any(is_allowed_name_character) {
        return DEFAULT_ARCHIVE_NAME.to_string();
    }
    name.chars()
        .map(|character| {
            if is_allowed_name_character(character) {
                character
            } else {
                '_'
            }
        })
        .take(MAX_ARCHIVE_NAME_LENGTH)
        .collect()
}

/// `sanitize_archive_name(base_name) + ".zip"`.
pub fn archive_file_name(base_name: &str) -> String {
    format!("{}.zip", sanitize_archive_name(base_name))
}

/// A finished archive held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    file_name: String,
    bytes: Vec<u8>,
    entry_count: usize,
}

impl Archive {
    /// Sanitized file name, ending in `.zip`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Serialized zip data.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the archive, returning its serialized data.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of frame entries (the folder entry is not counted).
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Write the archive as `directory/<file name>` and return that path.
    ///
    /// An existing file at that path is replaced.
    pub fn save_in<P: AsRef<Path>>(&self, directory: P) -> Result<PathBuf, FramezipError> {
        let path = directory.as_ref().join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        log::info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Build an archive of `frames` named after `base_name`.
///
/// Returns `Ok(None)` when `frames` is empty: there is nothing to offer.
///
/// # Errors
///
/// Returns [`FramezipError::ArchiveError`] or [`FramezipError::IoError`] if
/// serialization fails.
pub fn build_archive(frames: &[Frame], base_name: &str) -> Result<Option<Archive>, FramezipError> {
    build_archive_reporting(frames, base_name, Arc::new(NoOpProgress), 1)
}

pub(crate) fn build_archive_reporting(
    frames: &[Frame],
    base_name: &str,
    progress: Arc<dyn ProgressCallback>,
    batch_size: u64,
) -> Result<Option<Archive>, FramezipError> {
    if frames.is_empty() {
        log::debug!("No frames captured; not building an archive");
        return Ok(None);
    }

    let file_name = archive_file_name(base_name);
    let mut tracker = ProgressTracker::new(
        progress,
        OperationType::ArchiveAssembly,
        Some(frames.len() as u64),
        batch_size,
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(format!("{FRAMES_FOLDER}/"), entry_options())?;
    for frame in frames {
        writer.start_file(
            format!("{FRAMES_FOLDER}/{}", frame.file_name()),
            entry_options(),
        )?;
        writer.write_all(frame.png_bytes())?;
        tracker.advance_counted();
    }
    tracker.finish();
    let bytes = writer.finish()?.into_inner();

    log::debug!(
        "Built {file_name}: {} entries, {} bytes",
        frames.len(),
        bytes.len()
    );

    Ok(Some(Archive {
        file_name,
        bytes,
        entry_count: frames.len(),
    }))
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
}
