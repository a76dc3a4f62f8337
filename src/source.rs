//! Candidate source files.
//!
//! A [`SourceCandidate`] describes a file the user picked, before it has been
//! validated or opened: its name, byte size, and declared content type.

use std::path::{Path, PathBuf};

use crate::error::FramezipError;

/// A user-selected file awaiting validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    /// Location on disk, if the candidate came from a path.
    pub path: Option<PathBuf>,
    /// File name including extension.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Declared content type (e.g. `video/mp4`), if any.
    pub content_type: Option<String>,
}

impl SourceCandidate {
    /// Describe a candidate without touching the file system.
    pub fn new(name: impl Into<String>, size: u64, content_type: Option<&str>) -> Self {
        Self {
            path: None,
            name: name.into(),
            size,
            content_type: content_type.map(str::to_string),
        }
    }

    /// Describe the file at `path`, reading its size from the file system
    /// and inferring the content type from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`FramezipError::FileOpen`] if the file metadata cannot be
    /// read or the path is not a regular file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FramezipError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|error| FramezipError::FileOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(FramezipError::FileOpen {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = extension_of(&name).and_then(|extension| infer_content_type(&extension));

        Ok(Self {
            path: Some(path.to_path_buf()),
            name,
            size: metadata.len(),
            content_type: content_type.map(str::to_string),
        })
    }

    /// Override the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lower-cased text after the last `.` of the name.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

fn extension_of(name: &str) -> Option<String> {
    name.rfind('.')
        .map(|dot| name[dot + 1..].to_lowercase())
        .filter(|extension| !extension.is_empty())
}

/// The content type a file picker would declare for `extension`.
pub fn infer_content_type(extension: &str) -> Option<&'static str> {
    let content_type = match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "mov" | "qt" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mpg" | "mpeg" => "video/mpeg",
        "3gp" => "video/3gpp",
        _ => return None,
    };
    Some(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_uses_last_dot_and_lowercases() {
        assert_eq!(SourceCandidate::new("clip.final.MP4", 1, None).extension().as_deref(), Some("mp4"));
        assert_eq!(SourceCandidate::new("noextension", 1, None).extension(), None);
        assert_eq!(SourceCandidate::new("trailing.", 1, None).extension(), None);
    }

    #[test]
    fn inference_matches_picker_types() {
        assert_eq!(infer_content_type("mov"), Some("video/quicktime"));
        assert_eq!(infer_content_type(".AVI"), Some("video/x-msvideo"));
        assert_eq!(infer_content_type("txt"), None);
    }

    #[test]
    fn from_path_reads_size_and_type() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("sample.webm");
        std::fs::write(&path, [0_u8; 42]).unwrap();

        let candidate = SourceCandidate::from_path(&path).unwrap();
        assert_eq!(candidate.name, "sample.webm");
        assert_eq!(candidate.size, 42);
        assert_eq!(candidate.content_type.as_deref(), Some("video/webm"));
    }

    #[test]
    fn from_path_rejects_missing_file() {
        let result = SourceCandidate::from_path("definitely_missing_file.mp4");
        assert!(matches!(result, Err(FramezipError::FileOpen { .. })));
    }
}
