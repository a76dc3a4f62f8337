//! Captured frames.

use std::{io::Cursor, time::Duration};

use image::{DynamicImage, ImageFormat};

use crate::error::FramezipError;

/// One still captured from the source at a specific timestamp.
///
/// The picture is held PNG-encoded; [`decode`](Frame::decode) produces a
/// displayable image on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    index: usize,
    timestamp: Duration,
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl Frame {
    /// Encode `image` losslessly as the frame captured `index`-th (0-based)
    /// at `timestamp`.
    pub(crate) fn encode(
        index: usize,
        timestamp: Duration,
        image: &DynamicImage,
    ) -> Result<Self, FramezipError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Self {
            index,
            timestamp,
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    /// 0-based capture index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based position in the run, as used in entry names and captions.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Media time the frame was captured at.
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Pixel dimensions `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The PNG-encoded picture.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// `frame_<number>_<seconds with 2 decimals>s.png`.
    pub fn file_name(&self) -> String {
        format!(
            "frame_{}_{:.2}s.png",
            self.number(),
            self.timestamp.as_secs_f64()
        )
    }

    /// Decode the PNG back into an image.
    pub fn decode(&self) -> Result<DynamicImage, FramezipError> {
        Ok(image::load_from_memory_with_format(&self.png, ImageFormat::Png)?)
    }
}
