//! Preview lightbox navigation.
//!
//! The lightbox shows one captured frame at a time. Moving past either end
//! is not offered: there is no wraparound.
//!
//! ```
//! use framezip::Lightbox;
//!
//! let mut lightbox = Lightbox::new(3);
//! lightbox.open(0)?;
//! assert!(!lightbox.has_previous());
//! assert!(lightbox.show_next());
//! assert_eq!(lightbox.selected(), Some(1));
//! lightbox.close();
//! assert_eq!(lightbox.selected(), None);
//! # Ok::<(), framezip::FramezipError>(())
//! ```

use crate::error::FramezipError;

/// Selection state over a frame sequence of fixed length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lightbox {
    frame_count: usize,
    selected: Option<usize>,
}

impl Lightbox {
    /// A closed lightbox over `frame_count` frames.
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            selected: None,
        }
    }

    /// Number of frames that can be shown.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Index of the frame on show, if open.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Show the frame at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FramezipError::FrameOutOfRange`] and leaves the selection
    /// unchanged if `index` is not a captured frame.
    pub fn open(&mut self, index: usize) -> Result<(), FramezipError> {
        if index >= self.frame_count {
            return Err(FramezipError::FrameOutOfRange {
                index,
                frame_count: self.frame_count,
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    /// Whether a previous frame is offered.
    pub fn has_previous(&self) -> bool {
        self.selected.is_some_and(|index| index > 0)
    }

    /// Whether a next frame is offered.
    pub fn has_next(&self) -> bool {
        self.selected.is_some_and(|index| index + 1 < self.frame_count)
    }

    /// Move to the previous frame. Returns `false` (and does nothing) when
    /// none is offered.
    pub fn show_previous(&mut self) -> bool {
        match self.selected {
            Some(index) if index > 0 => {
                self.selected = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    /// Move to the next frame. Returns `false` (and does nothing) when none
    /// is offered.
    pub fn show_next(&mut self) -> bool {
        match self.selected {
            Some(index) if index + 1 < self.frame_count => {
                self.selected = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    /// `(1-based position, frame count)` of the frame on show.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.selected.map(|index| (index + 1, self.frame_count))
    }

    /// Track a new frame sequence; any selection is dropped.
    pub(crate) fn reset(&mut self, frame_count: usize) {
        *self = Self::new(frame_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_do_not_wrap() {
        let mut lightbox = Lightbox::new(4);
        lightbox.open(3).unwrap();
        assert!(!lightbox.has_next());
        assert!(!lightbox.show_next());
        assert_eq!(lightbox.selected(), Some(3));

        lightbox.open(0).unwrap();
        assert!(!lightbox.has_previous());
        assert!(!lightbox.show_previous());
        assert_eq!(lightbox.selected(), Some(0));
    }

    #[test]
    fn closed_lightbox_offers_nothing() {
        let mut lightbox = Lightbox::new(2);
        assert!(!lightbox.has_previous());
        assert!(!lightbox.has_next());
        assert!(!lightbox.show_next());
        assert_eq!(lightbox.position(), None);
    }

    #[test]
    fn out_of_range_open_keeps_selection() {
        let mut lightbox = Lightbox::new(2);
        lightbox.open(1).unwrap();
        assert!(matches!(
            lightbox.open(2),
            Err(FramezipError::FrameOutOfRange { index: 2, frame_count: 2 })
        ));
        assert_eq!(lightbox.selected(), Some(1));
        assert_eq!(lightbox.position(), Some((2, 2)));
    }

    #[test]
    fn single_frame_has_no_neighbours() {
        let mut lightbox = Lightbox::new(1);
        lightbox.open(0).unwrap();
        assert!(!lightbox.has_previous());
        assert!(!lightbox.has_next());
    }

    #[test]
    fn reset_clears_selection() {
        let mut lightbox = Lightbox::new(5);
        lightbox.open(4).unwrap();
        lightbox.reset(2);
        assert_eq!(lightbox, Lightbox::new(2));
    }
}
