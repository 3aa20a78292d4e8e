//! Active page - the mutable in-memory mirror of the file tail.
//!
//! Every page except the last one is sealed and immutable. The last page
//! is held in memory as an [`ActivePage`] so frames appended to it can be
//! read back without I/O.

use bytes::BytesMut;

/// The page currently receiving appended frames.
///
/// # Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬───────────────────────┐
/// │ Frame 0 │ Frame 1 │  ...    │  unused (not on disk) │
/// └─────────┴─────────┴─────────┴───────────────────────┘
///  0         frame_size           filled × frame_size
/// ```
///
/// Only the first `filled` frames mirror bytes that are durably on disk.
#[derive(Debug)]
pub(crate) struct ActivePage {
    /// Page number in the file; equals the number of sealed pages.
    page_no: u64,

    /// Page buffer, exactly `page_size` bytes.
    data: BytesMut,

    /// Frames of `data` holding appended bytes.
    filled: usize,
}

impl ActivePage {
    /// Wrap a page buffer whose first `filled` frames are already valid.
    pub(crate) fn new(page_no: u64, data: BytesMut, filled: usize) -> Self {
        Self {
            page_no,
            data,
            filled,
        }
    }

    #[inline]
    pub(crate) fn page_no(&self) -> u64 {
        self.page_no
    }

    #[cfg(test)]
    pub(crate) fn filled(&self) -> usize {
        self.filled
    }

    /// Frames that still fit before the page must be sealed.
    #[inline]
    pub(crate) fn remaining(&self, frame_size: usize) -> usize {
        self.data.len() / frame_size - self.filled
    }

    /// Total frames in the file up to and including this page's filled part.
    #[inline]
    pub(crate) fn frame_count(&self, frames_per_page: usize) -> u64 {
        self.page_no * frames_per_page as u64 + self.filled as u64
    }

    /// Bytes of the frame in `slot`.
    ///
    /// # Panics
    /// Panics if `slot` is not a filled frame.
    pub(crate) fn frame(&self, slot: usize, frame_size: usize) -> &[u8] {
        assert!(slot < self.filled, "frame slot not filled");
        let start = slot * frame_size;
        &self.data[start..start + frame_size]
    }

    /// Copy one frame into the next free slot.
    ///
    /// # Panics
    /// Panics if the page is full or `frame` is not `frame_size` bytes.
    pub(crate) fn push(&mut self, frame: &[u8], frame_size: usize) {
        assert_eq!(frame.len(), frame_size, "frame must be exactly frame_size");
        assert!(self.remaining(frame_size) > 0, "active page is full");
        let start = self.filled * frame_size;
        self.data[start..start + frame_size].copy_from_slice(frame);
        self.filled += 1;
    }

    /// Release the page buffer.
    pub(crate) fn into_data(self) -> BytesMut {
        self.data
    }
}

// ============================================================================
// TESTS
// ============================================================================
