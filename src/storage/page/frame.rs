//! Frame - a read-only view of one frame returned by the frame store.

use std::ops::Deref;

use bytes::Bytes;

/// A read-only frame.
///
/// Frames from sealed pages share the page buffer they were sliced from;
/// frames from the active page are snapshot copies taken under the page's
/// read lock, so later appends never change a `Frame` already handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    index: u64,
    bytes: Bytes,
}

impl Frame {
    pub(crate) fn new(index: u64, bytes: Bytes) -> Self {
        Self { index, bytes }
    }

    /// Frame index in the file.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Frame contents.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the frame contents.
    #[inline]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
