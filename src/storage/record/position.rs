//! End position - the publication point for appended records.

use parking_lot::RwLock;

use crate::common::RecordId;

/// Id and Initial frame index of the most recently completed append.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EndPosition {
    /// Id of the newest visible record; `RecordId::START` when empty.
    pub id: RecordId,

    /// Frame index of that record's Initial frame.
    pub frame_index: u64,
}

/// Single-writer, multi-reader cell holding the current [`EndPosition`].
///
/// # Memory Ordering
/// `publish` stores under the write lock and `load` reads under the read
/// lock. Unlocking the write lock is a release operation and acquiring the
/// read lock is an acquire operation, so a reader that observes a position
/// also observes every write the publisher made before publishing it: the
/// record's frames on disk and in the active page. Both fields are read as
/// one pair; a reader never sees the id of one append with the frame index
/// of another.
#[derive(Debug, Default)]
pub(crate) struct PublishedEnd {
    inner: RwLock<EndPosition>,
}

impl PublishedEnd {
    pub(crate) fn new(position: EndPosition) -> Self {
        Self {
            inner: RwLock::new(position),
        }
    }

    #[inline]
    pub(crate) fn load(&self) -> EndPosition {
        *self.inner.read()
    }

    #[inline]
    pub(crate) fn publish(&self, position: EndPosition) {
        *self.inner.write() = position;
    }
}
