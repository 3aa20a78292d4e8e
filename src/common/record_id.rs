//! Record identifier type.

use std::fmt;

/// Identifies a record in a [`RecordLog`](crate::RecordLog).
///
/// Ids are handed out by `append` starting at 1 and increase by one per
/// record. Id 0 is [`RecordId::START`], the position before the first
/// record, and never names stored data.
///
/// # Example
/// ```
/// use diskbuffer::RecordId;
///
/// let first = RecordId::START.next();
/// assert_eq!(first, RecordId::new(1));
/// assert!(first > RecordId::START);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The "before-first" sentinel.
    pub const START: RecordId = RecordId(0);

    /// Create a new RecordId.
    #[inline]
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    /// The id following this one.
    #[inline]
    pub fn next(self) -> Self {
        RecordId(self.0 + 1)
    }

    /// Raw integer value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({})", self.0)
    }
}
