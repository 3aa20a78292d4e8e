//! Record header and frame role definitions.
//!
//! Every frame belonging to a record starts with a [`RecordHeader`]:
//! - the record id
//! - the frame's role ([`FrameKind`])
//! - role-specific metadata (payload size or sequence number)

use crate::common::{Error, RecordId, Result};

/// Size of the header in bytes, identical for both frame roles.
pub const HEADER_SIZE: usize = 13;

/// Role of a frame within its record.
///
/// Uses `#[repr(u8)]` so the discriminant is the on-disk kind byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// First frame of a record.
    Initial = 0,
    /// Any later frame of a record.
    Continuation = 1,
}

impl FrameKind {
    /// Convert from the on-disk kind byte.
    ///
    /// # Errors
    /// Returns `Error::Corruption` for any byte other than 0 or 1.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(FrameKind::Initial),
            1 => Ok(FrameKind::Continuation),
            other => Err(Error::Corruption(format!(
                "unknown frame kind byte {:#04x}",
                other
            ))),
        }
    }
}

/// Header at the start of every record frame.
///
/// # Layout (13 bytes, big-endian)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       8     id (u64)
/// 8       1     kind (0 = Initial, 1 = Continuation)
/// 9       4     meta (i32): payload size for Initial,
///               sequence number within the record for Continuation
/// ```
///
/// `meta` is a signed 32-bit field on disk; negative values are rejected
/// as corruption, so the decoded values below are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordHeader {
    /// First frame; `size` is the total payload length in bytes.
    Initial { id: RecordId, size: u32 },
    /// Later frame; `seq` is its zero-based position in the record, so the
    /// first Continuation has `seq == 1`.
    Continuation { id: RecordId, seq: u32 },
}

impl RecordHeader {
    pub const OFFSET_ID: usize = 0;
    pub const OFFSET_KIND: usize = 8;
    pub const OFFSET_META: usize = 9;

    /// Record this frame belongs to.
    #[inline]
    pub fn id(&self) -> RecordId {
        match *self {
            RecordHeader::Initial { id, .. } | RecordHeader::Continuation { id, .. } => id,
        }
    }

    #[inline]
    pub fn kind(&self) -> FrameKind {
        match self {
            RecordHeader::Initial { .. } => FrameKind::Initial,
            RecordHeader::Continuation { .. } => FrameKind::Continuation,
        }
    }

    /// Raw metadata value.
    #[inline]
    pub fn meta(&self) -> u32 {
        match *self {
            RecordHeader::Initial { size, .. } => size,
            RecordHeader::Continuation { seq, .. } => seq,
        }
    }

    /// Frames between this one and its record's Initial frame.
    #[inline]
    pub fn frame_adjustment(&self) -> u64 {
        match *self {
            RecordHeader::Initial { .. } => 0,
            RecordHeader::Continuation { seq, .. } => u64::from(seq),
        }
    }

    /// Read a header from the beginning of a frame.
    ///
    /// # Errors
    /// Returns `Error::Corruption` if the buffer is shorter than
    /// [`HEADER_SIZE`], the kind byte is unknown or `meta` is negative.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::Corruption(format!(
                "frame of {} bytes is too small for a record header",
                data.len()
            )));
        }

        let mut id_bytes = [0u8; 8];
        id_bytes.copy_from_slice(&data[Self::OFFSET_ID..Self::OFFSET_ID + 8]);
        let id = RecordId(u64::from_be_bytes(id_bytes));

        let kind = FrameKind::from_u8(data[Self::OFFSET_KIND])?;

        let mut meta_bytes = [0u8; 4];
        meta_bytes.copy_from_slice(&data[Self::OFFSET_META..Self::OFFSET_META + 4]);
        let meta = i32::from_be_bytes(meta_bytes);
        let meta = u32::try_from(meta).map_err(|_| {
            Error::Corruption(format!("negative header meta {} for {}", meta, id))
        })?;

        Ok(match kind {
            FrameKind::Initial => RecordHeader::Initial { id, size: meta },
            FrameKind::Continuation => RecordHeader::Continuation { id, seq: meta },
        })
    }

    /// Write this header to the beginning of a frame.
    ///
    /// # Panics
    /// Panics if `data.len() < HEADER_SIZE` or `meta` exceeds `i32::MAX`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= HEADER_SIZE, "buffer too small for RecordHeader");
        assert!(self.meta() <= i32::MAX as u32, "header meta exceeds i32::MAX");
        let meta = self.meta() as i32;

        data[Self::OFFSET_ID..Self::OFFSET_ID + 8].copy_from_slice(&self.id().0.to_be_bytes());
        data[Self::OFFSET_KIND] = self.kind() as u8;
        data[Self::OFFSET_META..Self::OFFSET_META + 4].copy_from_slice(&meta.to_be_bytes());
    }
}

// ============================================================================
// TESTS
// ============================================================================
