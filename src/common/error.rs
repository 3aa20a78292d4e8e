//! Error types for diskbuffer.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in diskbuffer.
///
/// Every layer (frame store, record log) returns this one type so errors
/// from the paging layer propagate through the record layer unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a read, write or flush of the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid open parameters or arguments.
    ///
    /// Raised before any state is created or any I/O is issued.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A frame handed to `append` does not have exactly `frame_size` bytes.
    #[error("Invalid frame: expected {expected} bytes, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },

    /// The backing file is malformed.
    ///
    /// The engine never attempts repair; the affected file or record is
    /// unusable until fixed externally.
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// A frame index at or beyond the current frame count.
    #[error("Frame {index} out of range (frame count {frame_count})")]
    FrameOutOfRange { index: u64, frame_count: u64 },

    /// A record id outside `(start, end]`.
    #[error("Record {id} out of range (start {start}, end {end})")]
    RecordOutOfRange { id: u64, start: u64, end: u64 },
}

impl Error {
    /// True for range errors, which are the caller's responsibility and
    /// leave the engine untouched.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Error::FrameOutOfRange { .. } | Error::RecordOutOfRange { .. }
        )
    }

    /// True for corruption errors.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }
}
