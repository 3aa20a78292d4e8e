//! Record layer - variable-length records stored as runs of frames.
//!
//! This module contains:
//! - [`RecordLog`] - Append/get by id on top of a frame store
//! - [`RecordHeader`] / [`FrameKind`] - The per-frame header format
//! - [`EndPosition`] - The published end of the log

mod position;
mod record_header;
mod record_log;
mod search;

pub use position::EndPosition;
pub use record_header::{FrameKind, RecordHeader, HEADER_SIZE};
pub use record_log::{RecordLog, Records};
