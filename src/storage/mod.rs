//! Storage layer - the frame file and the record log built on it.
//!
//! This module handles persistent storage:
//! - [`FrameStore`] - Append-only file of fixed-size frames
//! - [`page`] - Frame views and the in-memory tail page
//! - [`record`] - Variable-length records located by id

mod frame_store;
pub mod page;
pub mod record;

pub use frame_store::FrameStore;
pub use page::Frame;
pub use record::{EndPosition, FrameKind, RecordHeader, RecordLog, Records, HEADER_SIZE};
