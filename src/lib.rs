//! diskbuffer - an append-only frame file with a record log on top.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           diskbuffer                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Record Log (storage/record/)                │   │
//! │  │   append(bytes) → id   get(id) → bytes   iter()          │   │
//! │  │   RecordHeader + EndPosition + interpolation search      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Frame Store (storage/)                      │   │
//! │  │   append(frames)   get(frame_index)   active tail page   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Buffers (buffer/)                           │   │
//! │  │   BufferAllocator + PageCache seam + IoStats             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (RecordId, Error, config)
//! - [`buffer`] - Buffer allocation, page cache seam, statistics
//! - [`storage`] - Frame store and record log
//!
//! # Quick Start
//! ```no_run
//! use diskbuffer::RecordLog;
//!
//! let log = RecordLog::open("records.db").unwrap();
//!
//! let id = log.append(b"first record").unwrap();
//! assert_eq!(&log.get(id).unwrap()[..], b"first record");
//!
//! log.close().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{StoreConfig, DEFAULT_FRAME_SIZE, DEFAULT_PAGE_SIZE};
pub use common::{Error, RecordId, Result};

pub use buffer::{BufferAllocator, HeapAllocator, IoStats, IoStatsSnapshot, PoolingAllocator};
pub use storage::{EndPosition, Frame, FrameStore, RecordHeader, RecordLog, HEADER_SIZE};
