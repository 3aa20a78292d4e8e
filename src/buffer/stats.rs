//! Frame store I/O statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running read/write counters kept by the frame store.
///
/// All fields are atomic so readers on other threads can bump them without
/// taking the store's locks.
///
/// # Memory Ordering
/// All operations use `Ordering::Relaxed`: each counter only needs to be
/// atomic, and no other data is published through them.
///
/// # Example
/// ```
/// use diskbuffer::IoStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IoStats::new();
/// stats.appends.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().appends, 1);
/// ```
#[derive(Debug)]
pub struct IoStats {
    /// Number of successful `append` calls.
    pub appends: AtomicU64,

    /// Frames written by those appends.
    pub frames_written: AtomicU64,

    /// Bytes written by those appends.
    pub bytes_written: AtomicU64,

    /// Number of frame reads served.
    pub frame_reads: AtomicU64,

    /// Frame reads answered from the in-memory active page.
    pub active_page_hits: AtomicU64,

    /// Sealed page reads answered by the page cache.
    pub cache_hits: AtomicU64,

    /// Sealed pages read from disk.
    pub pages_read: AtomicU64,

    /// Bytes read from disk.
    pub bytes_read: AtomicU64,
}

impl IoStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            appends: AtomicU64::new(0),
            frames_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            frame_reads: AtomicU64::new(0),
            active_page_hits: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            pages_read: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_append(&self, frames: u64, bytes: u64) {
        self.appends.fetch_add(1, Ordering::Relaxed);
        self.frames_written.fetch_add(frames, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_page_read(&self, bytes: u64) {
        self.pages_read.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> IoStatsSnapshot {
        IoStatsSnapshot {
            appends: self.appends.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            frame_reads: self.frame_reads.load(Ordering::Relaxed),
            active_page_hits: self.active_page_hits.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.appends.store(0, Ordering::Relaxed);
        self.frames_written.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.frame_reads.store(0, Ordering::Relaxed);
        self.active_page_hits.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.pages_read.store(0, Ordering::Relaxed);
        self.bytes_read.store(0, Ordering::Relaxed);
    }
}

impl Default for IoStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`IoStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoStatsSnapshot {
    pub appends: u64,
    pub frames_written: u64,
    pub bytes_written: u64,
    pub frame_reads: u64,
    pub active_page_hits: u64,
    pub cache_hits: u64,
    pub pages_read: u64,
    pub bytes_read: u64,
}

impl IoStatsSnapshot {
    /// Fraction of frame reads served without touching disk (0.0 to 1.0).
    pub fn memory_hit_rate(&self) -> f64 {
        if self.frame_reads == 0 {
            0.0
        } else {
            (self.active_page_hits + self.cache_hits) as f64 / self.frame_reads as f64
        }
    }
}

impl fmt::Display for IoStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IoStats {{ appends: {}, frames_written: {}, bytes_written: {}, frame_reads: {}, pages_read: {}, bytes_read: {}, hit_rate: {:.2}% }}",
            self.appends,
            self.frames_written,
            self.bytes_written,
            self.frame_reads,
            self.pages_read,
            self.bytes_read,
            self.memory_hit_rate() * 100.0
        )
    }
}
