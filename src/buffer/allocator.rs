//! Buffer allocation strategies.
//!
//! The frame store and record log never create page or frame buffers
//! directly; they ask a [`BufferAllocator`] and hand buffers back through
//! [`BufferAllocator::recycle`] once done. Correctness never depends on
//! whether recycling pools or discards.

use std::collections::HashMap;

use bytes::BytesMut;
use parking_lot::Mutex;

/// Allocates and optionally recycles fixed-size byte regions.
///
/// Implementations must be thread-safe: the frame store allocates page
/// buffers from reader threads (sealed page loads) as well as from the
/// writer.
pub trait BufferAllocator: Send + Sync {
    /// Return a buffer whose length is exactly `size` bytes.
    ///
    /// Contents are unspecified; callers overwrite what they use.
    fn allocate(&self, size: usize) -> BytesMut;

    /// Give a buffer back. May be a no-op.
    fn recycle(&self, buffer: BytesMut);
}

/// Always allocates fresh zeroed memory; `recycle` drops the buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    #[inline]
    fn allocate(&self, size: usize) -> BytesMut {
        BytesMut::zeroed(size)
    }

    #[inline]
    fn recycle(&self, _buffer: BytesMut) {}
}

/// Keeps recycled buffers on per-size free lists and hands them out again.
///
/// At most `max_per_size` buffers are retained for each length; extras are
/// dropped.
///
/// # Example
/// ```
/// use diskbuffer::buffer::{BufferAllocator, PoolingAllocator};
///
/// let pool = PoolingAllocator::new(4);
/// let buf = pool.allocate(128);
/// pool.recycle(buf);
/// assert_eq!(pool.pooled(128), 1);
///
/// let again = pool.allocate(128);
/// assert_eq!(again.len(), 128);
/// assert_eq!(pool.pooled(128), 0);
/// ```
#[derive(Debug)]
pub struct PoolingAllocator {
    /// Free buffers keyed by length.
    free: Mutex<HashMap<usize, Vec<BytesMut>>>,

    /// Cap on retained buffers per length.
    max_per_size: usize,
}

impl PoolingAllocator {
    /// Create a pool retaining up to `max_per_size` buffers per length.
    pub fn new(max_per_size: usize) -> Self {
        Self {
            free: Mutex::new(HashMap::new()),
            max_per_size,
        }
    }

    /// Number of idle buffers of the given length.
    pub fn pooled(&self, size: usize) -> usize {
        self.free.lock().get(&size).map_or(0, Vec::len)
    }
}

impl Default for PoolingAllocator {
    fn default() -> Self {
        Self::new(64)
    }
}

impl BufferAllocator for PoolingAllocator {
    fn allocate(&self, size: usize) -> BytesMut {
        let reused = self.free.lock().get_mut(&size).and_then(Vec::pop);
        match reused {
            Some(mut buffer) => {
                buffer.clear();
                buffer.resize(size, 0);
                buffer
            }
            None => BytesMut::zeroed(size),
        }
    }

    fn recycle(&self, buffer: BytesMut) {
        let mut free = self.free.lock();
        let list = free.entry(buffer.len()).or_default();
        if list.len() < self.max_per_size {
            list.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_allocator_exact_size() {
        let alloc = HeapAllocator;
        let buf = alloc.allocate(2048);
        assert_eq!(buf.len(), 2048);
        assert!(buf.iter().all(|&b| b == 0));
        alloc.recycle(buf);
    }

    #[test]
    fn test_pool_reuses_and_resets_length() {
        let pool = PoolingAllocator::new(2);

        let mut buf = pool.allocate(64);
        buf[0] = 0xAB;
        pool.recycle(buf);
        assert_eq!(pool.pooled(64), 1);

        let buf = pool.allocate(64);
        assert_eq!(buf.len(), 64);
        assert_eq!(buf[0], 0);
        assert_eq!(pool.pooled(64), 0);
    }

    #[test]
    fn test_pool_respects_cap() {
        let pool = PoolingAllocator::new(2);
        for _ in 0..5 {
            pool.recycle(BytesMut::zeroed(32));
        }
        assert_eq!(pool.pooled(32), 2);
    }

    #[test]
    fn test_pool_sizes_are_separate() {
        let pool = PoolingAllocator::new(4);
        pool.recycle(BytesMut::zeroed(32));
        assert_eq!(pool.pooled(64), 0);

        let buf = pool.allocate(64);
        assert_eq!(buf.len(), 64);
        assert_eq!(pool.pooled(32), 1);
    }

    #[test]
    fn test_pool_concurrent_use() {
        use std::sync::Arc;
        use std::thread;

        let pool = Arc::new(PoolingAllocator::new(8));
        let mut handles = vec![];

        for _ in 0..4 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let buf = pool.allocate(16);
                    assert_eq!(buf.len(), 16);
                    pool.recycle(buf);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(pool.pooled(16) <= 8);
    }
}
