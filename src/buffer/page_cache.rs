//! Sealed page cache seam.
//!
//! Once the frame store starts a new page, every older page is immutable,
//! so a sealed page read from disk can be shared freely. The store offers
//! each page it seals to its [`PageCache`] and consults the cache before
//! reading a sealed page back from disk. A page the cache declines goes back
//! to the allocator.
//!
//! Only [`NoPageCache`] ships. A bounded policy (LRU, CLOCK, ...) plugs in
//! by implementing the trait; the frame store's public contract does not
//! change.

use bytes::{Bytes, BytesMut};

/// Lookup and admission of sealed pages, keyed by page number.
pub trait PageCache: Send + Sync {
    /// Return the page if it is resident.
    fn get(&self, page_no: u64) -> Option<Bytes>;

    /// Offer a freshly sealed page.
    ///
    /// Returns the buffer back when the cache declines it, so the caller
    /// can recycle it.
    fn offer(&self, page_no: u64, page: BytesMut) -> Option<BytesMut>;
}

/// Caches nothing; every sealed page read goes to disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPageCache;

impl PageCache for NoPageCache {
    #[inline]
    fn get(&self, _page_no: u64) -> Option<Bytes> {
        None
    }

    #[inline]
    fn offer(&self, _page_no: u64, page: BytesMut) -> Option<BytesMut> {
        Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_page_cache_declines_everything() {
        let cache = NoPageCache;
        let declined = cache.offer(0, BytesMut::zeroed(16));
        assert_eq!(declined.map(|b| b.len()), Some(16));
        assert!(cache.get(0).is_none());
    }
}
