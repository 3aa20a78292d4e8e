//! Buffer capabilities consumed by the storage layer.
//!
//! # Components
//! - [`BufferAllocator`] - Allocate/recycle fixed-size byte regions
//!   ([`HeapAllocator`], [`PoolingAllocator`])
//! - [`PageCache`] - Seam for caching sealed pages ([`NoPageCache`])
//! - [`IoStats`] - Frame store read/write counters

mod allocator;
mod page_cache;
mod stats;

pub use allocator::{BufferAllocator, HeapAllocator, PoolingAllocator};
pub use page_cache::{NoPageCache, PageCache};
pub use stats::{IoStats, IoStatsSnapshot};
