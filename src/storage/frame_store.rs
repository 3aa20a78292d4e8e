//! Frame Store - the append-only paging layer.
//!
//! The [`FrameStore`] owns a single file and handles:
//! - Appending whole frames at the end of the file
//! - Random access to any frame by index
//! - Buffering the tail page in memory
//! - Recovering page/frame counts from the file size on open

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::buffer::{BufferAllocator, HeapAllocator, IoStats, NoPageCache, PageCache};
use crate::common::config::StoreConfig;
use crate::common::{Error, Result};
use crate::storage::page::{ActivePage, Frame};

/// Append-only file of fixed-size frames grouped into fixed-size pages.
///
/// # File Layout
/// The file is a plain sequence of frames with no file header:
/// ```text
/// ┌──────────────────────────────┬──────────────────────────────┬─────────┐
/// │ Page 0 (sealed)              │ Page 1 (sealed)              │ Page N  │
/// │ [F0][F1] ... [F(fpp-1)]      │ [Ffpp] ...                   │ (active)│
/// └──────────────────────────────┴──────────────────────────────┴─────────┘
/// ```
///
/// Frame `i` lives at byte offset `i × frame_size`. The file size is always
/// a whole number of frames; anything else is reported as corruption on open.
///
/// # Thread Safety
/// `FrameStore` is `Send + Sync`. Appends serialize on an internal writer
/// lock. Sealed pages are read with a seek and read under the file lock;
/// frames still on the tail page are copied out under the active page's
/// read lock without touching the file.
///
/// # Durability
/// Every `append` calls `sync_data()` before it returns and before the new
/// frames become readable through [`FrameStore::get`].
pub struct FrameStore {
    path: PathBuf,
    /// Seek and transfer happen together under this lock.
    file: Mutex<File>,
    config: StoreConfig,

    /// Supplies page buffers and takes back sealed ones.
    allocator: Arc<dyn BufferAllocator>,

    /// Consulted before reading a sealed page from disk.
    cache: Box<dyn PageCache>,

    /// Tail page; its page number is the count of sealed pages.
    active: RwLock<ActivePage>,

    /// Serializes appends.
    writer: Mutex<()>,

    stats: IoStats,
}

impl FrameStore {
    /// Open (or create) a frame file with the default geometry and a
    /// [`HeapAllocator`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, StoreConfig::default(), Arc::new(HeapAllocator))
    }

    /// Open (or create) a frame file.
    ///
    /// On an existing file the trailing partial page is loaded into memory
    /// and the page/frame counts are recomputed from the file size.
    ///
    /// # Errors
    /// - `Error::Config` if the geometry is invalid
    /// - `Error::Corruption` if the file size is not a multiple of the frame size
    /// - I/O errors from opening or reading the file
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        config: StoreConfig,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Result<Self> {
        config.validate()?;

        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let file_size = file.metadata()?.len();
        let frame_size = config.frame_size as u64;
        let page_size = config.page_size as u64;

        if file_size % frame_size != 0 {
            warn!(
                path = %path.display(),
                file_size,
                frame_size,
                "frame file size is not a whole number of frames"
            );
            return Err(Error::Corruption(format!(
                "file size {} is not a multiple of frame size {}",
                file_size, frame_size
            )));
        }

        let sealed_pages = file_size / page_size;
        let tail_offset = sealed_pages * page_size;
        let tail_len = (file_size - tail_offset) as usize;

        let mut data = allocator.allocate(config.page_size);
        if tail_len > 0 {
            read_exact_at(&mut file, &mut data[..tail_len], tail_offset)?;
        }
        let active = ActivePage::new(sealed_pages, data, tail_len / config.frame_size);

        info!(
            path = %path.display(),
            page_size = config.page_size,
            frame_size = config.frame_size,
            pages = sealed_pages,
            frames = active.frame_count(config.frames_per_page()),
            "opened frame store"
        );

        Ok(Self {
            path,
            file: Mutex::new(file),
            config,
            allocator,
            cache: Box::new(NoPageCache),
            active: RwLock::new(active),
            writer: Mutex::new(()),
            stats: IoStats::new(),
        })
    }

    /// Install a page cache consulted before reading sealed pages from disk.
    pub fn with_page_cache(mut self, cache: Box<dyn PageCache>) -> Self {
        self.cache = cache;
        self
    }

    // ========================================================================
    // Public API: Append
    // ========================================================================

    /// Append frames at the end of the file.
    ///
    /// Every frame must be exactly `frame_size` bytes; this is checked for
    /// all frames before any I/O happens. The frames are written at the
    /// physical end of the file, flushed with `sync_data()`, then mirrored
    /// into the active page, sealing it and starting a new page whenever it
    /// fills. The frame count only advances after the flush succeeds.
    ///
    /// # Errors
    /// - `Error::InvalidFrame` if any frame has the wrong length
    /// - I/O errors from the write or flush; the frame count is unchanged
    pub fn append<F: AsRef<[u8]>>(&self, frames: &[F]) -> Result<()> {
        let frame_size = self.config.frame_size;
        for frame in frames {
            let actual = frame.as_ref().len();
            if actual != frame_size {
                return Err(Error::InvalidFrame {
                    expected: frame_size,
                    actual,
                });
            }
        }
        if frames.is_empty() {
            return Ok(());
        }

        let _writer = self.writer.lock();

        let first = self.frame_count();
        let mut offset = first * frame_size as u64;
        {
            let mut file = self.file.lock();
            for frame in frames {
                write_all_at(&mut file, frame.as_ref(), offset)?;
                offset += frame_size as u64;
            }
            file.sync_data()?;
        }

        self.mirror(frames);

        let bytes = (frames.len() * frame_size) as u64;
        self.stats.record_append(frames.len() as u64, bytes);
        debug!(first, frames = frames.len(), "appended frames");

        Ok(())
    }

    /// Append a single frame.
    pub fn append_frame(&self, frame: &[u8]) -> Result<()> {
        self.append(&[frame])
    }

    /// Copy durably written frames into the active page.
    fn mirror<F: AsRef<[u8]>>(&self, frames: &[F]) {
        let frame_size = self.config.frame_size;
        let mut active = self.active.write();
        let mut pending = frames;

        while !pending.is_empty() {
            if active.remaining(frame_size) == 0 {
                self.seal(&mut active);
            }
            let fit = active.remaining(frame_size).min(pending.len());
            for frame in &pending[..fit] {
                active.push(frame.as_ref(), frame_size);
            }
            pending = &pending[fit..];
        }
    }

    /// Replace a full active page with a fresh one.
    fn seal(&self, active: &mut ActivePage) {
        let next_page = ActivePage::new(
            active.page_no() + 1,
            self.allocator.allocate(self.config.page_size),
            0,
        );
        let sealed = std::mem::replace(active, next_page);
        let page_no = sealed.page_no();

        if let Some(declined) = self.cache.offer(page_no, sealed.into_data()) {
            self.allocator.recycle(declined);
        }
        debug!(page_no, "sealed page");
    }

    // ========================================================================
    // Public API: Read
    // ========================================================================

    /// Get the frame at `index`.
    ///
    /// Frames on the active page are served from memory. Older frames come
    /// from the page cache or, failing that, from a fresh read of their page.
    ///
    /// # Errors
    /// - `Error::FrameOutOfRange` if `index >= frame_count()`
    /// - I/O errors from reading a sealed page
    pub fn get(&self, index: u64) -> Result<Frame> {
        let frame_size = self.config.frame_size;
        let frames_per_page = self.config.frames_per_page() as u64;
        let page_no = index / frames_per_page;
        let slot = (index % frames_per_page) as usize;

        {
            let active = self.active.read();
            let frame_count = active.frame_count(frames_per_page as usize);
            if index >= frame_count {
                return Err(Error::FrameOutOfRange { index, frame_count });
            }
            self.stats.frame_reads.fetch_add(1, Ordering::Relaxed);

            if page_no == active.page_no() {
                self.stats.active_page_hits.fetch_add(1, Ordering::Relaxed);
                let bytes = Bytes::copy_from_slice(active.frame(slot, frame_size));
                return Ok(Frame::new(index, bytes));
            }
        }

        let page = self.sealed_page(page_no)?;
        let start = slot * frame_size;
        Ok(Frame::new(index, page.slice(start..start + frame_size)))
    }

    /// The most recently appended frame.
    ///
    /// # Errors
    /// Returns `Error::FrameOutOfRange` if the store is empty.
    pub fn last_frame(&self) -> Result<Frame> {
        match self.frame_count() {
            0 => Err(Error::FrameOutOfRange {
                index: 0,
                frame_count: 0,
            }),
            n => self.get(n - 1),
        }
    }

    fn sealed_page(&self, page_no: u64) -> Result<Bytes> {
        if let Some(page) = self.cache.get(page_no) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(page);
        }

        let page_size = self.config.page_size;
        let mut buffer = self.allocator.allocate(page_size);
        read_exact_at(&mut self.file.lock(), &mut buffer, page_no * page_size as u64)?;
        self.stats.record_page_read(page_size as u64);

        Ok(buffer.freeze())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Total frames in the file, including those on the active page.
    pub fn frame_count(&self) -> u64 {
        self.active.read().frame_count(self.config.frames_per_page())
    }

    /// Number of sealed (complete and no longer mutable) pages.
    pub fn page_count(&self) -> u64 {
        self.active.read().page_no()
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    #[inline]
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Size of the backing file in bytes.
    pub fn size(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The allocator this store draws buffers from.
    #[inline]
    pub fn allocator(&self) -> &Arc<dyn BufferAllocator> {
        &self.allocator
    }

    #[inline]
    pub fn stats(&self) -> &IoStats {
        &self.stats
    }

    /// Flush and release the file handle.
    pub fn close(self) -> Result<()> {
        self.file.lock().sync_all()?;
        info!(
            path = %self.path.display(),
            frames = self.frame_count(),
            "closed frame store"
        );
        Ok(())
    }
}

/// Read `buf.len()` bytes starting at byte `offset`.
fn read_exact_at(file: &mut File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)
}

/// Write all of `buf` starting at byte `offset`.
fn write_all_at(file: &mut File, buf: &[u8], offset: u64) -> io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(buf)
}
