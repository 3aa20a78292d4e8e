//! Record Log - variable-length records on top of the frame store.
//!
//! The [`RecordLog`] provides:
//! - Appending byte payloads, split across as many frames as needed
//! - Lookup by id without an index, via interpolation search
//! - Sequential iteration over every visible record
//! - Recovery of the end position when reopening a non-empty file

use std::path::Path;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::buffer::{HeapAllocator, IoStats};
use crate::common::config::StoreConfig;
use crate::common::{Error, RecordId, Result};
use crate::storage::record::position::{EndPosition, PublishedEnd};
use crate::storage::record::record_header::{RecordHeader, HEADER_SIZE};
use crate::storage::FrameStore;

/// Append-only log of variable-length records.
///
/// # Record Layout
/// A record occupies a contiguous run of frames, Initial frame first:
/// ```text
/// ┌────────────────────────┬────────────────────────┬────────────────────────┐
/// │ [id|Initial|size]  ... │ [id|Continuation|1] ...│ [id|Continuation|2] ...│
/// │ header (13) + payload  │ header (13) + payload  │ header + payload tail  │
/// └────────────────────────┴────────────────────────┴────────────────────────┘
/// ```
///
/// # Visibility
/// An append writes and flushes all frames of the record, and only then
/// publishes the new [`EndPosition`]. `get` and `iter` bound themselves by
/// the published position, so a reader never sees an id whose data is not
/// already durable.
///
/// # Thread Safety
/// `RecordLog` is `Send + Sync`. Appends are serialized; any number of
/// threads may read concurrently with the writer.
///
/// # Example
/// ```no_run
/// use diskbuffer::RecordLog;
///
/// let log = RecordLog::open("records.db").unwrap();
/// let id = log.append(b"hello").unwrap();
/// assert_eq!(&log.get(id).unwrap()[..], b"hello");
/// ```
pub struct RecordLog {
    store: FrameStore,

    /// The id before the first record.
    start: RecordId,

    end: PublishedEnd,

    /// Serializes appends so ids and frame indices are assigned together.
    writer: Mutex<()>,
}

impl RecordLog {
    /// Open (or create) a record log with the default page and frame size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_store(FrameStore::open(path)?)
    }

    /// Open (or create) a record log with the given geometry.
    pub fn open_with<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        Self::from_store(FrameStore::open_with(path, config, Arc::new(HeapAllocator))?)
    }

    /// Layer a record log over an already open frame store.
    ///
    /// An empty store starts at `RecordId::START`. A non-empty store has its
    /// end position recovered from the last frame.
    ///
    /// # Errors
    /// - `Error::Config` if frames are too small to hold a header and payload
    /// - `Error::Corruption` if the last record is incomplete or malformed
    pub fn from_store(store: FrameStore) -> Result<Self> {
        if store.frame_size() <= HEADER_SIZE {
            return Err(Error::Config(format!(
                "'frame_size' ({}) must exceed the {} byte record header",
                store.frame_size(),
                HEADER_SIZE
            )));
        }

        let mut log = Self {
            store,
            start: RecordId::START,
            end: PublishedEnd::default(),
            writer: Mutex::new(()),
        };

        let end = log.recover()?;
        log.end = PublishedEnd::new(end);

        info!(
            path = %log.store.path().display(),
            end = end.id.0,
            frames = log.store.frame_count(),
            "opened record log"
        );
        Ok(log)
    }

    /// Find the end position from the last frame of a non-empty store.
    fn recover(&self) -> Result<EndPosition> {
        let frame_count = self.store.frame_count();
        if frame_count == 0 {
            return Ok(EndPosition::default());
        }

        let located = self.initial_at(frame_count - 1)?;
        let span = self.frames_for(located.size as usize) as u64;

        if located.index + span != frame_count || located.id <= self.start {
            warn!(
                id = located.id.0,
                initial = located.index,
                span,
                frame_count,
                "last record does not end at the end of the file"
            );
            return Err(Error::Corruption(format!(
                "torn tail: {} starts at frame {} and spans {} frames, file has {}",
                located.id, located.index, span, frame_count
            )));
        }

        Ok(EndPosition {
            id: located.id,
            frame_index: located.index,
        })
    }

    // ========================================================================
    // Public API: Append
    // ========================================================================

    /// Append a record and return its id.
    ///
    /// The payload is split into `max(1, ceil(len / (frame_size - 13)))`
    /// frames, written and flushed in a single frame store append. The new
    /// end position is published last.
    ///
    /// # Errors
    /// - `Error::Config` if the payload is longer than `i32::MAX` bytes
    /// - Any frame store error; the end position is then unchanged
    pub fn append(&self, payload: &[u8]) -> Result<RecordId> {
        let size = u32::try_from(payload.len())
            .ok()
            .filter(|&size| size <= i32::MAX as u32)
            .ok_or_else(|| {
                Error::Config(format!(
                    "record of {} bytes exceeds the maximum of {}",
                    payload.len(),
                    i32::MAX
                ))
            })?;

        let _writer = self.writer.lock();

        let id = self.end.load().id.next();
        let frame_size = self.store.frame_size();
        let usable = self.usable();
        let frame_count = self.frames_for(payload.len());
        let allocator = self.store.allocator();

        let mut frames: Vec<BytesMut> = Vec::with_capacity(frame_count);
        let mut chunks = payload.chunks(usable);
        for seq in 0..frame_count {
            let mut frame = allocator.allocate(frame_size);
            let header = match seq {
                0 => RecordHeader::Initial { id, size },
                _ => RecordHeader::Continuation {
                    id,
                    seq: seq as u32,
                },
            };
            header.write_to(&mut frame);
            if let Some(chunk) = chunks.next() {
                frame[HEADER_SIZE..HEADER_SIZE + chunk.len()].copy_from_slice(chunk);
            }
            frames.push(frame);
        }

        let frame_index = self.store.frame_count();
        let written = self.store.append(&frames);
        for frame in frames {
            allocator.recycle(frame);
        }
        written?;

        self.end.publish(EndPosition { id, frame_index });
        debug!(
            id = id.0,
            frame_index,
            frames = frame_count,
            bytes = payload.len(),
            "appended record"
        );

        Ok(id)
    }

    // ========================================================================
    // Public API: Read
    // ========================================================================

    /// Read the record with the given id.
    ///
    /// # Errors
    /// - `Error::RecordOutOfRange` if `id <= start()` or `id > end()`
    /// - `Error::Corruption` if the record's frames are inconsistent
    /// - Any frame store error
    pub fn get(&self, id: RecordId) -> Result<Bytes> {
        let end = self.end.load();
        if id <= self.start || id > end.id {
            return Err(Error::RecordOutOfRange {
                id: id.0,
                start: self.start.0,
                end: end.id.0,
            });
        }

        let initial = if id == end.id {
            end.frame_index
        } else if id == self.first() {
            0
        } else {
            self.locate(id, end)?
        };

        self.read_record(id, initial).map(|(payload, _)| payload)
    }

    /// Iterate over every record visible when the iterator is created.
    pub fn iter(&self) -> Records<'_> {
        Records {
            log: self,
            next_id: self.first(),
            next_frame: 0,
            end: self.end.load().id,
        }
    }

    /// Read the record whose Initial frame is at `index`.
    ///
    /// Returns the payload and the number of frames the record spans.
    pub(super) fn read_record(&self, id: RecordId, index: u64) -> Result<(Bytes, u64)> {
        let frame = self.store.get(index)?;
        let size = match RecordHeader::from_bytes(&frame)? {
            RecordHeader::Initial { id: found, size } if found == id => size as usize,
            other => {
                return Err(self.corruption(format!(
                    "expected Initial frame of {} at frame {}, found {:?}",
                    id, index, other
                )))
            }
        };

        let usable = self.usable();
        if size <= usable {
            let payload = frame.bytes().slice(HEADER_SIZE..HEADER_SIZE + size);
            return Ok((payload, 1));
        }

        let mut payload = BytesMut::with_capacity(size);
        payload.extend_from_slice(&frame[HEADER_SIZE..]);

        let mut seq: u32 = 1;
        while payload.len() < size {
            let at = index + u64::from(seq);
            let frame = self.store.get(at)?;
            match RecordHeader::from_bytes(&frame)? {
                RecordHeader::Continuation { id: found, seq: s } if found == id && s == seq => {}
                other => {
                    return Err(self.corruption(format!(
                        "expected Continuation {} of {} at frame {}, found {:?}",
                        seq, id, at, other
                    )))
                }
            }
            let take = (size - payload.len()).min(usable);
            payload.extend_from_slice(&frame[HEADER_SIZE..HEADER_SIZE + take]);
            seq += 1;
        }

        Ok((payload.freeze(), u64::from(seq)))
    }

    /// Read the header at `index` and step back to its record's Initial frame.
    pub(super) fn initial_at(&self, index: u64) -> Result<LocatedRecord> {
        let header = RecordHeader::from_bytes(&self.store.get(index)?)?;
        if let RecordHeader::Initial { id, size } = header {
            return Ok(LocatedRecord { index, id, size });
        }

        let initial = index.checked_sub(header.frame_adjustment()).ok_or_else(|| {
            self.corruption(format!(
                "frame {} claims to be Continuation {} of {}",
                index,
                header.meta(),
                header.id()
            ))
        })?;

        match RecordHeader::from_bytes(&self.store.get(initial)?)? {
            RecordHeader::Initial { id, size } if id == header.id() => Ok(LocatedRecord {
                index: initial,
                id,
                size,
            }),
            other => Err(self.corruption(format!(
                "frame {} points at frame {} as Initial of {}, found {:?}",
                index,
                initial,
                header.id(),
                other
            ))),
        }
    }

    /// Log and build a corruption error.
    pub(super) fn corruption(&self, detail: String) -> Error {
        warn!(path = %self.store.path().display(), %detail, "record log corruption");
        Error::Corruption(detail)
    }

    /// Payload bytes carried by each frame.
    #[inline]
    fn usable(&self) -> usize {
        self.store.frame_size() - HEADER_SIZE
    }

    /// Frames needed for a payload of `len` bytes; at least one.
    #[inline]
    pub(super) fn frames_for(&self, len: usize) -> usize {
        len.div_ceil(self.usable()).max(1)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The id before the first record.
    #[inline]
    pub fn start(&self) -> RecordId {
        self.start
    }

    /// Id of the first record that can exist.
    #[inline]
    pub(super) fn first(&self) -> RecordId {
        self.start.next()
    }

    /// Id of the newest visible record, `start()` when empty.
    pub fn end(&self) -> RecordId {
        self.end.load().id
    }

    /// Id of the most recent record; same as [`RecordLog::end`].
    pub fn last(&self) -> RecordId {
        self.end()
    }

    /// The currently published end position.
    pub fn end_position(&self) -> EndPosition {
        self.end.load()
    }

    /// Number of records stored.
    pub fn size(&self) -> u64 {
        self.end().0 - self.start.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.store.frame_size()
    }

    /// Frames occupied by all records, the size of the file in frames.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.store.frame_count()
    }

    /// Pages sealed so far.
    #[inline]
    pub fn page_count(&self) -> u64 {
        self.store.page_count()
    }

    /// The underlying frame store, for inspecting raw frames in tests.
    #[cfg(test)]
    pub(crate) fn store(&self) -> &FrameStore {
        &self.store
    }

    #[inline]
    pub fn stats(&self) -> &IoStats {
        self.store.stats()
    }

    /// Flush and release the file handle.
    pub fn close(self) -> Result<()> {
        info!(end = self.end().0, "closing record log");
        self.store.close()
    }
}

/// A record's Initial frame and header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct LocatedRecord {
    pub(super) index: u64,
    pub(super) id: RecordId,
    pub(super) size: u32,
}

/// Iterator over the records of a [`RecordLog`], oldest first.
///
/// Created by [`RecordLog::iter`]. Walks frames sequentially, so no search
/// is involved. Stops after the first error.
pub struct Records<'a> {
    log: &'a RecordLog,
    next_id: RecordId,
    next_frame: u64,
    end: RecordId,
}

impl Iterator for Records<'_> {
    type Item = Result<(RecordId, Bytes)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_id > self.end {
            return None;
        }

        let id = self.next_id;
        match self.log.read_record(id, self.next_frame) {
            Ok((payload, span)) => {
                self.next_id = id.next();
                self.next_frame += span;
                Some(Ok((id, payload)))
            }
            Err(e) => {
                self.next_id = self.end.next();
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end.0 + 1).saturating_sub(self.next_id.0) as usize;
        (0, Some(remaining))
    }
}

impl<'a> IntoIterator for &'a RecordLog {
    type Item = Result<(RecordId, Bytes)>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Records<'a> {
        self.iter()
    }
}
