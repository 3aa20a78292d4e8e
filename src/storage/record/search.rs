//! Interpolation search from record id to Initial frame index.
//!
//! Records are not a fixed number of frames, so there is no arithmetic
//! mapping from id to frame. The search guesses a frame from the average
//! frames per record, reads the header it lands on, and corrects by the id
//! distance it observes. With roughly uniform record sizes the first or
//! second probe hits; irregular sizes cost extra probes, never a wrong
//! answer.
//!
//! Every probe is clamped into a bracket `[lo, hi)` of frame indices that
//! must contain the target's Initial frame. `lo` is always a record
//! boundary and `hi` the Initial frame of a later record, and every probe
//! strictly shrinks the bracket, so the loop ends after at most as many
//! probes as there are frames in the bracket. An empty bracket can only
//! mean the ids on disk are not the dense, increasing sequence the log
//! writes, and is reported as corruption.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::common::{RecordId, Result};
use crate::storage::record::position::EndPosition;
use crate::storage::record::record_log::RecordLog;

impl RecordLog {
    /// Frame index of `target`'s Initial frame.
    ///
    /// `target` must satisfy `first() < target < end.id`.
    pub(super) fn locate(&self, target: RecordId, end: EndPosition) -> Result<u64> {
        let first = self.first();
        debug_assert!(first < target && target < end.id);

        // Frames and records strictly before the newest record.
        let records = end.id.0 - first.0;
        let average = (end.frame_index / records).max(1);

        let mut lo = 0u64;
        let mut hi = end.frame_index;
        let mut candidate = (target.0 - first.0).saturating_mul(average);
        let mut probes = 0u32;

        loop {
            if lo >= hi {
                return Err(self.corruption(format!(
                    "{} not found: search bracket closed at frame {}",
                    target, lo
                )));
            }
            candidate = candidate.clamp(lo, hi - 1);
            probes += 1;

            let found = self.initial_at(candidate)?;
            trace!(
                target = target.0,
                candidate,
                found = found.id.0,
                initial = found.index,
                lo,
                hi,
                "search probe"
            );

            match found.id.cmp(&target) {
                Ordering::Equal => {
                    debug!(target = target.0, frame = found.index, probes, "located record");
                    return Ok(found.index);
                }
                Ordering::Less => {
                    // Target lies after the record we hit.
                    lo = found.index + self.frames_for(found.size as usize) as u64;
                    let gap = target.0 - found.id.0;
                    candidate = found.index.saturating_add(gap.saturating_mul(average));
                }
                Ordering::Greater => {
                    // Target lies before the record we hit.
                    hi = found.index;
                    let gap = found.id.0 - target.0;
                    candidate = found.index.saturating_sub(gap.saturating_mul(average));
                }
            }
        }
    }
}
