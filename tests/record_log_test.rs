//! Record Log Tests
//!
//! End-to-end behaviour of the record log over a real file: round trips,
//! id assignment, range checks, page boundaries, reopen and readers
//! running alongside the writer.

use diskbuffer::{Error, RecordId, RecordLog, StoreConfig};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

/// 64-byte frames, 4 frames per page; 51 payload bytes per frame.
fn small_config() -> StoreConfig {
    StoreConfig::builder().page_size(256).frame_size(64).build()
}

fn create_log() -> (RecordLog, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let log = RecordLog::open_with(dir.path().join("records.db"), small_config()).unwrap();
    (log, dir)
}

/// Deterministic payload whose bytes depend on `seed`.
fn payload(seed: u64, len: usize) -> Vec<u8> {
    (0..len).map(|i| (seed as usize * 31 + i * 7) as u8).collect()
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_empty_record_on_fresh_file() {
    let (log, _dir) = create_log();

    let id = log.append(b"").unwrap();

    assert_eq!(id, RecordId(1));
    assert_eq!(log.size(), 1);
    assert!(log.get(id).unwrap().is_empty());
}

#[test]
fn test_round_trip_various_sizes() {
    let (log, _dir) = create_log();

    // empty, single frame, exactly one frame, two frames, spanning pages
    let sizes = [0usize, 1, 50, 51, 52, 102, 103, 120, 255, 1000];
    let mut ids = vec![];
    for (i, &len) in sizes.iter().enumerate() {
        ids.push(log.append(&payload(i as u64, len)).unwrap());
    }

    for (i, (&id, &len)) in ids.iter().zip(sizes.iter()).enumerate() {
        let read = log.get(id).unwrap();
        assert_eq!(read.len(), len);
        assert_eq!(&read[..], &payload(i as u64, len)[..]);
    }
}

#[test]
fn test_ids_are_monotonic_from_one() {
    let (log, _dir) = create_log();

    for expected in 1..=20u64 {
        let id = log.append(&payload(expected, 10)).unwrap();
        assert_eq!(id, RecordId(expected));
        assert_eq!(log.end(), id);
        assert_eq!(log.last(), id);
    }
    assert_eq!(log.start(), RecordId::START);
    assert_eq!(log.size(), 20);
}

#[test]
fn test_record_straddling_page_boundary() {
    let (log, _dir) = create_log();

    // 3 frames, leaving one frame on page 0
    log.append(&payload(1, 120)).unwrap();
    // 3 frames: one on page 0, two on page 1
    let straddler = log.append(&payload(2, 150)).unwrap();
    log.append(&payload(3, 10)).unwrap();

    assert_eq!(log.page_count(), 1);
    assert_eq!(&log.get(straddler).unwrap()[..], &payload(2, 150)[..]);
}

#[test]
fn test_record_larger_than_a_page() {
    let (log, _dir) = create_log();

    log.append(&payload(1, 5)).unwrap();
    let big = log.append(&payload(2, 51 * 11 + 7)).unwrap();
    log.append(&payload(3, 5)).unwrap();

    assert_eq!(&log.get(big).unwrap()[..], &payload(2, 51 * 11 + 7)[..]);
}

// ============================================================================
// Range checks
// ============================================================================

#[test]
fn test_get_out_of_range() {
    let (log, _dir) = create_log();

    assert!(matches!(
        log.get(RecordId(1)),
        Err(Error::RecordOutOfRange { id: 1, start: 0, end: 0 })
    ));

    log.append(b"one").unwrap();
    log.append(b"two").unwrap();

    assert!(log.get(RecordId(0)).unwrap_err().is_out_of_range());
    assert!(log.get(RecordId(3)).unwrap_err().is_out_of_range());
    assert!(log.get(RecordId(u64::MAX)).unwrap_err().is_out_of_range());

    // State untouched
    assert_eq!(log.size(), 2);
    assert_eq!(&log.get(RecordId(2)).unwrap()[..], b"two");
}

// ============================================================================
// Interpolation search
// ============================================================================

#[test]
fn test_search_with_irregular_sizes() {
    let (log, _dir) = create_log();

    // Sizes from 0 to 20 frames, deliberately lumpy
    let sizes: Vec<usize> = (0..200u64)
        .map(|i| match i % 7 {
            0 => 0,
            1 => 51 * 20,
            2 => 3,
            3 => 51 * 4 + 1,
            4 => 51,
            5 => 52,
            _ => (i as usize * 13) % 400,
        })
        .collect();

    for (i, &len) in sizes.iter().enumerate() {
        log.append(&payload(i as u64, len)).unwrap();
    }

    for (i, &len) in sizes.iter().enumerate() {
        let id = RecordId(i as u64 + 1);
        assert_eq!(&log.get(id).unwrap()[..], &payload(i as u64, len)[..], "{}", id);
    }
}

#[test]
fn test_search_with_one_huge_first_record() {
    let (log, _dir) = create_log();

    log.append(&payload(0, 51 * 40)).unwrap();
    for i in 1..10u64 {
        log.append(&payload(i, 5)).unwrap();
    }

    for i in 0..10u64 {
        let len = if i == 0 { 51 * 40 } else { 5 };
        assert_eq!(&log.get(RecordId(i + 1)).unwrap()[..], &payload(i, len)[..]);
    }
}

#[test]
fn test_search_with_one_huge_middle_record() {
    let (log, _dir) = create_log();

    for i in 0..20u64 {
        let len = if i == 10 { 51 * 60 } else { 30 };
        log.append(&payload(i, len)).unwrap();
    }

    for i in 0..20u64 {
        let len = if i == 10 { 51 * 60 } else { 30 };
        assert_eq!(&log.get(RecordId(i + 1)).unwrap()[..], &payload(i, len)[..]);
    }
}

// ============================================================================
// Iteration
// ============================================================================

#[test]
fn test_iter_matches_get() {
    let (log, _dir) = create_log();

    for i in 0..30u64 {
        log.append(&payload(i, (i as usize * 37) % 300)).unwrap();
    }

    let mut count = 0;
    for record in &log {
        let (id, bytes) = record.unwrap();
        assert_eq!(bytes, log.get(id).unwrap());
        count += 1;
    }
    assert_eq!(count, 30);
}

#[test]
fn test_iter_on_empty_log() {
    let (log, _dir) = create_log();
    assert!(log.is_empty());
    assert_eq!(log.iter().count(), 0);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_reopen_recovers_end_and_continues_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.db");

    {
        let log = RecordLog::open_with(&path, small_config()).unwrap();
        for i in 0..10u64 {
            log.append(&payload(i, (i as usize * 29) % 200)).unwrap();
        }
        log.close().unwrap();
    }

    let log = RecordLog::open_with(&path, small_config()).unwrap();
    assert_eq!(log.end(), RecordId(10));
    assert_eq!(log.size(), 10);

    for i in 0..10u64 {
        let read = log.get(RecordId(i + 1)).unwrap();
        assert_eq!(&read[..], &payload(i, (i as usize * 29) % 200)[..]);
    }

    let id = log.append(b"after reopen").unwrap();
    assert_eq!(id, RecordId(11));
    assert_eq!(&log.get(id).unwrap()[..], b"after reopen");
}

#[test]
fn test_truncated_file_fails_to_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.db");

    {
        let log = RecordLog::open_with(&path, small_config()).unwrap();
        log.append(&payload(1, 120)).unwrap();
    }

    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(64 * 3 - 5).unwrap();
    drop(file);

    let result = RecordLog::open_with(&path, small_config());
    assert!(matches!(result, Err(Error::Corruption(_))));
}

#[test]
fn test_default_geometry() {
    let dir = tempdir().unwrap();
    let log = RecordLog::open(dir.path().join("records.db")).unwrap();

    assert_eq!(log.frame_size(), diskbuffer::DEFAULT_FRAME_SIZE);
    let id = log.append(&payload(9, 5000)).unwrap();
    assert_eq!(log.frame_count(), 3);
    assert_eq!(&log.get(id).unwrap()[..], &payload(9, 5000)[..]);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_readers_only_see_complete_records() {
    let (log, _dir) = create_log();
    let log = Arc::new(log);
    log.append(&payload(0, 10)).unwrap();

    let writer = {
        let log = Arc::clone(&log);
        thread::spawn(move || {
            for i in 1..150u64 {
                log.append(&payload(i, (i as usize * 17) % 250)).unwrap();
            }
        })
    };

    let mut readers = vec![];
    for r in 0..4u64 {
        let log = Arc::clone(&log);
        readers.push(thread::spawn(move || {
            for n in 0..300u64 {
                let end = log.end().0;
                let i = (n * 7 + r) % end;
                let expected_len = if i == 0 { 10 } else { (i as usize * 17) % 250 };
                let read = log.get(RecordId(i + 1)).unwrap();
                assert_eq!(&read[..], &payload(i, expected_len)[..]);
            }
        }));
    }

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(log.size(), 150);
}
