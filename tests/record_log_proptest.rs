//! Property tests for the record log.
//!
//! Random record sizes and frame geometries; every appended record must
//! come back byte-for-byte, whether read by id or by iteration.

use diskbuffer::{FrameStore, PoolingAllocator, RecordId, RecordLog, StoreConfig};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::tempdir;

fn payload(seed: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| (seed * 131 + i) as u8).collect()
}

/// (frame_size, frames_per_page) pairs, all with room for a header.
fn geometry() -> impl Strategy<Value = StoreConfig> {
    (prop::sample::select(vec![16usize, 32, 64, 100]), 1usize..6).prop_map(|(frame, fpp)| {
        StoreConfig::builder()
            .frame_size(frame)
            .page_size(frame * fpp)
            .build()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_every_record_reads_back(
        config in geometry(),
        sizes in prop::collection::vec(0usize..600, 1..60),
    ) {
        let dir = tempdir().unwrap();
        let log = RecordLog::open_with(dir.path().join("records.db"), config).unwrap();

        for (i, &len) in sizes.iter().enumerate() {
            let id = log.append(&payload(i, len)).unwrap();
            prop_assert_eq!(id, RecordId(i as u64 + 1));
        }
        prop_assert_eq!(log.size(), sizes.len() as u64);

        for (i, &len) in sizes.iter().enumerate() {
            let read = log.get(RecordId(i as u64 + 1)).unwrap();
            prop_assert_eq!(&read[..], &payload(i, len)[..]);
        }

        let frames: u64 = sizes
            .iter()
            .map(|&len| len.div_ceil(config.frame_size - 13).max(1) as u64)
            .sum();
        prop_assert_eq!(log.frame_count(), frames);
    }

    #[test]
    fn prop_reopen_preserves_records(
        sizes in prop::collection::vec(0usize..300, 1..30),
    ) {
        let config = StoreConfig::builder().page_size(128).frame_size(32).build();
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.db");

        {
            let log = RecordLog::open_with(&path, config).unwrap();
            for (i, &len) in sizes.iter().enumerate() {
                log.append(&payload(i, len)).unwrap();
            }
            log.close().unwrap();
        }

        let log = RecordLog::open_with(&path, config).unwrap();
        prop_assert_eq!(log.end(), RecordId(sizes.len() as u64));

        let mut seen = 0;
        for record in &log {
            let (id, bytes) = record.unwrap();
            let i = (id.0 - 1) as usize;
            prop_assert_eq!(&bytes[..], &payload(i, sizes[i])[..]);
            seen += 1;
        }
        prop_assert_eq!(seen, sizes.len());
    }

    #[test]
    fn prop_pooling_allocator_round_trip(
        sizes in prop::collection::vec(0usize..400, 1..40),
    ) {
        let config = StoreConfig::builder().page_size(192).frame_size(64).build();
        let dir = tempdir().unwrap();
        let store = FrameStore::open_with(
            dir.path().join("records.db"),
            config,
            Arc::new(PoolingAllocator::default()),
        )
        .unwrap();
        let log = RecordLog::from_store(store).unwrap();

        for (i, &len) in sizes.iter().enumerate() {
            log.append(&payload(i, len)).unwrap();
        }
        for (i, &len) in sizes.iter().enumerate().rev() {
            let read = log.get(RecordId(i as u64 + 1)).unwrap();
            prop_assert_eq!(&read[..], &payload(i, len)[..]);
        }
    }
}
