//! Concurrent append/read integrity under ordinary OS threads.

use archive_volume::{
    MemoryPageCache, Page, PageInfo, Volume, VolumeMetadata, VolumeOptions,
};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use tempfile::tempfile;

const THREADS: usize = 4;
const PAGES_PER_THREAD: usize = 8;

fn sealed_page(app: &str, payload: Vec<u8>) -> Page {
    let mut page = Page::with_provenance(app, "stress-host");
    page.set_payload(payload).unwrap();
    page.seal().unwrap();
    page
}

fn distinct_payload(thread_id: usize, seq: usize) -> Vec<u8> {
    format!("thread {} page {} ", thread_id, seq)
        .into_bytes()
        .repeat(32)
}

#[test]
fn test_concurrent_append_integrity() {
    let volume = Arc::new(
        Volume::create(
            tempfile().unwrap(),
            VolumeMetadata::new("stress").with_compression("gzip"),
            VolumeOptions::default(),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let volume = Arc::clone(&volume);
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(PAGES_PER_THREAD);
                for seq in 0..PAGES_PER_THREAD {
                    let page =
                        sealed_page(&format!("writer-{}", thread_id), distinct_payload(thread_id, seq));
                    ids.push(volume.append_page(&page).unwrap());
                }
                ids
            })
        })
        .collect();

    let mut all_ids = Vec::new();
    for handle in handles {
        all_ids.extend(handle.join().unwrap());
    }

    // Every append got a distinct, aligned page id.
    assert_eq!(all_ids.len(), THREADS * PAGES_PER_THREAD);
    assert!(all_ids.iter().all(|id| id % 16 == 0));
    assert_eq!(all_ids.iter().collect::<HashSet<_>>().len(), all_ids.len());

    // A full single-threaded scan from offset 0 finds every page exactly
    // once, with no truncation or interleaving.
    let infos: Vec<PageInfo> = volume
        .read_page_infos(0)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(infos.len(), THREADS * PAGES_PER_THREAD);

    let mut expected: HashSet<Vec<u8>> = (0..THREADS)
        .flat_map(|t| (0..PAGES_PER_THREAD).map(move |s| distinct_payload(t, s)))
        .collect();

    let mut out = Page::new();
    for info in &infos {
        volume.read_page(info.page_id, &mut out, true).unwrap();
        assert!(
            expected.remove(out.payload()),
            "payload at page {} missing or duplicated",
            info.page_id
        );
    }
    assert!(expected.is_empty());
}

#[test]
fn test_concurrent_reads_with_shared_cache() {
    let cache = Arc::new(MemoryPageCache::new(NonZeroUsize::new(256).unwrap()));
    let volume = Arc::new(
        Volume::create(
            tempfile().unwrap(),
            VolumeMetadata::new("read-stress"),
            VolumeOptions::new().with_cache(cache.clone()),
        )
        .unwrap(),
    );

    let ids: Vec<u64> = (0..PAGES_PER_THREAD)
        .map(|seq| {
            volume
                .append_page(&sealed_page("seed", distinct_payload(0, seq)))
                .unwrap()
        })
        .collect();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let volume = Arc::clone(&volume);
            let ids = ids.clone();
            thread::spawn(move || {
                let mut page = Page::new();
                for _ in 0..4 {
                    for (seq, &id) in ids.iter().enumerate() {
                        volume.read_page(id, &mut page, true).unwrap();
                        assert_eq!(page.payload(), distinct_payload(0, seq).as_slice());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Duplicate racing puts are harmless; each id occupies one slot.
    assert_eq!(cache.stats().len, PAGES_PER_THREAD);
}

#[test]
fn test_readers_racing_appends_see_consistent_prefix() {
    let volume = Arc::new(
        Volume::create(
            tempfile().unwrap(),
            VolumeMetadata::new("race"),
            VolumeOptions::default(),
        )
        .unwrap(),
    );

    let writer = {
        let volume = Arc::clone(&volume);
        thread::spawn(move || {
            for seq in 0..32 {
                volume
                    .append_page(&sealed_page("writer", distinct_payload(9, seq)))
                    .unwrap();
            }
        })
    };

    // Readers may observe a shorter chain than the writer has appended,
    // but never a torn page.
    let readers: Vec<_> = (0..2)
        .map(|_| {
            let volume = Arc::clone(&volume);
            thread::spawn(move || {
                let mut max_seen = 0usize;
                for _ in 0..8 {
                    let infos: Vec<PageInfo> = volume
                        .read_page_infos(0)
                        .collect::<Result<Vec<_>, _>>()
                        .unwrap();
                    assert!(infos.len() >= max_seen, "chain shrank between scans");
                    max_seen = infos.len();

                    let mut page = Page::new();
                    for info in &infos {
                        volume.read_page(info.page_id, &mut page, true).unwrap();
                        assert!(!page.payload().is_empty());
                    }
                }
                max_seen
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        assert!(reader.join().unwrap() <= 32);
    }

    let final_count = volume.read_page_infos(0).count();
    assert_eq!(final_count, 32);
    assert_eq!(volume.soft_errors(), 0);
}
