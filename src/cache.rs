//! Optional page cache: (volume id, page id) -> (PageInfo, decoded bytes).
//!
//! The cache always stores decoded payloads so later reads skip the codec
//! pipeline entirely. It is an external shared resource the volume treats
//! as eventually-benign-racy: content keyed by a given page id never
//! changes, so concurrent duplicate puts are harmless.

use crate::page::PageInfo;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Keyed store consulted by the volume before touching the stream.
pub trait PageCache: Send + Sync {
    /// Whether the cache should be consulted or populated at all.
    fn enabled(&self) -> bool;

    fn try_get(&self, volume_id: &str, page_id: u64) -> Option<(PageInfo, Arc<[u8]>)>;

    fn put(&self, volume_id: &str, page_id: u64, info: PageInfo, payload: Arc<[u8]>);
}

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// In-memory, capacity-bounded LRU page cache.
///
/// The internal lock is the cache's own; lookups never touch any volume's
/// stream lock.
pub struct MemoryPageCache {
    entries: Mutex<LruCache<(String, u64), (PageInfo, Arc<[u8]>)>>,
    enabled: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryPageCache {
    /// Create a cache holding at most `capacity` pages.
    pub fn new(capacity: NonZeroUsize) -> Self {
        MemoryPageCache {
            entries: Mutex::new(LruCache::new(capacity)),
            enabled: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.entries.lock().len(),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl PageCache for MemoryPageCache {
    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn try_get(&self, volume_id: &str, page_id: u64) -> Option<(PageInfo, Arc<[u8]>)> {
        if !self.enabled() {
            return None;
        }

        let hit = self
            .entries
            .lock()
            .get(&(volume_id.to_string(), page_id))
            .cloned();
        match hit {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, volume_id: &str, page_id: u64, info: PageInfo, payload: Arc<[u8]>) {
        if !self.enabled() {
            return;
        }
        self.entries
            .lock()
            .put((volume_id.to_string(), page_id), (info, payload));
    }
}
