//! LRU page cache
//!
//! Keeps at most `capacity` pages resident and evicts the least recently used
//! page when a new one is admitted. Pages are handed out as `Arc<Page>`, so a
//! caller that holds a page keeps its bytes alive even if the cache evicts it
//! in the meantime.
//!
//! Misses are deduplicated per page: the first caller to miss becomes the
//! leader and performs the load, later callers for the same page wait on the
//! leader's in-flight entry and then re-check the cache. Loads of different
//! pages proceed in parallel. A failed load is never admitted; the error goes
//! to the leader and waiters retry the load themselves.

use crate::error::Result;
use crate::loader::PageLoader;
use crate::page::Page;
use ahash::AHashMap;
use lru::LruCache;
use parking_lot::{Condvar, Mutex};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Page cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from a resident page
    pub hits: u64,
    /// Lookups that had to load the page
    pub misses: u64,
    /// Successful loads
    pub loads: u64,
    /// Loads that returned an error
    pub load_failures: u64,
    /// Pages pushed out to make room
    pub evictions: u64,
    /// Pages currently resident
    pub resident: usize,
    /// Maximum resident pages
    pub capacity: usize,
}

impl CacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// One page load in progress
#[derive(Debug)]
struct InflightLoad {
    done: Mutex<bool>,
    cv: Condvar,
}

impl InflightLoad {
    fn new() -> Self {
        InflightLoad {
            done: Mutex::new(false),
            cv: Condvar::new(),
        }
    }

    fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.cv.wait(&mut done);
        }
    }

    fn finish(&self) {
        *self.done.lock() = true;
        self.cv.notify_all();
    }
}

/// Retires an in-flight entry and wakes its waiters, also on unwind
struct InflightGuard<'a> {
    inflight: &'a Mutex<AHashMap<u64, Arc<InflightLoad>>>,
    index: u64,
    load: Arc<InflightLoad>,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.inflight.lock().remove(&self.index);
        self.load.finish();
    }
}

enum Role {
    Leader(Arc<InflightLoad>),
    Waiter(Arc<InflightLoad>),
}

/// Bounded, thread-safe loading cache of file pages
pub struct PageCache {
    loader: PageLoader,
    /// Resident pages; lock order is `inflight` then `pages`
    pages: Mutex<LruCache<u64, Arc<Page>>>,
    inflight: Mutex<AHashMap<u64, Arc<InflightLoad>>>,
    capacity: NonZeroUsize,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
}

impl PageCache {
    /// Create a cache holding at most `capacity` pages from `loader`
    pub fn new(loader: PageLoader, capacity: NonZeroUsize) -> Self {
        PageCache {
            loader,
            pages: Mutex::new(LruCache::new(capacity)),
            inflight: Mutex::new(AHashMap::new()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            load_failures: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn loader(&self) -> &PageLoader {
        &self.loader
    }

    /// Get page `index`, loading it on a miss
    pub fn get_page(&self, index: u64) -> Result<Arc<Page>> {
        if let Some(page) = self.lookup(index) {
            return Ok(page);
        }

        loop {
            let role = {
                let mut inflight = self.inflight.lock();
                // A leader may have admitted the page since the first lookup
                if let Some(page) = self.lookup(index) {
                    return Ok(page);
                }
                match inflight.get(&index) {
                    Some(load) => Role::Waiter(Arc::clone(load)),
                    None => {
                        let load = Arc::new(InflightLoad::new());
                        inflight.insert(index, Arc::clone(&load));
                        Role::Leader(load)
                    }
                }
            };

            match role {
                Role::Leader(load) => return self.load_page(index, load),
                Role::Waiter(load) => {
                    trace!("Waiting for in-flight load of page {}", index);
                    load.wait();
                }
            }
        }
    }

    fn lookup(&self, index: u64) -> Option<Arc<Page>> {
        let page = self.pages.lock().get(&index).cloned();
        if page.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("Cache hit for page {}", index);
        }
        page
    }

    fn load_page(&self, index: u64, load: Arc<InflightLoad>) -> Result<Arc<Page>> {
        // Dropped after the page is admitted, so woken waiters find it resident
        let _guard = InflightGuard {
            inflight: &self.inflight,
            index,
            load,
        };
        self.misses.fetch_add(1, Ordering::Relaxed);

        match self.loader.load(index) {
            Ok(page) => {
                self.loads.fetch_add(1, Ordering::Relaxed);
                let page = Arc::new(page);
                self.admit(index, Arc::clone(&page));
                Ok(page)
            }
            Err(e) => {
                self.load_failures.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to load page {}: {}", index, e);
                Err(e)
            }
        }
    }

    fn admit(&self, index: u64, page: Arc<Page>) {
        let mut pages = self.pages.lock();
        // Checked under the pages lock: a concurrent close either sees this
        // page and clears it afterwards, or closed the loader before we got here
        if self.loader.is_closed() {
            trace!("Not admitting page {}: loader closed", index);
            return;
        }
        let displaced = pages.push(index, page);
        drop(pages);
        if let Some((evicted, _)) = displaced {
            if evicted != index {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!("Evicted page {} to admit page {}", evicted, index);
            }
        }
    }

    /// Check residency without touching recency
    pub fn contains(&self, index: u64) -> bool {
        self.pages.lock().contains(&index)
    }

    /// Resident page indices, most recently used first
    pub fn resident_pages(&self) -> Vec<u64> {
        self.pages.lock().iter().map(|(&index, _)| index).collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            resident: self.len(),
            capacity: self.capacity.get(),
        }
    }

    /// Drop all resident pages. Statistics are kept.
    pub fn clear(&self) {
        self.pages.lock().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.pages.lock().is_empty()
    }
}
