//! In-memory image cache.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::Fingerprint;

/// Default maximum number of decoded images kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 100;

/// Bounded cache of decoded images keyed by fingerprint.
///
/// The bound is enforced with LRU eviction. Every operation takes a short
/// synchronous lock that is never held across an await point.
pub struct MemoryImageCache {
    cache: Mutex<LruCache<Fingerprint, Arc<image::DynamicImage>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }

    /// Looks up an image, promoting it in the LRU order.
    pub fn get(&self, fp: &Fingerprint) -> Option<Arc<image::DynamicImage>> {
        let found = self.cache.lock().get(fp).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(fingerprint = %fp, "Memory cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(fingerprint = %fp, "Memory cache miss");
        }
        found
    }

    /// Peeks at an image without promoting it or touching statistics.
    pub fn peek(&self, fp: &Fingerprint) -> Option<Arc<image::DynamicImage>> {
        self.cache.lock().peek(fp).cloned()
    }

    /// Stores an image, replacing any previous entry for the fingerprint.
    pub fn put(&self, fp: Fingerprint, image: Arc<image::DynamicImage>) {
        debug!(fingerprint = %fp, "Storing image in memory cache");
        self.cache.lock().put(fp, image);
    }

    /// Removes one entry. Absent entries are ignored.
    pub fn remove(&self, fp: &Fingerprint) {
        if self.cache.lock().pop(fp).is_some() {
            debug!(fingerprint = %fp, "Removed image from memory cache");
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.cache.lock().clear();
        debug!("Cleared memory image cache");
    }

    /// Returns the number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fingerprint;

    fn img(w: u32, h: u32) -> Arc<image::DynamicImage> {
        Arc::new(image::DynamicImage::new_rgb8(w, h))
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = MemoryImageCache::new(10);
        let fp = fingerprint("test1");

        cache.put(fp.clone(), img(100, 80));
        let retrieved = cache.get(&fp).unwrap();

        assert_eq!(retrieved.width(), 100);
        assert_eq!(retrieved.height(), 80);
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryImageCache::new(10);
        assert!(cache.get(&fingerprint("nonexistent")).is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let cache = MemoryImageCache::new(10);
        let fp = fingerprint("test1");

        cache.put(fp.clone(), img(1, 1));
        cache.remove(&fp);
        assert!(cache.get(&fp).is_none());

        cache.remove(&fp);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_removes_all() {
        let cache = MemoryImageCache::new(10);
        let keys: Vec<_> = ["a", "b", "c"].iter().map(|k| fingerprint(k)).collect();
        for fp in &keys {
            cache.put(fp.clone(), img(2, 2));
        }

        cache.clear();

        for fp in &keys {
            assert!(cache.get(fp).is_none());
        }
    }

    #[test]
    fn test_capacity_bound_evicts_least_recent() {
        let cache = MemoryImageCache::new(2);
        let (a, b, c) = (fingerprint("a"), fingerprint("b"), fingerprint("c"));

        cache.put(a.clone(), img(1, 1));
        cache.put(b.clone(), img(1, 1));
        let _ = cache.get(&a);
        cache.put(c.clone(), img(1, 1));

        assert_eq!(cache.len(), 2);
        assert!(cache.peek(&a).is_some());
        assert!(cache.peek(&b).is_none());
        assert!(cache.peek(&c).is_some());
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryImageCache::new(10);
        let fp = fingerprint("test1");
        cache.put(fp.clone(), img(10, 10));

        let _ = cache.get(&fp);
        let _ = cache.get(&fingerprint("missing"));
        let _ = cache.peek(&fp);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let cache = MemoryImageCache::new(0);
        cache.put(fingerprint("x"), img(1, 1));
        assert_eq!(cache.len(), 1);
    }
}
