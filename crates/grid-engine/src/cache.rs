//! Bounds-hash-keyed TTL cache for computed grids.
//!
//! Each metric engine owns its own instance; there is no process-wide
//! shared cache. Expired entries are evicted lazily on lookup, with no
//! background sweep.

use lru::LruCache;
use overlay_common::ComputedGrid;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::CacheConfig;

struct CacheEntry {
    grid: Arc<ComputedGrid>,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// Statistics for a grid cache.
///
/// Atomic fields so host UIs can poll without taking the cache lock.
#[derive(Debug, Default)]
pub struct GridCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub expired: AtomicU64,
    pub inserts: AtomicU64,
}

impl GridCacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// TTL cache of computed grids keyed by bounds hash.
pub struct GridCache {
    cache: Arc<RwLock<LruCache<String, CacheEntry>>>,
    ttl: Duration,
    stats: Arc<GridCacheStats>,
}

impl GridCache {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity.max(1)).expect("capacity is at least 1");
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl: config.ttl,
            stats: Arc::new(GridCacheStats::default()),
        }
    }

    /// Look up a grid by bounds hash.
    ///
    /// An entry past its TTL counts as a miss and is removed on the spot.
    pub async fn get(&self, bounds_hash: &str) -> Option<Arc<ComputedGrid>> {
        let mut cache = self.cache.write().await;

        if let Some(entry) = cache.get(bounds_hash) {
            if entry.is_expired(self.ttl) {
                cache.pop(bounds_hash);
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            } else {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.grid.clone())
            }
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Store a computed grid under its bounds hash.
    pub async fn insert(&self, bounds_hash: String, grid: Arc<ComputedGrid>) {
        let mut cache = self.cache.write().await;
        cache.put(
            bounds_hash,
            CacheEntry {
                grid,
                inserted_at: Instant::now(),
            },
        );
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop all entries.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// Number of live entries (expired-but-unswept entries included).
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Shared statistics handle.
    pub fn stats(&self) -> Arc<GridCacheStats> {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::{LatLng, ViewportBounds};

    fn empty_grid() -> Arc<ComputedGrid> {
        Arc::new(ComputedGrid {
            rows: 0,
            cols: 0,
            bounds: ViewportBounds::new(LatLng::new(1.0, 1.0), LatLng::new(0.0, 0.0), None),
            cells: Vec::new(),
        })
    }

    fn config(ttl: Duration) -> CacheConfig {
        CacheConfig { ttl, capacity: 4 }
    }

    #[tokio::test]
    async fn test_hit_before_ttl() {
        let cache = GridCache::new(&config(Duration::from_secs(60)));
        cache.insert("k".to_string(), empty_grid()).await;

        let first = cache.get("k").await.expect("hit");
        let second = cache.get("k").await.expect("hit");
        // Same computed grid, no recompute in between.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_miss_after_ttl() {
        let cache = GridCache::new(&config(Duration::from_millis(20)));
        cache.insert("k".to_string(), empty_grid()).await;

        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.stats().expired.load(Ordering::Relaxed), 1);
        // Lazy eviction removed the entry.
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_key_is_miss() {
        let cache = GridCache::new(&config(Duration::from_secs(60)));
        assert!(cache.get("nope").await.is_none());
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = GridCache::new(&config(Duration::from_secs(60)));
        for i in 0..5 {
            cache.insert(format!("k{}", i), empty_grid()).await;
        }
        // Capacity 4: k0 fell out.
        assert!(cache.get("k0").await.is_none());
        assert!(cache.get("k4").await.is_some());
        assert_eq!(cache.len().await, 4);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = GridCache::new(&config(Duration::from_secs(60)));
        cache.insert("k".to_string(), empty_grid()).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
