//! LRU cache for fragment indexes.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hic_common::{HicError, Result};
use lru::LruCache;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use super::FragmentIndex;
use crate::types::CacheStats;

/// Cache key: (uppercase chromosome name, enzyme).
type FragmentKey = (String, String);

fn cache_key(chromosome: &str, enzyme: &str) -> FragmentKey {
    (chromosome.to_uppercase(), enzyme.to_string())
}

/// Build-once slot for one key. Builders for the same key wait on the slot,
/// not on the whole cache.
type Slot = Arc<OnceCell<Arc<FragmentIndex>>>;

/// Bounded cache of fragment indexes keyed by (chromosome, enzyme).
///
/// The map lock is held only around map operations. Concurrent detail queries
/// for the same chromosome share one slot and build the index once.
pub struct FragmentIndexCache {
    cache: Mutex<LruCache<FragmentKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl FragmentIndexCache {
    /// Create a cache holding at most `capacity` indexes (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Look up an index without building it.
    pub async fn get(&self, chromosome: &str, enzyme: &str) -> Option<Arc<FragmentIndex>> {
        let mut cache = self.cache.lock().await;
        match cache.get(&cache_key(chromosome, enzyme)).and_then(|slot| slot.get()) {
            Some(index) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(index.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Return the cached index or build, insert and return it.
    ///
    /// A failed build leaves the cache unchanged.
    pub async fn get_or_build<F, Fut>(
        &self,
        chromosome: &str,
        enzyme: &str,
        build: F,
    ) -> Result<Arc<FragmentIndex>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FragmentIndex>>,
    {
        let key = cache_key(chromosome, enzyme);
        let slot = {
            let mut cache = self.cache.lock().await;
            if let Some(slot) = cache.get(&key) {
                if let Some(index) = slot.get() {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(index.clone());
                }
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
            match cache.get(&key) {
                Some(slot) => slot.clone(),
                None => {
                    let slot = Slot::default();
                    self.push(&mut cache, key.clone(), slot.clone());
                    slot
                }
            }
        };

        let built = slot
            .get_or_try_init(|| async move {
                let index = build().await?;
                debug!(
                    chromosome,
                    enzyme,
                    fragments = index.len(),
                    "Built fragment index"
                );
                Ok::<_, HicError>(Arc::new(index))
            })
            .await;

        match built {
            Ok(index) => Ok(index.clone()),
            Err(e) => {
                let mut cache = self.cache.lock().await;
                let empty = cache
                    .peek(&key)
                    .is_some_and(|current| Arc::ptr_eq(current, &slot) && current.get().is_none());
                if empty {
                    cache.pop(&key);
                }
                Err(e)
            }
        }
    }

    /// Insert a prebuilt index, replacing any previous one for the same key.
    pub async fn insert(&self, index: FragmentIndex) -> Arc<FragmentIndex> {
        let key = cache_key(index.chromosome(), index.enzyme());
        let index = Arc::new(index);
        let slot = Slot::new(OnceCell::new_with(Some(index.clone())));
        let mut cache = self.cache.lock().await;
        self.push(&mut cache, key, slot);
        index
    }

    fn push(&self, cache: &mut LruCache<FragmentKey, Slot>, key: FragmentKey, slot: Slot) {
        if let Some((evicted, _)) = cache.push(key.clone(), slot) {
            if evicted != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub async fn contains(&self, chromosome: &str, enzyme: &str) -> bool {
        self.cache
            .lock()
            .await
            .peek(&cache_key(chromosome, enzyme))
            .is_some_and(|slot| slot.initialized())
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len().await,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    /// Number of built indexes.
    pub async fn len(&self) -> usize {
        self.cache
            .lock()
            .await
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hic_common::ChromosomeRef;
    use std::sync::atomic::AtomicUsize;

    fn build(name: &str) -> FragmentIndex {
        FragmentIndex::from_cut_sites(&ChromosomeRef::new(name, 1_000), "HindIII", vec![250, 500])
    }

    #[tokio::test]
    async fn test_builds_once() {
        let cache = FragmentIndexCache::new(4);
        let calls = AtomicUsize::new(0);

        for name in ["chr1", "CHR1", "Chr1"] {
            let index = cache
                .get_or_build(name, "HindIII", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(build("chr1"))
                })
                .await
                .unwrap();
            assert_eq!(index.len(), 3);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.entries), (2, 1, 1));
    }

    #[tokio::test]
    async fn test_enzymes_are_separate_entries() {
        let cache = FragmentIndexCache::new(4);
        cache.insert(build("chr1")).await;
        assert!(cache.contains("chr1", "HindIII").await);
        assert!(!cache.contains("chr1", "MboI").await);
        assert!(cache.get("chr1", "MboI").await.is_none());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = FragmentIndexCache::new(2);
        cache.insert(build("chr1")).await;
        cache.insert(build("chr2")).await;
        cache.get("chr1", "HindIII").await;
        cache.insert(build("chr3")).await;

        assert!(cache.contains("chr1", "HindIII").await);
        assert!(!cache.contains("chr2", "HindIII").await);
        assert_eq!(cache.stats().await.evictions, 1);
    }

    #[tokio::test]
    async fn test_slow_build_does_not_block_other_keys() {
        let cache = Arc::new(FragmentIndexCache::new(4));
        cache.insert(build("chr2")).await;

        let started = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let pending = tokio::spawn({
            let cache = cache.clone();
            let started = started.clone();
            let release = release.clone();
            async move {
                cache
                    .get_or_build("chr1", "HindIII", || async move {
                        started.notify_one();
                        release.notified().await;
                        Ok(build("chr1"))
                    })
                    .await
            }
        });
        started.notified().await;

        let hit = cache.get("chr2", "HindIII").await;
        assert_eq!(hit.map(|index| index.len()), Some(3));
        assert!(!cache.contains("chr1", "HindIII").await);
        assert_eq!(cache.len().await, 1);

        release.notify_one();
        assert_eq!(pending.await.unwrap().unwrap().len(), 3);
        assert!(cache.contains("chr1", "HindIII").await);
    }

    #[tokio::test]
    async fn test_failed_build_not_cached() {
        let cache = FragmentIndexCache::new(2);
        let result = cache
            .get_or_build("chr1", "HindIII", || async {
                Err(HicError::transport("connection refused"))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }
}
