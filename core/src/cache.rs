//! Search result caching with LRU eviction

use crate::matcher::MatchResult;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default cache capacity (number of distinct queries)
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

pub struct SearchCache {
    cache: Mutex<LruCache<String, Arc<Vec<MatchResult>>>>,
}

impl SearchCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<Vec<MatchResult>>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached results for `query`, computing and storing them on a miss.
    pub fn get_or_compute<F>(&self, query: &str, compute: F) -> Arc<Vec<MatchResult>>
    where
        F: FnOnce() -> Vec<MatchResult>,
    {
        {
            let mut cache = self.lock();
            if let Some(results) = cache.get(query) {
                tracing::trace!(query, "search cache hit");
                return Arc::clone(results);
            }
        }

        // Computed outside the lock so slow queries don't block cache hits
        let results = Arc::new(compute());
        self.lock().put(query.to_string(), Arc::clone(&results));
        results
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// (entries, capacity)
    pub fn stats(&self) -> (usize, usize) {
        let cache = self.lock();
        (cache.len(), cache.cap().get())
    }
}
