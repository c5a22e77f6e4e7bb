//! Route match caching
//!
//! Caches the result of matching a URL path against the route table so that
//! repeated `check` / `match_url` calls for the same path skip the pattern
//! scan. Only the match itself is cached; props loaders always run.

use crate::params::RouteParams;
use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cached result of matching one path: leaf index and decoded arguments,
/// or `None` when nothing matched
pub(crate) type CachedMatch = Option<(usize, RouteParams)>;

/// Cache performance statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Path → match cache with LRU eviction
///
/// Default capacity: 256 entries.
#[derive(Debug)]
pub struct MatchCache {
    entries: LruCache<String, CachedMatch>,
    stats: CacheStats,
}

impl MatchCache {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A capacity of zero is bumped to one
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    pub(crate) fn get(&mut self, path: &str) -> Option<CachedMatch> {
        if let Some(entry) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("Match cache hit for path: '{}'", path);
            Some(entry.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Match cache miss for path: '{}'", path);
            None
        }
    }

    pub(crate) fn insert(&mut self, path: String, result: CachedMatch) {
        self.entries.put(path, result);
    }

    pub fn clear(&mut self) {
        trace_log!("Clearing match cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}
