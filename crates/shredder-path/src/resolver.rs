//! Memoized path resolution.
//!
//! A [`PathResolver`] is constructed once and shared (usually behind an
//! `Arc`) by every snapshot derived from the same root, so repeated lookups of
//! the same path string skip the parser. The cache is bounded and evicts the
//! earliest inserted entry when full.

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::{parse_path, Path};

/// Default number of memoized path strings.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

#[derive(Debug)]
pub struct PathResolver {
    capacity: usize,
    cache: Mutex<IndexMap<String, Path>>,
}

impl PathResolver {
    /// Create a resolver memoizing at most `capacity` path strings.
    ///
    /// A capacity of `0` disables memoization.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cache: Mutex::new(IndexMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY))),
        }
    }

    /// Resolve a raw path string into segments.
    ///
    /// The result is a pure function of `raw`; the cache only saves the
    /// parse.
    ///
    /// # Example
    ///
    /// ```
    /// use shredder_path::{PathResolver, Segment};
    ///
    /// let resolver = PathResolver::new(2);
    /// let first = resolver.resolve("a[1]");
    /// assert_eq!(first, vec![Segment::key("a"), Segment::Index(1)]);
    /// assert_eq!(resolver.resolve("a[1]"), first);
    /// ```
    pub fn resolve(&self, raw: &str) -> Path {
        if raw.is_empty() {
            return Vec::new();
        }

        let mut cache = self.cache.lock();
        if let Some(path) = cache.get(raw) {
            return path.clone();
        }

        let path = parse_path(raw);
        if self.capacity == 0 {
            return path;
        }
        if cache.len() >= self.capacity {
            if let Some((evicted, _)) = cache.shift_remove_index(0) {
                tracing::trace!(path = %evicted, "path cache full, evicting oldest entry");
            }
        }
        cache.insert(raw.to_string(), path.clone());
        path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of memoized path strings.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Check whether `raw` is currently memoized.
    pub fn is_cached(&self, raw: &str) -> bool {
        self.cache.lock().contains_key(raw)
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;

    #[test]
    fn test_resolve_caches() {
        let resolver = PathResolver::default();
        assert!(resolver.is_empty());
        resolver.resolve("a.b");
        resolver.resolve("a.b");
        assert_eq!(resolver.len(), 1);
        assert!(resolver.is_cached("a.b"));
    }

    #[test]
    fn test_empty_path_not_cached() {
        let resolver = PathResolver::default();
        assert!(resolver.resolve("").is_empty());
        assert_eq!(resolver.len(), 0);
    }

    #[test]
    fn test_fifo_eviction() {
        let resolver = PathResolver::new(2);
        resolver.resolve("a");
        resolver.resolve("b");
        // Hit on "a" does not refresh its position
        resolver.resolve("a");
        resolver.resolve("c");

        assert_eq!(resolver.len(), 2);
        assert!(!resolver.is_cached("a"));
        assert!(resolver.is_cached("b"));
        assert!(resolver.is_cached("c"));
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let resolver = PathResolver::new(0);
        assert_eq!(resolver.resolve("x[0]"), vec![Segment::key("x"), Segment::Index(0)]);
        assert_eq!(resolver.len(), 0);
    }

    #[test]
    fn test_clear() {
        let resolver = PathResolver::new(8);
        resolver.resolve("a");
        resolver.clear();
        assert!(resolver.is_empty());
        assert_eq!(resolver.capacity(), 8);
    }
}
