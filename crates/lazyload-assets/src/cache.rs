use lru::LruCache;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: usize = 256;

/// Sources that finished loading and can be shown again without a fetch.
///
/// Only the source string is remembered; pixel data lives with the host.
pub struct ImageCache {
    entries: LruCache<String, ()>,
}

impl ImageCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn insert(&mut self, source: &str) {
        self.entries.put(source.to_owned(), ());
    }

    /// Looks up `source`, marking it most recently used on a hit.
    pub fn lookup(&mut self, source: &str) -> bool {
        self.entries.get(source).is_some()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::new(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = ImageCache::new(NonZeroUsize::new(2).expect("non-zero"));
        cache.insert("/a.jpg");
        cache.insert("/b.jpg");
        assert!(cache.lookup("/a.jpg"));
        cache.insert("/c.jpg");

        assert!(cache.contains("/a.jpg"));
        assert!(!cache.contains("/b.jpg"));
        assert!(cache.contains("/c.jpg"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn lookup_misses_unknown_source() {
        let mut cache = ImageCache::default();
        assert!(cache.is_empty());
        assert!(!cache.lookup("/missing.png"));
    }
}
