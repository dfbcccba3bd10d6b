//! Passage caching with LRU eviction

use crate::reference::{ReferenceQuery, VerseText};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Fetched passages keyed by the reference that produced them.
pub struct PassageCache {
    cache: Mutex<LruCache<ReferenceQuery, Arc<Vec<VerseText>>>>,
}

impl PassageCache {
    pub fn new(capacity: usize) -> Self {
        let cache = LruCache::new(NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY));
        Self {
            cache: Mutex::new(cache),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<ReferenceQuery, Arc<Vec<VerseText>>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &ReferenceQuery) -> Option<Arc<Vec<VerseText>>> {
        self.lock().get(key).map(Arc::clone)
    }

    /// Store a passage. Empty results are never cached.
    pub fn put(&self, key: ReferenceQuery, verses: Vec<VerseText>) -> Arc<Vec<VerseText>> {
        let verses = Arc::new(verses);
        if !verses.is_empty() {
            self.lock().put(key, Arc::clone(&verses));
        }
        verses
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

impl Default for PassageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}
