//! Bounded FIFO cache of encoded utterances.
//!
//! Keyed by the exact request text. Eviction is strictly
//! oldest-inserted-first: a cache hit does not refresh an entry's position,
//! so a popular old entry still ages out. Entries are `Arc`ed so a hit is a
//! pointer clone, not a body copy.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

/// Default capacity, in entries.
pub const DEFAULT_CAPACITY: usize = 100;

pub struct SpeechCache {
    capacity: usize,
    entries: HashMap<String, Arc<Vec<u8>>>,
    insertion_order: VecDeque<String>,
}

impl SpeechCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Look up an utterance by its exact text.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Arc<Vec<u8>>> {
        self.entries.get(text).cloned()
    }

    /// Insert an utterance, evicting the oldest entry at capacity.
    /// Re-inserting an existing key replaces the body without changing the
    /// key's age.
    pub fn insert(&mut self, text: String, wav: Vec<u8>) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.insert(text.clone(), Arc::new(wav)).is_some() {
            return; // key already tracked in insertion order
        }
        self.insertion_order.push_back(text);

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                debug!(key = %oldest, "evicting oldest cache entry");
                self.entries.remove(&oldest);
            }
        }
    }

    /// Number of cached utterances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SpeechCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_returns_the_stored_body() {
        let mut cache = SpeechCache::new(2);
        cache.insert("hello".into(), vec![1, 2, 3]);
        assert_eq!(cache.get("hello").unwrap().as_slice(), &[1, 2, 3]);
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn evicts_oldest_inserted_first() {
        let mut cache = SpeechCache::new(2);
        cache.insert("a".into(), vec![1]);
        cache.insert("b".into(), vec![2]);

        // "a" is read, but FIFO eviction ignores access recency.
        let _ = cache.get("a");
        cache.insert("c".into(), vec![3]);

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn reinsert_replaces_without_growing() {
        let mut cache = SpeechCache::new(2);
        cache.insert("a".into(), vec![1]);
        cache.insert("a".into(), vec![9]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().as_slice(), &[9]);
    }

    #[test]
    fn zero_capacity_caches_nothing() {
        let mut cache = SpeechCache::new(0);
        cache.insert("a".into(), vec![1]);
        assert!(cache.is_empty());
    }
}
