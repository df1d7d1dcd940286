//! Bounded, time-expiring cache of classification results

use intentline_core::Intent;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::trace;

/// Normalize raw input into a cache key (trim + lower-case)
///
/// Both the read and the write path go through this function, so whitespace
/// and case variants of one command always share an entry.
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// LRU cache of classified intents with a time-to-live
///
/// Every operation takes an internal lock; no reference into the storage is
/// ever handed out. Stored intents are always `pending` snapshots.
pub struct IntentCache {
    capacity: usize,
    ttl: Duration,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// access tick -> key, oldest first
    recency: BTreeMap<u64, String>,
    tick: u64,
}

struct CacheEntry {
    intent: Intent,
    inserted_at: Instant,
    last_access: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.last_access);
        Some(entry)
    }

    fn evict_lru(&mut self) -> Option<String> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

impl IntentCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Look up a normalized key; refreshes recency on a hit
    pub fn get(&self, key: &str) -> Option<Intent> {
        let mut state = self.state.lock();

        let expired = match state.entries.get(key) {
            None => return None,
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
        };

        if expired {
            state.remove(key);
            trace!(key, "Cache entry expired");
            return None;
        }

        let tick = state.next_tick();
        let state = &mut *state;
        let entry = state.entries.get_mut(key)?;
        state.recency.remove(&entry.last_access);
        entry.last_access = tick;
        state.recency.insert(tick, key.to_string());

        Some(entry.intent.clone())
    }

    /// Store a classification under a normalized key
    pub fn set(&self, key: &str, intent: &Intent) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.state.lock();

        if state.remove(key).is_none() && state.entries.len() >= self.capacity {
            if let Some(evicted) = state.evict_lru() {
                trace!(key = %evicted, "Evicted least recently used cache entry");
            }
        }

        let tick = state.next_tick();
        state.recency.insert(tick, key.to_string());
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                intent: intent.classification_snapshot(),
                inserted_at: Instant::now(),
                last_access: tick,
            },
        );
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.recency.clear();
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intentline_core::{IntentStatus, IntentType};

    fn intent(text: &str) -> Intent {
        Intent::new(text, IntentType::Create, 0.9)
    }

    fn cache(capacity: usize) -> IntentCache {
        IntentCache::new(capacity, Duration::from_secs(60))
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Create A New Item \n"), "create a new item");
        assert_eq!(normalize_key("create a new item"), normalize_key("CREATE a new ITEM  "));
    }

    #[test]
    fn test_get_and_set() {
        let cache = cache(4);
        let stored = intent("add water");
        cache.set("add water", &stored);

        let hit = cache.get("add water").unwrap();
        assert_eq!(hit.id, stored.id);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = cache(2);
        cache.set("a", &intent("a"));
        cache.set("b", &intent("b"));
        cache.set("c", &intent("c"));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let cache = cache(2);
        cache.set("a", &intent("a"));
        cache.set("b", &intent("b"));

        assert!(cache.get("a").is_some());
        cache.set("c", &intent("c"));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = cache(2);
        cache.set("a", &intent("a"));
        cache.set("b", &intent("b"));
        let replacement = intent("a2");
        cache.set("a", &replacement);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().id, replacement.id);
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = IntentCache::new(4, Duration::from_millis(20));
        cache.set("a", &intent("a"));
        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stores_pending_snapshot() {
        let cache = cache(2);
        let mut dispatched = intent("a");
        dispatched.mark_processing().unwrap();
        dispatched.mark_failed().unwrap();
        cache.set("a", &dispatched);

        assert_eq!(cache.get("a").unwrap().status, IntentStatus::Pending);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = cache(0);
        cache.set("a", &intent("a"));
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_clear() {
        let cache = cache(4);
        cache.set("a", &intent("a"));
        cache.set("b", &intent("b"));
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
