//! Time-based response cache.
//!
//! Entries are never swept by a timer. Staleness is checked when an entry is
//! read, and stale entries are dropped then (or when the next insert happens).
//! There is no size bound and no LRU ordering.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, inserted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - inserted_at < self.ttl
    }

    /// Get a fresh value, evicting the entry if it has gone stale.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if self.is_fresh(entry.inserted_at, now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace a value, stamped with the current time.
    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        let mut entries = self.lock();
        entries.retain(|_, e| now - e.inserted_at < self.ttl);
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().remove(key).map(|e| e.value)
    }

    /// Drop every stale entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now - e.inserted_at < self.ttl);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache(clock: &Arc<ManualClock>) -> TtlCache<String, u32> {
        TtlCache::new(Duration::hours(1), clock.clone())
    }

    #[test]
    fn test_fresh_entry_is_returned() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache(&clock);

        cache.insert("tt1".to_string(), 7);
        clock.advance(Duration::minutes(59));
        assert_eq!(cache.get(&"tt1".to_string()), Some(7));
    }

    #[test]
    fn test_stale_entry_is_evicted_on_read() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache(&clock);

        cache.insert("tt1".to_string(), 7);
        clock.advance(Duration::hours(1));
        assert_eq!(cache.get(&"tt1".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces_and_restamps() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache(&clock);

        cache.insert("tt1".to_string(), 1);
        clock.advance(Duration::minutes(50));
        cache.insert("tt1".to_string(), 2);
        clock.advance(Duration::minutes(50));
        assert_eq!(cache.get(&"tt1".to_string()), Some(2));
    }

    #[test]
    fn test_insert_sweeps_other_stale_entries() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache(&clock);

        cache.insert("old".to_string(), 1);
        clock.advance(Duration::hours(2));
        cache.insert("new".to_string(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache(&clock);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        clock.advance(Duration::minutes(30));
        cache.insert("c".to_string(), 3);
        clock.advance(Duration::minutes(45));

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.get(&"c".to_string()), Some(3));
    }

    #[test]
    fn test_remove_and_clear() {
        let clock = Arc::new(ManualClock::default());
        let cache = cache(&clock);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.remove(&"a".to_string()), Some(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
