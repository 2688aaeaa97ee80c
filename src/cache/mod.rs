//! Result cache for resolved lookups.
//!
//! [`ResultCache`] maps a [`QueryKey`] to the card the selector picked for
//! it. Only successful, unambiguous lookups are stored.
//!
//! # Retention
//!
//! Entries carry their insertion time but are never expired or evicted:
//! the cache grows for the lifetime of the process. The moka cache is built
//! without a capacity or TTL, which makes it a plain concurrent map with
//! lock-free reads.

use std::sync::Arc;
use std::time::SystemTime;

use moka::sync::Cache;
use tracing::debug;

use crate::query::QueryKey;
use crate::telemetry;
use crate::types::Card;

/// One cached card and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    card: Arc<Card>,
    inserted_at: SystemTime,
}

impl CacheEntry {
    pub fn card(&self) -> &Arc<Card> {
        &self.card
    }

    pub fn inserted_at(&self) -> SystemTime {
        self.inserted_at
    }
}

/// Thread-safe, unbounded store of resolved cards.
pub struct ResultCache {
    entries: Cache<QueryKey, CacheEntry>,
}

impl ResultCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Look up the card resolved for `key`.
    ///
    /// Returns `None` on cache miss. Emits cache hit/miss metrics.
    pub fn get(&self, key: &QueryKey) -> Option<Arc<Card>> {
        match self.entries.get(key) {
            Some(entry) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                debug!(%key, "cache hit");
                Some(entry.card)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Full entry for `key`, including its insertion time. No metrics.
    pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.entries.get(key)
    }

    /// Store the card resolved for `key`.
    ///
    /// Entries are immutable: if `key` is already present the existing
    /// entry is kept and the new card is dropped.
    pub fn put(&self, key: QueryKey, card: Arc<Card>) {
        self.entries.entry(key).or_insert_with(|| CacheEntry {
            card,
            inserted_at: SystemTime::now(),
        });
    }

    /// Snapshot of up to `limit` cached cards, in no particular order.
    pub fn cards(&self, limit: usize) -> Vec<Arc<Card>> {
        self.entries
            .iter()
            .take(limit)
            .map(|(_, entry)| entry.card)
            .collect()
    }

    /// Number of entries currently in the cache.
    ///
    /// Flushes moka's pending write bookkeeping first so the count
    /// includes every completed `put`.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> QueryKey {
        QueryKey::new(name, "1", 100).unwrap()
    }

    #[test]
    fn miss_then_hit() {
        let cache = ResultCache::new();
        assert!(cache.get(&key("Bulbasaur")).is_none());

        cache.put(key("Bulbasaur"), Arc::new(Card::new("Bulbasaur", "1")));
        let hit = cache.get(&key("bulbasaur")).unwrap();
        assert_eq!(hit.name, "Bulbasaur");
    }

    #[test]
    fn first_write_wins() {
        let cache = ResultCache::new();
        cache.put(key("Mew"), Arc::new(Card::new("Mew", "1")));
        let first = cache.entry(&key("Mew")).unwrap();

        cache.put(key("Mew"), Arc::new(Card::new("Mew ex", "1")));
        let second = cache.entry(&key("Mew")).unwrap();

        assert_eq!(second.card().name, "Mew");
        assert_eq!(first.inserted_at(), second.inserted_at());
    }

    #[test]
    fn cards_snapshot_respects_limit() {
        let cache = ResultCache::new();
        for name in ["A", "B", "C"] {
            cache.put(key(name), Arc::new(Card::new(name, "1")));
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.cards(2).len(), 2);
        assert_eq!(cache.cards(20).len(), 3);
    }

    #[test]
    fn len_tracks_distinct_keys() {
        let cache = ResultCache::new();
        assert!(cache.is_empty());
        for n in 0..50 {
            cache.put(key(&format!("Unown {n}")), Arc::new(Card::new("Unown", "1")));
            cache.put(key(&format!("unown {n}")), Arc::new(Card::new("Unown", "1")));
        }
        assert_eq!(cache.len(), 50);
    }
}
