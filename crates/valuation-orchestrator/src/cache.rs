use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use valuation_core::MarketSnapshot;

use crate::clock::Clock;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Memoized market snapshots keyed by symbol. TTL and clock are
/// injected; entries past the TTL are treated as misses. Concurrent
/// writers for the same key may race; last write wins.
pub struct SnapshotCache {
    entries: DashMap<String, CacheEntry<MarketSnapshot>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Fresh snapshot for the symbol, or None on miss/expiry. The age
    /// check happens under the map guard, so no torn read is possible.
    pub fn get(&self, symbol: &str) -> Option<MarketSnapshot> {
        let entry = self.entries.get(symbol)?;
        let age = self.clock.now() - entry.cached_at;
        if age < self.ttl {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, symbol: &str, snapshot: MarketSnapshot) {
        self.entries.insert(
            symbol.to_string(),
            CacheEntry {
                data: snapshot,
                cached_at: self.clock.now(),
            },
        );
    }

    /// Drop every memoized entry. Idempotent; the next evaluation pass
    /// re-fetches everything.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
