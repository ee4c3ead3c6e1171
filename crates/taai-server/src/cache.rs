//! In-memory response cache for the chat route.
//!
//! Entries are kept in store order: a lookup never refreshes an entry, so once
//! the cache is full the oldest stored entry is the one evicted. Entries older
//! than the TTL are skipped by lookups but stay in place until evicted.

use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use taai_config::CacheConfig;
use taai_core::types::HistoryTurn;

/// Number of trailing history turns that take part in the cache key
pub const KEY_HISTORY_TURNS: usize = 3;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// A cached reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Cache key for a message and its history: the message, a dash, and the
/// compact JSON of the last three history turns (`[]` when there are none).
pub fn cache_key(message: &str, history: &[HistoryTurn]) -> String {
    let tail = &history[history.len().saturating_sub(KEY_HISTORY_TURNS)..];
    let tail_json = serde_json::to_string(tail).unwrap_or_else(|_| "[]".to_string());
    format!("{}-{}", message, tail_json)
}

pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            enabled: true,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let ttl = i64::try_from(config.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let mut cache = Self::new(config.capacity, ttl);
        cache.enabled = config.enabled;
        cache
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        let mut cache = Self::default();
        cache.enabled = false;
        cache
    }

    pub fn lookup(&self, key: &str) -> Option<CacheEntry> {
        self.lookup_at(key, Utc::now())
    }

    /// Fresh entry for `key` as of `now`; stale entries are left in place
    pub fn lookup_at(&self, key: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.lock();
        entries
            .peek(key)
            .filter(|entry| now - entry.timestamp < self.ttl)
            .cloned()
    }

    pub fn store(&self, key: impl Into<String>, response: impl Into<String>) {
        self.store_at(key, response, Utc::now());
    }

    /// Insert or overwrite, evicting the oldest stored entry when full
    pub fn store_at(&self, key: impl Into<String>, response: impl Into<String>, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry {
            response: response.into(),
            timestamp: now,
        };
        self.entries.lock().put(key.into(), entry);
    }

    /// Whether `key` is present, fresh or not
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, Duration::seconds(DEFAULT_TTL_SECS))
    }
}
