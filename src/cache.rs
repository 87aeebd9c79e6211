use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    stored: Instant,
    stored_at: DateTime<Utc>,
}

/// Time-boxed memo of computed values keyed by project id. Expiry is checked
/// on read; expired entries are dropped then.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, CacheEntry<V>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub ttl_secs: u64,
    pub entries: Vec<CacheKeyInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheKeyInfo {
    pub key: String,
    pub stored_at: DateTime<Utc>,
    pub expired: bool,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&mut self, key: &str) -> Option<&V> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|e| e.stored.elapsed() >= self.ttl);
        if expired {
            debug!("Cache entry '{}' expired", key);
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| &e.value)
    }

    /// Store `value`, replacing any previous entry for `key`.
    pub fn insert(&mut self, key: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored: Instant::now(),
                stored_at: Utc::now(),
            },
        );
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resident keys, sorted, with the time each was stored.
    pub fn stats(&self) -> CacheStats {
        let mut entries: Vec<CacheKeyInfo> = self
            .entries
            .iter()
            .map(|(key, e)| CacheKeyInfo {
                key: key.clone(),
                stored_at: e.stored_at,
                expired: e.stored.elapsed() >= self.ttl,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: entries.len(),
            ttl_secs: self.ttl.as_secs(),
            entries,
        }
    }
}
