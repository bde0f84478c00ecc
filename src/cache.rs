// Process-wide response cache for StatsAPI JSON payloads.
//
// Entries expire on read: `get` drops anything past its deadline, so a stale
// payload is never served. TTLs vary per endpoint (live game feeds churn every
// few seconds, standings barely move) and come from `CacheTtls`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
}

#[derive(Debug)]
struct CachedResponse {
    payload: Value,
    expires_at: Instant,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached payload. Expired entries are evicted and treated as
    /// misses.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(cached) if cached.expires_at > Instant::now() => {
                debug!(key, "response cache hit");
                Some(cached.payload.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a payload with a time-to-live. Overwrites any existing entry.
    pub fn set(&self, key: impl Into<String>, payload: Value, ttl: Duration) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(
            key.into(),
            CachedResponse {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().expect("cache mutex poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_and_returns_before_expiry() {
        let cache = ResponseCache::new();
        cache.set("games_2025-06-01", json!({"totalGames": 15}), Duration::from_secs(300));

        let hit = cache.get("games_2025-06-01").expect("fresh entry");
        assert_eq!(hit["totalGames"], 15);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entry_is_a_miss_and_evicted() {
        let cache = ResponseCache::new();
        cache.set("live_game_745001", json!({"gamePk": 745001}), Duration::ZERO);

        assert!(cache.get("live_game_745001").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_existing_key() {
        let cache = ResponseCache::new();
        cache.set("standings_2025-06-01", json!({"v": 1}), Duration::from_secs(60));
        cache.set("standings_2025-06-01", json!({"v": 2}), Duration::from_secs(60));

        assert_eq!(cache.get("standings_2025-06-01").unwrap()["v"], 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ResponseCache::new();
        cache.set("a", json!(1), Duration::from_secs(60));
        cache.set("b", json!(2), Duration::from_secs(60));
        cache.clear();
        assert!(cache.is_empty());
    }
}
