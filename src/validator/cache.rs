// In-memory average cache backing the validator's first fallback tier.
//
// Keys are caller-chosen strings (a player id for per-game values, a prefixed
// key for season aggregates). Freshness is judged against an injected "now"
// so the validator stays deterministic under test.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedAverage {
    pub value: f64,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AverageCache {
    entries: Mutex<HashMap<String, CachedAverage>>,
}

impl AverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, overwriting any previous entry under the same key.
    pub fn insert(&self, key: impl Into<String>, value: f64, cached_at: DateTime<Utc>) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.into(), CachedAverage { value, cached_at });
    }

    /// Return the cached value if its age relative to `now` is below
    /// `max_age`. Stale entries are left in place; a later insert overwrites
    /// them.
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>, max_age: Duration) -> Option<f64> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries
            .get(key)
            .filter(|cached| now - cached.cached_at < max_age)
            .map(|cached| cached.value)
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
