//! Weather cache with a freshness window
//!
//! Provides a `WeatherCache` mapping city names to the last fetched snapshot
//! and the time it was stored.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::data::WeatherSnapshot;

/// Default freshness window (one hour)
pub const FRESHNESS_WINDOW_SECS: i64 = 3600;

/// A cached snapshot and when it was stored
#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: WeatherSnapshot,
    cached_at: DateTime<Utc>,
}

/// Result of peeking into the cache, including metadata about freshness
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData {
    /// The cached snapshot
    pub data: WeatherSnapshot,
    /// When the snapshot was stored
    pub cached_at: DateTime<Utc>,
    /// Whether the entry is outside the freshness window
    pub is_expired: bool,
}

/// Maps city name (case-sensitive) to the last fetched snapshot
///
/// The cache has no eviction policy: it grows with the number of distinct
/// cities looked up during a session.
#[derive(Debug, Clone)]
pub struct WeatherCache {
    entries: HashMap<String, CacheEntry>,
    window: Duration,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherCache {
    /// Creates an empty cache with the default one-hour window
    pub fn new() -> Self {
        Self::with_window(Duration::seconds(FRESHNESS_WINDOW_SECS))
    }

    /// Creates an empty cache with a custom freshness window
    pub fn with_window(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            window,
        }
    }

    /// Returns the snapshot for `city` only if it is still fresh at `now`
    ///
    /// An entry is fresh when `now - cached_at < window`. A stale entry behaves
    /// as a miss but is left in place.
    pub fn get(&self, city: &str, now: DateTime<Utc>) -> Option<WeatherSnapshot> {
        let entry = self.entries.get(city)?;
        if now - entry.cached_at < self.window {
            Some(entry.snapshot.clone())
        } else {
            None
        }
    }

    /// Stores `snapshot` for `city`, replacing any existing entry
    pub fn put(&mut self, city: &str, snapshot: WeatherSnapshot, now: DateTime<Utc>) {
        self.entries.insert(
            city.to_string(),
            CacheEntry {
                snapshot,
                cached_at: now,
            },
        );
    }

    /// Returns the entry for `city` regardless of age
    pub fn peek(&self, city: &str, now: DateTime<Utc>) -> Option<CachedData> {
        self.entries.get(city).map(|entry| CachedData {
            data: entry.snapshot.clone(),
            cached_at: entry.cached_at,
            is_expired: now - entry.cached_at >= self.window,
        })
    }

    /// Number of cities held, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DemoProvider;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    fn snapshot(city: &str, now: DateTime<Utc>) -> WeatherSnapshot {
        DemoProvider::new().snapshot(city, now)
    }

    #[test]
    fn test_get_returns_none_for_missing_city() {
        let cache = WeatherCache::new();
        assert!(cache.get("Paris", t0()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_returns_fresh_entry() {
        let mut cache = WeatherCache::new();
        let data = snapshot("Paris", t0());
        cache.put("Paris", data.clone(), t0());

        let later = t0() + Duration::seconds(3599);
        assert_eq!(cache.get("Paris", later), Some(data));
    }

    #[test]
    fn test_get_treats_entry_at_window_boundary_as_stale() {
        let mut cache = WeatherCache::new();
        cache.put("Paris", snapshot("Paris", t0()), t0());

        assert!(cache.get("Paris", t0() + Duration::seconds(3600)).is_none());
        assert!(cache.get("Paris", t0() + Duration::seconds(7200)).is_none());
    }

    #[test]
    fn test_stale_entry_is_kept() {
        let mut cache = WeatherCache::new();
        let data = snapshot("Paris", t0());
        cache.put("Paris", data.clone(), t0());

        let later = t0() + Duration::hours(2);
        assert!(cache.get("Paris", later).is_none());
        assert_eq!(cache.len(), 1);

        let peeked = cache.peek("Paris", later).expect("stale entry should remain");
        assert_eq!(peeked.data, data);
        assert_eq!(peeked.cached_at, t0());
        assert!(peeked.is_expired);
    }

    #[test]
    fn test_peek_fresh_entry_is_not_expired() {
        let mut cache = WeatherCache::new();
        cache.put("Rome", snapshot("Rome", t0()), t0());

        let peeked = cache.peek("Rome", t0()).unwrap();
        assert!(!peeked.is_expired);
    }

    #[test]
    fn test_put_overwrites_existing_entry() {
        let mut cache = WeatherCache::new();
        cache.put("Paris", snapshot("Paris", t0()), t0());

        let later = t0() + Duration::hours(3);
        let mut newer = snapshot("Paris", later);
        newer.temperature = 9.0;
        cache.put("Paris", newer.clone(), later);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("Paris", later), Some(newer));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut cache = WeatherCache::new();
        cache.put("Paris", snapshot("Paris", t0()), t0());

        assert!(cache.get("paris", t0()).is_none());
        assert!(cache.get("Paris", t0()).is_some());
    }

    #[test]
    fn test_custom_window() {
        let mut cache = WeatherCache::with_window(Duration::seconds(60));
        cache.put("Oslo", snapshot("Oslo", t0()), t0());

        assert!(cache.get("Oslo", t0() + Duration::seconds(59)).is_some());
        assert!(cache.get("Oslo", t0() + Duration::seconds(61)).is_none());
    }
}
