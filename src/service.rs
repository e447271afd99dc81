//! Weather service: the application state behind every front end
//!
//! `WeatherService` owns the snapshot cache, the favorites list and the
//! provider. Front ends call into it with a city name and the current time,
//! and get back snapshots ready to render.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CachedData, WeatherCache};
use crate::data::{ProviderError, WeatherProvider, WeatherSnapshot};
use crate::favorites::Favorites;
use crate::worker::{FetchMessage, FetchWorker};

/// Errors surfaced to the user when weather cannot be shown
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network failure, non-success status, or an unreadable response
    #[error("Could not fetch weather data for {0}")]
    Unavailable(String),
}

/// Cache, favorites and provider for one application instance
#[derive(Debug)]
pub struct WeatherService<P> {
    provider: Arc<P>,
    cache: WeatherCache,
    favorites: Favorites,
}

impl<P: WeatherProvider> WeatherService<P> {
    pub fn new(provider: P, cache: WeatherCache, favorites: Favorites) -> Self {
        Self {
            provider: Arc::new(provider),
            cache,
            favorites,
        }
    }

    #[cfg(test)]
    fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Returns weather for `city`, from the cache when fresh
    ///
    /// On a cache miss the provider is queried and a successful result is
    /// stored before being returned. Provider failures are logged and reported
    /// as `FetchError::Unavailable`; the cache is left untouched.
    pub async fn fetch_weather(
        &mut self,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, FetchError> {
        if let Some(snapshot) = self.cached(city, now) {
            return Ok(snapshot);
        }

        let result = self.provider.lookup(city, now).await;
        self.store(city, result, now)
    }

    /// Fresh cached snapshot for `city`, if any
    pub fn cached(&self, city: &str, now: DateTime<Utc>) -> Option<WeatherSnapshot> {
        let hit = self.cache.get(city, now);
        if hit.is_some() {
            debug!(city, "weather cache hit");
        }
        hit
    }

    /// Last snapshot stored for `city`, however old
    pub fn last_known(&self, city: &str, now: DateTime<Utc>) -> Option<CachedData> {
        self.cache.peek(city, now)
    }

    /// Starts a background lookup for `city`
    ///
    /// The result comes back through `worker` and must be passed to `apply`.
    pub fn spawn_lookup(&self, worker: &mut FetchWorker, city: &str, now: DateTime<Utc>) {
        worker.spawn(Arc::clone(&self.provider), city, now);
    }

    /// Applies a finished background lookup to the cache
    pub fn apply(
        &mut self,
        message: FetchMessage,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, FetchError> {
        self.store(&message.city, message.result, now)
    }

    /// Fetches several cities, looking up all cache misses concurrently
    ///
    /// Results are returned, and written to the cache, in input order.
    pub async fn fetch_many(
        &mut self,
        cities: &[String],
        now: DateTime<Utc>,
    ) -> Vec<(String, Result<WeatherSnapshot, FetchError>)> {
        let misses: Vec<&String> = cities
            .iter()
            .filter(|city| self.cached(city, now).is_none())
            .collect();

        let lookups = futures::future::join_all(
            misses.iter().map(|city| self.provider.lookup(city, now)),
        )
        .await;
        let mut fetched: Vec<_> = misses.into_iter().zip(lookups).collect();

        let mut results = Vec::with_capacity(cities.len());
        for city in cities {
            let result = match fetched.iter().position(|(c, _)| *c == city) {
                Some(index) => {
                    let (_, lookup) = fetched.remove(index);
                    self.store(city, lookup, now)
                }
                None => self
                    .cached(city, now)
                    .ok_or_else(|| FetchError::Unavailable(city.clone())),
            };
            results.push((city.clone(), result));
        }
        results
    }

    /// Favorite cities in display order
    pub fn list_favorites(&self) -> &[String] {
        self.favorites.list()
    }

    /// Adds a favorite; no-op for empty or duplicate names
    pub fn add_favorite(&mut self, city: &str) -> bool {
        self.favorites.add(city)
    }

    /// Removes a favorite; no-op when absent
    pub fn remove_favorite(&mut self, city: &str) -> bool {
        self.favorites.remove(city)
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.favorites.contains(city)
    }

    /// Writes a provider result to the cache, or logs and collapses the error
    fn store(
        &mut self,
        city: &str,
        result: Result<WeatherSnapshot, ProviderError>,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, FetchError> {
        match result {
            Ok(snapshot) => {
                self.cache.put(city, snapshot.clone(), now);
                info!(city, "stored weather snapshot");
                Ok(snapshot)
            }
            Err(e) => {
                warn!(city, error = %e, "weather lookup failed");
                Err(FetchError::Unavailable(city.to_string()))
            }
        }
    }
}
