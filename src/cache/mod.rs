//! In-memory cache of weather snapshots
//!
//! Entries are keyed by the city name exactly as typed and judged against a
//! freshness window. Stale entries are never removed; they read as a miss and
//! are overwritten by the next successful fetch. `peek` still returns them,
//! flagged with `is_expired`, so a caller can show the last known data.

mod manager;

pub use manager::{CachedData, WeatherCache, FRESHNESS_WINDOW_SECS};
