//! Offline demonstration provider
//!
//! Produces the same fixed weather for every city, with a forecast that warms
//! by one degree a day. Useful without an API key and for deterministic tests.

use chrono::{DateTime, Days, Utc};

use super::{ForecastDay, ProviderError, WeatherProvider, WeatherSnapshot};

/// Forecast base temperatures; day `i` is `base + i`
const BASE_HIGH: f64 = 22.0;
const BASE_LOW: f64 = 15.0;

/// Provider returning fixed demonstration values
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoProvider;

impl DemoProvider {
    pub fn new() -> Self {
        Self
    }

    /// Builds the demonstration snapshot for `city` as of `now`
    pub fn snapshot(&self, city: &str, now: DateTime<Utc>) -> WeatherSnapshot {
        let today = now.date_naive();
        let forecast = (1..=5u32)
            .map(|i| ForecastDay {
                date: today + Days::new(u64::from(i)),
                high_temp: BASE_HIGH + f64::from(i),
                low_temp: BASE_LOW + f64::from(i),
                icon_code: "01d".to_string(),
            })
            .collect();

        WeatherSnapshot {
            city: city.to_string(),
            temperature: 22.5,
            humidity: 65,
            wind_speed: 5.2,
            description: "Partly Cloudy".to_string(),
            icon_code: "02d".to_string(),
            fetched_at: now,
            forecast,
        }
    }
}

impl WeatherProvider for DemoProvider {
    async fn lookup(
        &self,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, ProviderError> {
        Ok(self.snapshot(city, now))
    }
}
