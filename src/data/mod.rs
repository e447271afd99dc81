//! Core data models for the weather dashboard
//!
//! This module contains the weather snapshot types shared by every layer of
//! the application, and the provider abstraction used to obtain them.

pub mod demo;
pub mod weather;

pub use demo::DemoProvider;
pub use weather::{OpenWeatherMapClient, ProviderError, OPENWEATHER_BASE_URL};

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions plus a multi-day forecast for one city at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// City name exactly as the user typed it
    pub city: String,
    /// Current temperature in Celsius
    pub temperature: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Short human-readable description, e.g. "Partly Cloudy"
    pub description: String,
    /// Provider icon token, e.g. "02d"
    pub icon_code: String,
    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,
    /// Upcoming days in chronological order
    pub forecast: Vec<ForecastDay>,
}

/// Forecast for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Daily high in Celsius
    pub high_temp: f64,
    /// Daily low in Celsius
    pub low_temp: f64,
    pub icon_code: String,
}

/// Types of weather conditions, derived from the provider icon code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Showers,
    Thunderstorm,
    Snow,
    Fog,
}

impl WeatherCondition {
    /// Maps an OpenWeatherMap icon code ("01d", "10n", ...) to a condition
    ///
    /// Only the two-digit prefix matters; the trailing day/night letter is ignored.
    /// - 01: clear sky
    /// - 02: few clouds
    /// - 03, 04: scattered/broken clouds
    /// - 09: shower rain
    /// - 10: rain
    /// - 11: thunderstorm
    /// - 13: snow
    /// - 50: mist
    pub fn from_icon_code(code: &str) -> Self {
        match code.get(..2) {
            Some("01") => WeatherCondition::Clear,
            Some("02") => WeatherCondition::PartlyCloudy,
            Some("03") | Some("04") => WeatherCondition::Cloudy,
            Some("09") => WeatherCondition::Showers,
            Some("10") => WeatherCondition::Rain,
            Some("11") => WeatherCondition::Thunderstorm,
            Some("13") => WeatherCondition::Snow,
            Some("50") => WeatherCondition::Fog,
            _ => WeatherCondition::Cloudy, // Default for unknown codes
        }
    }
}

impl WeatherSnapshot {
    /// Condition for the current weather
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_icon_code(&self.icon_code)
    }
}

/// A source of weather snapshots
///
/// Lookups return a `Send` future so they can be moved onto a background task.
pub trait WeatherProvider: Send + Sync + 'static {
    /// Looks up current conditions and forecast for `city`
    fn lookup(
        &self,
        city: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<WeatherSnapshot, ProviderError>> + Send;
}

/// The providers the application can be configured with
#[derive(Debug, Clone)]
pub enum Provider {
    /// Live data from OpenWeatherMap
    OpenWeatherMap(OpenWeatherMapClient),
    /// Fixed demonstration data, no network access
    Demo(DemoProvider),
}

impl WeatherProvider for Provider {
    async fn lookup(
        &self,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, ProviderError> {
        match self {
            Provider::OpenWeatherMap(client) => client.lookup(city, now).await,
            Provider::Demo(demo) => demo.lookup(city, now).await,
        }
    }
}
