//! OpenWeatherMap API client
//!
//! This module fetches current conditions and the 5-day/3-hour forecast from
//! OpenWeatherMap and folds them into a `WeatherSnapshot`.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

use super::{ForecastDay, WeatherProvider, WeatherSnapshot};

/// Base URL for the OpenWeatherMap 2.5 API
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Number of forecast days in a snapshot
const FORECAST_DAYS: usize = 5;

/// Largest UTC offset accepted from the provider, in seconds
const MAX_UTC_OFFSET_SECS: i64 = 24 * 3600;

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Lookup task panicked before producing a result
    #[error("Lookup task failed: {0}")]
    TaskFailed(String),

    /// Field present but outside its valid range
    #[error("Invalid field in response: {0}")]
    InvalidField(String),
}

/// Client for fetching weather data from OpenWeatherMap
#[derive(Debug, Clone)]
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    /// Create a new client against the public API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: OPENWEATHER_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different base URL (proxies, mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch current conditions and forecast for `city`
    ///
    /// # Arguments
    /// * `city` - City name, sent URL-encoded as the `q` parameter
    /// * `now` - Timestamp recorded as the snapshot's fetch time
    ///
    /// # Returns
    /// * `Ok(WeatherSnapshot)` - Weather for the city
    /// * `Err(ProviderError)` - If either request or parsing fails
    pub async fn fetch_snapshot(
        &self,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, ProviderError> {
        let current: CurrentResponse = self.get_json("weather", city).await?;
        let forecast: ForecastResponse = self.get_json("forecast", city).await?;

        let mut snapshot = parse_current(city, current, now)?;
        snapshot.forecast = fold_forecast(&forecast, now)?;
        Ok(snapshot)
    }

    /// GET `{base_url}/{endpoint}?q=..&appid=..&units=metric` and decode the body
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, city, "requesting weather data");

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl WeatherProvider for OpenWeatherMapClient {
    async fn lookup(
        &self,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, ProviderError> {
        self.fetch_snapshot(city, now).await
    }
}

/// Build the current-conditions part of a snapshot
fn parse_current(
    city: &str,
    response: CurrentResponse,
    now: DateTime<Utc>,
) -> Result<WeatherSnapshot, ProviderError> {
    let summary = response
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MissingField("weather".to_string()))?;

    Ok(WeatherSnapshot {
        city: city.to_string(),
        temperature: response.main.temp,
        humidity: response.main.humidity.clamp(0.0, 100.0).round() as u8,
        wind_speed: response.wind.speed,
        description: title_case(&summary.description),
        icon_code: summary.icon,
        fetched_at: now,
        forecast: Vec::new(),
    })
}

/// Fold 3-hourly forecast entries into daily highs and lows
///
/// Entries are grouped by calendar day in the city's local time. Today is
/// skipped and at most five following days are kept. Each day's icon is taken
/// from the entry closest to local noon. A timezone offset beyond a day is
/// rejected; entries whose local time cannot be represented are skipped.
fn fold_forecast(
    response: &ForecastResponse,
    now: DateTime<Utc>,
) -> Result<Vec<ForecastDay>, ProviderError> {
    let offset = utc_offset(response.city.as_ref().map_or(0, |c| c.timezone))?;
    let today = now
        .checked_add_signed(offset)
        .ok_or_else(|| ProviderError::InvalidField("city.timezone".to_string()))?
        .date_naive();

    // date -> (high, low, icon, distance of icon entry from noon in hours)
    let mut days: BTreeMap<NaiveDate, (f64, f64, String, u32)> = BTreeMap::new();

    for entry in &response.list {
        let Some(utc) = DateTime::<Utc>::from_timestamp(entry.dt, 0) else {
            continue;
        };
        let Some(local) = utc.checked_add_signed(offset) else {
            continue;
        };
        let date = local.date_naive();
        if date <= today {
            continue;
        }

        let icon = entry
            .weather
            .first()
            .map(|w| w.icon.clone())
            .unwrap_or_default();
        let noon_distance = local.hour().abs_diff(12);

        days.entry(date)
            .and_modify(|(high, low, day_icon, best)| {
                *high = high.max(entry.main.temp_max);
                *low = low.min(entry.main.temp_min);
                if noon_distance < *best {
                    *day_icon = icon.clone();
                    *best = noon_distance;
                }
            })
            .or_insert((entry.main.temp_max, entry.main.temp_min, icon, noon_distance));
    }

    Ok(days
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, (high_temp, low_temp, icon_code, _))| ForecastDay {
            date,
            high_temp,
            low_temp,
            icon_code,
        })
        .collect())
}

/// Provider `timezone` (seconds east of UTC) as a duration
fn utc_offset(seconds: i64) -> Result<Duration, ProviderError> {
    if seconds.abs() > MAX_UTC_OFFSET_SECS {
        return Err(ProviderError::InvalidField("city.timezone".to_string()));
    }
    Duration::try_seconds(seconds)
        .ok_or_else(|| ProviderError::InvalidField("city.timezone".to_string()))
}

/// "scattered clouds" -> "Scattered Clouds"
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `/weather` response structure
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    weather: Vec<WeatherSummary>,
    main: CurrentMain,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct WeatherSummary {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct CurrentMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

/// `/forecast` response structure
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
    #[serde(default)]
    city: Option<ForecastCity>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    /// Unix timestamp (UTC)
    dt: i64,
    main: ForecastMain,
    #[serde(default)]
    weather: Vec<WeatherSummary>,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastCity {
    /// Shift in seconds from UTC
    #[serde(default)]
    timezone: i64,
}
