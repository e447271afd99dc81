//! Formatting of weather snapshots for display
//!
//! Shared by the plain-text report and the terminal dashboard. Temperatures
//! arrive in Celsius and are converted to the selected unit here, at the last
//! moment.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::data::{WeatherCondition, WeatherSnapshot};
use crate::units::TemperatureUnit;

/// Weather condition to icon mapping
pub fn condition_icon(condition: WeatherCondition) -> &'static str {
    match condition {
        WeatherCondition::Clear => "\u{2600}",        // ☀
        WeatherCondition::PartlyCloudy => "\u{26C5}", // ⛅
        WeatherCondition::Cloudy => "\u{2601}",       // ☁
        WeatherCondition::Rain => "\u{1F327}",        // 🌧
        WeatherCondition::Showers => "\u{1F326}",     // 🌦
        WeatherCondition::Thunderstorm => "\u{26C8}", // ⛈
        WeatherCondition::Snow => "\u{2744}",         // ❄
        WeatherCondition::Fog => "\u{1F32B}",         // 🌫
    }
}

/// Icon for a provider icon code
pub fn icon_for_code(icon_code: &str) -> &'static str {
    condition_icon(WeatherCondition::from_icon_code(icon_code))
}

/// Current temperature with unit, e.g. "22.5°C"
pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.1}{}", unit.convert(celsius), unit)
}

/// Forecast temperature without the unit letter, e.g. "23.0°"
pub fn format_forecast_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.1}°", unit.convert(celsius))
}

pub fn format_humidity(humidity: u8) -> String {
    format!("Humidity: {}%", humidity)
}

pub fn format_wind(wind_speed: f64) -> String {
    format!("Wind: {} m/s", wind_speed)
}

/// Long date header, e.g. "Monday, July 15, 2024"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Abbreviated weekday, e.g. "Mon"
pub fn format_weekday(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// Renders a snapshot as a plain-text report
///
/// `today` is the date shown in the header.
pub fn render_report(snapshot: &WeatherSnapshot, unit: TemperatureUnit, today: NaiveDate) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", snapshot.city);
    let _ = writeln!(out, "{}", format_long_date(today));
    let _ = writeln!(
        out,
        "{} {}  {}",
        condition_icon(snapshot.condition()),
        format_temperature(snapshot.temperature, unit),
        snapshot.description
    );
    let _ = writeln!(out, "{}", format_humidity(snapshot.humidity));
    let _ = writeln!(out, "{}", format_wind(snapshot.wind_speed));

    if !snapshot.forecast.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}-Day Forecast", snapshot.forecast.len());
        for day in &snapshot.forecast {
            let _ = writeln!(
                out,
                "{:<4} {}  {:>7} / {:>7}",
                format_weekday(day.date),
                icon_for_code(&day.icon_code),
                format_forecast_temperature(day.high_temp, unit),
                format_forecast_temperature(day.low_temp, unit),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DemoProvider;
    use chrono::{TimeZone, Utc};

    fn demo_snapshot() -> WeatherSnapshot {
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        DemoProvider::new().snapshot("Paris", now)
    }

    #[test]
    fn test_format_temperature_celsius() {
        assert_eq!(format_temperature(22.5, TemperatureUnit::Celsius), "22.5°C");
    }

    #[test]
    fn test_format_temperature_fahrenheit() {
        assert_eq!(format_temperature(22.5, TemperatureUnit::Fahrenheit), "72.5°F");
        assert_eq!(format_temperature(-40.0, TemperatureUnit::Fahrenheit), "-40.0°F");
    }

    #[test]
    fn test_format_forecast_temperature() {
        assert_eq!(format_forecast_temperature(23.0, TemperatureUnit::Celsius), "23.0°");
        assert_eq!(format_forecast_temperature(100.0, TemperatureUnit::Fahrenheit), "212.0°");
    }

    #[test]
    fn test_format_details() {
        assert_eq!(format_humidity(65), "Humidity: 65%");
        assert_eq!(format_wind(5.2), "Wind: 5.2 m/s");
    }

    #[test]
    fn test_format_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(format_long_date(date), "Monday, July 15, 2024");
        assert_eq!(format_weekday(date), "Mon");
    }

    #[test]
    fn test_icon_for_code() {
        assert_eq!(icon_for_code("01d"), "\u{2600}");
        assert_eq!(icon_for_code("02d"), "\u{26C5}");
        assert_eq!(icon_for_code("??"), "\u{2601}");
    }

    #[test]
    fn test_render_report_celsius() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let report = render_report(&demo_snapshot(), TemperatureUnit::Celsius, today);

        assert!(report.starts_with("Paris"));
        assert!(report.contains("\u{26C5} 22.5°C"), "icon follows the snapshot condition");
        assert!(report.contains("Monday, July 15, 2024"));
        assert!(report.contains("22.5°C"));
        assert!(report.contains("Partly Cloudy"));
        assert!(report.contains("Humidity: 65%"));
        assert!(report.contains("Wind: 5.2 m/s"));
        assert!(report.contains("5-Day Forecast"));
        assert!(report.contains("Tue"));
        assert!(report.contains("23.0°"));
        assert!(report.contains("16.0°"));
    }

    #[test]
    fn test_render_report_fahrenheit_converts_every_temperature() {
        let today = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let report = render_report(&demo_snapshot(), TemperatureUnit::Fahrenheit, today);

        assert!(report.contains("72.5°F"));
        // Day 1 high 23°C, low 16°C
        assert!(report.contains("73.4°"));
        assert!(report.contains("60.8°"));
        assert!(!report.contains("22.5°C"));
    }

    #[test]
    fn test_render_report_without_forecast() {
        let mut snapshot = demo_snapshot();
        snapshot.forecast.clear();
        let today = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();

        let report = render_report(&snapshot, TemperatureUnit::Celsius, today);

        assert!(!report.contains("Forecast"));
    }
}
