//! Command-line interface parsing for the weather dashboard
//!
//! This module handles parsing of CLI arguments using clap. With no city or
//! favorites command the interactive dashboard opens; otherwise the requested
//! one-shot action runs and the program exits.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::units::TemperatureUnit;

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// The specified unit name is not recognized
    #[error("Invalid unit: '{0}'. Valid units: c, celsius, metric, f, fahrenheit, imperial")]
    InvalidUnit(String),

    /// A city argument was given but is blank
    #[error("Please enter a city name")]
    EmptyCity,
}

/// Weather Dashboard - current conditions, 5-day forecasts and favorite cities
#[derive(Parser, Debug)]
#[command(name = "weatherdash")]
#[command(about = "Current weather, 5-day forecasts and favorite cities")]
#[command(version)]
pub struct Cli {
    /// City to look up; prints a report and exits instead of opening the dashboard
    ///
    /// Examples:
    ///   weatherdash Paris
    ///   weatherdash "New York" --units f
    pub city: Option<String>,

    /// Temperature unit for display: c/celsius or f/fahrenheit
    #[arg(short, long, value_name = "UNIT")]
    pub units: Option<String>,

    /// Print snapshots as JSON instead of a text report
    #[arg(long)]
    pub json: bool,

    /// Print a report for every favorite city
    #[arg(long, conflicts_with = "city")]
    pub all: bool,

    /// List favorite cities
    #[arg(long, conflicts_with_all = ["city", "all", "add", "remove"])]
    pub list: bool,

    /// Add a city to the favorites
    #[arg(long, value_name = "CITY", conflicts_with_all = ["city", "all", "remove"])]
    pub add: Option<String>,

    /// Remove a city from the favorites
    #[arg(long, value_name = "CITY", conflicts_with_all = ["city", "all"])]
    pub remove: Option<String>,

    /// Use built-in demonstration data instead of OpenWeatherMap
    #[arg(long)]
    pub demo: bool,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Favorites file (default: favorites.txt in the working directory)
    #[arg(long, env = "WEATHERDASH_FAVORITES", value_name = "PATH")]
    pub favorites: Option<PathBuf>,

    /// Configuration file (default: config.json in the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What the program should do after startup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Open the interactive dashboard
    #[default]
    Dashboard,
    /// Print weather for one city
    Report(String),
    /// Print weather for every favorite
    ReportFavorites,
    ListFavorites,
    AddFavorite(String),
    RemoveFavorite(String),
}

impl Mode {
    /// Whether this mode needs a weather provider
    pub fn needs_provider(&self) -> bool {
        matches!(
            self,
            Mode::Dashboard | Mode::Report(_) | Mode::ReportFavorites
        )
    }
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupConfig {
    pub mode: Mode,
    /// Unit override (if specified)
    pub units: Option<TemperatureUnit>,
    /// Whether reports are printed as JSON
    pub json: bool,
}

/// Parses a unit string argument into a TemperatureUnit.
///
/// # Arguments
/// * `s` - The unit string from CLI
///
/// # Returns
/// * `Ok(TemperatureUnit)` if the string matches a valid unit
/// * `Err(CliError::InvalidUnit)` if the string doesn't match
pub fn parse_unit_arg(s: &str) -> Result<TemperatureUnit, CliError> {
    s.parse().map_err(CliError::InvalidUnit)
}

/// Trims a city argument, rejecting blank names
fn city_arg(s: &str) -> Result<String, CliError> {
    let city = s.trim();
    if city.is_empty() {
        return Err(CliError::EmptyCity);
    }
    Ok(city.to_string())
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid unit or blank city was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let units = cli.units.as_deref().map(parse_unit_arg).transpose()?;

        let mode = if let Some(city) = &cli.add {
            Mode::AddFavorite(city_arg(city)?)
        } else if let Some(city) = &cli.remove {
            Mode::RemoveFavorite(city_arg(city)?)
        } else if cli.list {
            Mode::ListFavorites
        } else if cli.all {
            Mode::ReportFavorites
        } else if let Some(city) = &cli.city {
            Mode::Report(city_arg(city)?)
        } else {
            Mode::Dashboard
        };

        Ok(StartupConfig {
            mode,
            units,
            json: cli.json,
        })
    }
}
