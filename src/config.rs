//! Application configuration management.
//!
//! Settings are layered: built-in defaults, then an optional JSON file, then
//! environment variables and command-line flags (both resolved by clap).
//!
//! The default file lives at `<platform config dir>/weatherdash/config.json`,
//! e.g. `~/.config/weatherdash/config.json` on Linux.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{WeatherCache, FRESHNESS_WINDOW_SECS};
use crate::cli::{Cli, StartupConfig};
use crate::data::{DemoProvider, OpenWeatherMapClient, Provider, OPENWEATHER_BASE_URL};
use crate::favorites::{FavoritesStore, DEFAULT_FAVORITES_FILE};
use crate::units::TemperatureUnit;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "weatherdash";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No OpenWeatherMap API key. Set OPENWEATHER_API_KEY, pass --api-key, or use --demo")]
    MissingApiKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub favorites_file: PathBuf,
    pub units: TemperatureUnit,
    pub cache_ttl_secs: i64,
    /// Use the offline demonstration provider
    pub demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            favorites_file: PathBuf::from(DEFAULT_FAVORITES_FILE),
            units: TemperatureUnit::Celsius,
            cache_ttl_secs: FRESHNESS_WINDOW_SECS,
            demo: false,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the default location
    ///
    /// An explicit path must exist. The default file is optional and
    /// missing means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reads a JSON config file; absent fields take their defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<config dir>/weatherdash/config.json`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", APP_NAME)?;
        Some(project_dirs.config_dir().join(CONFIG_FILE))
    }

    /// Directory for log files, if a home directory is known
    pub fn log_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", APP_NAME)?;
        Some(project_dirs.cache_dir().to_path_buf())
    }

    /// Overrides file settings with command-line flags and environment
    pub fn apply_cli(&mut self, cli: &Cli, startup: &StartupConfig) {
        if let Some(key) = &cli.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(path) = &cli.favorites {
            self.favorites_file = path.clone();
        }
        if let Some(units) = startup.units {
            self.units = units;
        }
        if cli.demo {
            self.demo = true;
        }
    }

    /// Freshness window for the snapshot cache
    ///
    /// Negative values clamp to zero; values beyond what a duration can hold
    /// clamp to the largest duration.
    pub fn cache_window(&self) -> Duration {
        Duration::try_seconds(self.cache_ttl_secs.max(0)).unwrap_or(Duration::MAX)
    }

    pub fn cache(&self) -> WeatherCache {
        WeatherCache::with_window(self.cache_window())
    }

    pub fn favorites_store(&self) -> FavoritesStore {
        FavoritesStore::new(&self.favorites_file)
    }

    /// Builds the configured weather provider
    ///
    /// Fails when live data is requested without an API key.
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        if self.demo {
            return Ok(Provider::Demo(DemoProvider::new()));
        }
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        Ok(Provider::OpenWeatherMap(
            OpenWeatherMapClient::new(key).with_base_url(&self.base_url),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, OPENWEATHER_BASE_URL);
        assert_eq!(config.favorites_file, PathBuf::from("favorites.txt"));
        assert_eq!(config.units, TemperatureUnit::Celsius);
        assert_eq!(config.cache_window(), Duration::seconds(3600));
        assert!(!config.demo);
    }

    #[test]
    fn test_load_from_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"api_key": "secret", "units": "fahrenheit"}"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.units, TemperatureUnit::Fahrenheit);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.base_url, OPENWEATHER_BASE_URL);
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.json");
        let result = Config::load(Some(missing.as_path()));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_path_contains_app_name() {
        if let Some(path) = Config::default_path() {
            assert!(path.to_string_lossy().contains(APP_NAME));
            assert!(path.ends_with(CONFIG_FILE));
        }
        // Passes if there is no home directory (e.g., in CI)
    }

    #[test]
    fn test_apply_cli_overrides_file_settings() {
        let mut config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        let cli = Cli::parse_from([
            "weatherdash",
            "--api-key",
            "from-cli",
            "--favorites",
            "/tmp/favs.txt",
            "--units",
            "f",
            "--demo",
        ]);
        let startup = StartupConfig::from_cli(&cli).unwrap();

        config.apply_cli(&cli, &startup);

        assert_eq!(config.api_key.as_deref(), Some("from-cli"));
        assert_eq!(config.favorites_file, PathBuf::from("/tmp/favs.txt"));
        assert_eq!(config.units, TemperatureUnit::Fahrenheit);
        assert!(config.demo);
    }

    #[test]
    fn test_provider_requires_api_key() {
        let config = Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.provider(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_provider_selection() {
        let demo = Config {
            demo: true,
            ..Config::default()
        };
        assert!(matches!(demo.provider(), Ok(Provider::Demo(_))));

        let live = Config {
            api_key: Some("key".to_string()),
            ..Config::default()
        };
        assert!(matches!(live.provider(), Ok(Provider::OpenWeatherMap(_))));
    }

    #[test]
    fn test_negative_ttl_clamps_to_zero() {
        let config = Config {
            cache_ttl_secs: -5,
            ..Config::default()
        };
        assert_eq!(config.cache_window(), Duration::zero());
    }

    #[test]
    fn test_huge_ttl_clamps_to_max_window() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"cache_ttl_secs": 9223372036854775807, "demo": true}"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();

        assert_eq!(config.cache_window(), Duration::MAX);
        let mut cache = config.cache();
        let now = chrono::Utc::now();
        cache.put("Paris", DemoProvider::new().snapshot("Paris", now), now);
        assert!(cache.get("Paris", now + Duration::days(365)).is_some());
    }
}
