//! Configuration management for `CityWeather`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::{Result, WeatherError};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CityWeatherConfig {
    /// City lookup provider
    pub lookup: LookupConfig,
    /// Forecast provider
    pub forecast: ForecastConfig,
    /// Shared HTTP client settings
    pub http: HttpConfig,
    /// Fan-out settings
    pub aggregation: AggregationConfig,
    /// Favorites storage
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// City lookup API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Forecast API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Samples requested for the current/daily view
    pub daily_sample_count: u32,
    /// Samples requested per favorite in the overview
    pub favorites_sample_count: u32,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Maximum forecast requests in flight for the favorites overview
    pub fan_out_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the favorites database
    pub path: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or compact)
    pub format: String,
}

// Default value functions
fn default_lookup_base_url() -> String {
    "https://dataservice.accuweather.com".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_daily_sample_count() -> u32 {
    7
}

fn default_favorites_sample_count() -> u32 {
    1
}

fn default_http_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("CityWeather/{}", crate::VERSION)
}

fn default_fan_out_limit() -> usize {
    8
}

fn default_storage_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("cityweather").join("favorites"))
        .unwrap_or_else(|| PathBuf::from(".cityweather/favorites"))
        .to_string_lossy()
        .into_owned()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_lookup_base_url(),
            api_key: None,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            api_key: None,
            daily_sample_count: default_daily_sample_count(),
            favorites_sample_count: default_favorites_sample_count(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            fan_out_limit: default_fan_out_limit(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CityWeatherConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // CITYWEATHER_FORECAST__API_KEY -> forecast.api_key
        builder = builder.add_source(
            Environment::with_prefix("CITYWEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to build configuration: {e}")))?;

        let mut config: CityWeatherConfig = settings
            .try_deserialize()
            .map_err(|e| WeatherError::config(format!("Failed to deserialize configuration: {e}")))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cityweather").join("config.toml"))
    }

    /// Apply default values to fields left empty or zero
    pub fn apply_defaults(&mut self) {
        if self.lookup.base_url.is_empty() {
            self.lookup.base_url = default_lookup_base_url();
        }
        if self.forecast.base_url.is_empty() {
            self.forecast.base_url = default_forecast_base_url();
        }
        if self.forecast.daily_sample_count == 0 {
            self.forecast.daily_sample_count = default_daily_sample_count();
        }
        if self.forecast.favorites_sample_count == 0 {
            self.forecast.favorites_sample_count = default_favorites_sample_count();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.aggregation.fan_out_limit == 0 {
            self.aggregation.fan_out_limit = default_fan_out_limit();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// API keys are optional at load time, but must look sane when present
    pub fn validate_api_keys(&self) -> Result<()> {
        for (provider, key) in [
            ("lookup", &self.lookup.api_key),
            ("forecast", &self.forecast.api_key),
        ] {
            if let Some(api_key) = key {
                if api_key.trim().is_empty() {
                    return Err(WeatherError::config(format!(
                        "The {provider} API key cannot be empty if provided. Either remove it or provide a valid key."
                    )));
                }

                if api_key.len() > 100 {
                    return Err(WeatherError::config(format!(
                        "The {provider} API key appears to be invalid (too long). Please check your API key."
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(WeatherError::config(
                "HTTP timeout cannot exceed 300 seconds",
            ));
        }

        if self.forecast.daily_sample_count > 40 {
            return Err(WeatherError::config(
                "Daily sample count cannot exceed 40",
            ));
        }

        if self.forecast.favorites_sample_count > 40 {
            return Err(WeatherError::config(
                "Favorites sample count cannot exceed 40",
            ));
        }

        if self.aggregation.fan_out_limit > 64 {
            return Err(WeatherError::config(
                "Fan-out limit cannot exceed 64 concurrent requests",
            ));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        for (name, url) in [
            ("lookup", &self.lookup.base_url),
            ("forecast", &self.forecast.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherError::config(format!(
                    "The {name} base URL must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        Ok(())
    }
}
