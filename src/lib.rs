//! `CityWeather` - forecasts for a curated list of favorite cities
//!
//! City search, short-range and weekly forecasts, and a persisted favorites
//! list whose forecasts are fetched concurrently for an overview.

pub mod aggregator;
pub mod api;
pub mod city_lookup;
pub mod config;
pub mod display;
pub mod error;
pub mod favorites;
pub mod forecast_service;
pub mod models;

// Re-export core types for public API
pub use aggregator::{
    CombinedForecast, CurrentConditions, FavoriteSummary, FavoritesOverview, ForecastAggregator,
    WeeklyOutlook,
};
pub use api::{ApiClient, ApiError};
pub use city_lookup::{CityLookup, CityService};
pub use config::CityWeatherConfig;
pub use error::{ErrorKind, WeatherError};
pub use favorites::{CityStore, FavoriteCities, FjallCityStore};
pub use forecast_service::{ForecastService, OpenWeatherService};
pub use models::{Forecast, GeoPosition, Location, WeatherSample, WeeklyForecast};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
