//! Data models for the CityWeather library
//!
//! This module contains the core domain models organized by concern:
//! - Location: search results and favorite cities
//! - Weather: a single forecast sample
//! - Forecast: short-range and weekly forecast collections

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{DailySummary, Forecast, WeeklyForecast};
pub use location::{GeoPosition, Location};
pub use weather::{WeatherSample, Wind};
