//! Single weather sample and its unit helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of a short-range forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSample {
    /// Timestamp for this sample
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Atmospheric pressure in hPa (= mbar)
    pub pressure: u32,
    /// Visibility in meters, not always reported
    pub visibility: Option<u32>,
    /// Missing when the provider reports no wind for the sample
    pub wind: Option<Wind>,
    /// Provider icon identifier, e.g. "10d"
    pub icon: String,
    /// Human-readable description of weather conditions
    pub description: String,
}

/// Wind at one sample
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Wind {
    /// Speed in m/s
    pub speed: f64,
    /// Direction in degrees (0-360, where 0/360 is North)
    pub direction: u16,
}

impl WeatherSample {
    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }
}
