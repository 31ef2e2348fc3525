//! `OpenWeatherMap` API response structures and conversion utilities

use chrono::DateTime;
use serde::Deserialize;
use tracing::warn;

use crate::models::{DailySummary, Forecast, GeoPosition, WeatherSample, WeeklyForecast, Wind};

/// Short-range forecast response (`/data/2.5/forecast`)
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub city: Option<CityRecord>,
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub country: Option<String>,
    /// Shift in seconds from UTC
    pub timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    /// Unix timestamp, UTC
    pub dt: i64,
    pub main: MainRecord,
    #[serde(default)]
    pub weather: Vec<ConditionRecord>,
    pub wind: Option<WindRecord>,
    /// Meters, capped at 10 km by the provider
    pub visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MainRecord {
    pub temp: f64,
    pub humidity: u8,
    pub pressure: f64,
}

#[derive(Debug, Deserialize)]
pub struct ConditionRecord {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct WindRecord {
    pub speed: f64,
    pub deg: u16,
}

/// Daily forecast response (`/data/3.0/onecall`)
#[derive(Debug, Deserialize)]
pub struct OneCallResponse {
    pub timezone_offset: Option<i32>,
    #[serde(default)]
    pub daily: Vec<DailyRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DailyRecord {
    pub dt: i64,
    pub temp: TemperatureRange,
    #[serde(default)]
    pub weather: Vec<ConditionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl From<ForecastResponse> for Forecast {
    fn from(response: ForecastResponse) -> Self {
        let (city, offset) = match response.city {
            Some(city) => (Some(city.name), city.timezone.unwrap_or(0)),
            None => (None, 0),
        };

        let samples = response
            .list
            .into_iter()
            .filter_map(|item| {
                let Some(timestamp) = DateTime::from_timestamp(item.dt, 0) else {
                    warn!("Skipping forecast item with invalid timestamp {}", item.dt);
                    return None;
                };
                let condition = item.weather.into_iter().next();

                Some(WeatherSample {
                    timestamp,
                    temperature: item.main.temp,
                    humidity: item.main.humidity,
                    pressure: item.main.pressure.round() as u32,
                    visibility: item.visibility,
                    wind: item.wind.map(|w| Wind {
                        speed: w.speed,
                        direction: w.deg,
                    }),
                    icon: condition.as_ref().map(|c| c.icon.clone()).unwrap_or_default(),
                    description: condition.map(|c| c.description).unwrap_or_default(),
                })
            })
            .collect();

        Forecast::new(city, offset, samples)
    }
}

impl From<OneCallResponse> for WeeklyForecast {
    fn from(response: OneCallResponse) -> Self {
        let days = response
            .daily
            .into_iter()
            .filter_map(|record| {
                let date = DateTime::from_timestamp(record.dt, 0)?;
                let condition = record.weather.into_iter().next();
                Some(DailySummary {
                    date,
                    min: record.temp.min,
                    max: record.temp.max,
                    icon: condition.as_ref().map(|c| c.icon.clone()),
                    description: condition.map(|c| c.description),
                })
            })
            .collect();

        WeeklyForecast::new(response.timezone_offset.unwrap_or(0), days)
    }
}

/// Forecast by city name, `count` samples, metric units
#[must_use]
pub fn forecast_url(base_url: &str, api_key: &str, city: &str, count: u32) -> String {
    format!(
        "{}/data/2.5/forecast?q={}&cnt={}&units=metric&appid={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(city),
        count,
        api_key
    )
}

/// Daily forecast by coordinates, metric units
#[must_use]
pub fn weekly_url(base_url: &str, api_key: &str, position: GeoPosition) -> String {
    format!(
        "{}/data/3.0/onecall?lat={}&lon={}&exclude=current,minutely,hourly,alerts&units=metric&appid={}",
        base_url.trim_end_matches('/'),
        position.latitude,
        position.longitude,
        api_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_response_conversion() {
        let json = r#"{
            "cod": "200",
            "cnt": 2,
            "list": [
                {
                    "dt": 1714575600,
                    "main": {"temp": 18.4, "humidity": 70, "pressure": 1012},
                    "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                    "wind": {"speed": 4.1, "deg": 200},
                    "visibility": 10000
                },
                {
                    "dt": 1714564800,
                    "main": {"temp": 21.7, "humidity": 60, "pressure": 1013},
                    "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
                    "wind": {"speed": 3.6, "deg": 45},
                    "visibility": 9000
                }
            ],
            "city": {"id": 311044, "name": "Izmir Province", "country": "TR", "timezone": 10800}
        }"#;

        let response: ForecastResponse = serde_json::from_str(json).unwrap();
        let forecast = Forecast::from(response);

        assert_eq!(forecast.city.as_deref(), Some("Izmir Province"));
        assert_eq!(forecast.utc_offset_seconds, 10_800);
        // Out-of-order items come back sorted
        let current = forecast.current().unwrap();
        assert_eq!(current.temperature, 21.7);
        assert_eq!(current.icon, "01d");
        assert_eq!(current.wind.map(|w| w.direction), Some(45));
        assert_eq!(forecast.samples().len(), 2);
    }

    #[test]
    fn test_forecast_response_without_city() {
        let json = r#"{"list": []}"#;
        let forecast = Forecast::from(serde_json::from_str::<ForecastResponse>(json).unwrap());
        assert!(forecast.city.is_none());
        assert!(forecast.samples().is_empty());
    }

    #[test]
    fn test_missing_wind_is_not_calm() {
        let json = r#"{
            "list": [{"dt": 1714572000, "main": {"temp": 18.0, "humidity": 70, "pressure": 1010}}]
        }"#;
        let forecast = Forecast::from(serde_json::from_str::<ForecastResponse>(json).unwrap());
        let current = forecast.current().unwrap();

        assert!(current.wind.is_none());
        assert_eq!(crate::display::wind(current.wind), "n/a");
    }

    #[test]
    fn test_onecall_conversion() {
        let json = r#"{
            "lat": 38.42, "lon": 27.14, "timezone": "Europe/Istanbul", "timezone_offset": 10800,
            "daily": [
                {"dt": 1714640400, "temp": {"day": 20.0, "min": 12.3, "max": 22.9}, "weather": [{"description": "few clouds", "icon": "02d"}]},
                {"dt": 1714554000, "temp": {"day": 19.0, "min": 11.0, "max": 21.5}, "weather": []}
            ]
        }"#;

        let weekly = WeeklyForecast::from(serde_json::from_str::<OneCallResponse>(json).unwrap());
        assert_eq!(weekly.days().len(), 2);
        assert_eq!(weekly.days()[0].max, 21.5);
        assert!(weekly.days()[0].icon.is_none());
        assert_eq!(weekly.days()[1].icon.as_deref(), Some("02d"));
    }

    #[test]
    fn test_forecast_url_encodes_city() {
        let url = forecast_url("https://api.test", "k", "New York", 7);
        assert_eq!(
            url,
            "https://api.test/data/2.5/forecast?q=New%20York&cnt=7&units=metric&appid=k"
        );
    }
}
