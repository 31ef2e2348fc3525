//! Forecast retrieval
//!
//! One request per call, converted into the domain models. Failures are
//! propagated as [`WeatherError::UpstreamFailure`] with the `ApiError` attached.

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError, openweather};
use crate::config::ForecastConfig;
use crate::models::{Forecast, GeoPosition, WeeklyForecast};
use crate::{Result, WeatherError};

#[async_trait]
pub trait ForecastService: Send + Sync {
    /// Short-range forecast for a city name with `count` samples
    async fn get_weather(&self, city: &str, count: u32) -> Result<Forecast>;

    /// Multi-day forecast for a coordinate
    async fn get_weekly(&self, position: GeoPosition) -> Result<WeeklyForecast>;
}

/// [`ForecastService`] backed by the `OpenWeatherMap` API
pub struct OpenWeatherService {
    client: ApiClient,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherService {
    #[must_use]
    pub fn new(client: ApiClient, config: &ForecastConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn api_key(&self, target: &str) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| WeatherError::UpstreamFailure {
                target: target.to_string(),
                source: ApiError::MissingApiKey {
                    provider: "forecast",
                },
            })
    }
}

#[async_trait]
impl ForecastService for OpenWeatherService {
    #[instrument(skip(self))]
    async fn get_weather(&self, city: &str, count: u32) -> Result<Forecast> {
        let url = openweather::forecast_url(&self.base_url, self.api_key(city)?, city, count);

        let response: openweather::ForecastResponse =
            self.client
                .get_json(&url)
                .await
                .map_err(|source| WeatherError::UpstreamFailure {
                    target: city.to_string(),
                    source,
                })?;

        let forecast = Forecast::from(response);
        info!(
            "Retrieved {} samples for '{}' (provider label {:?})",
            forecast.samples().len(),
            city,
            forecast.city
        );
        Ok(forecast)
    }

    #[instrument(skip(self), fields(lat = position.latitude, lon = position.longitude))]
    async fn get_weekly(&self, position: GeoPosition) -> Result<WeeklyForecast> {
        let target = format!("{:.4}, {:.4}", position.latitude, position.longitude);
        let url = openweather::weekly_url(&self.base_url, self.api_key(&target)?, position);

        let response: openweather::OneCallResponse =
            self.client
                .get_json(&url)
                .await
                .map_err(|source| WeatherError::UpstreamFailure {
                    target: target.clone(),
                    source,
                })?;

        let weekly = WeeklyForecast::from(response);
        info!("Retrieved {} days for {}", weekly.days().len(), target);
        Ok(weekly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::config::HttpConfig;

    #[tokio::test]
    async fn test_missing_api_key_is_upstream_failure() {
        let client = ApiClient::new(&HttpConfig::default()).unwrap();
        let service = OpenWeatherService::new(client, &ForecastConfig::default());

        let err = service.get_weather("Izmir", 7).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);

        let position = GeoPosition {
            latitude: 38.42,
            longitude: 27.14,
        };
        let err = service.get_weekly(position).await.unwrap_err();
        assert!(err.to_string().contains("38.4200, 27.1400"));
    }
}
