//! Forecast aggregation
//!
//! Orchestrates one or many forecast fetches and derives the display strings
//! the views render. The aggregator keeps no state between calls: the
//! favorites order is passed in by the caller every time.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::api::ApiError;
use crate::config::CityWeatherConfig;
use crate::display;
use crate::forecast_service::ForecastService;
use crate::models::{Forecast, GeoPosition, Location, WeeklyForecast};
use crate::{Result, WeatherError};

const DEFAULT_DAILY_SAMPLES: u32 = 7;
const DEFAULT_FAVORITE_SAMPLES: u32 = 1;
const DEFAULT_FAN_OUT_LIMIT: usize = 8;

/// Name shown for a forecast the provider returned without a city label
const UNKNOWN_CITY: &str = "Unknown";

/// Display fields for the current sample plus the short-range row
#[derive(Debug, Clone, Serialize)]
pub struct CurrentConditions {
    pub temperature: String,
    pub icon: String,
    pub description: String,
    pub visibility: String,
    pub wind: String,
    pub humidity: String,
    pub pressure: String,
    pub date: String,
    /// One label per sample, "Now" first
    pub times: Vec<String>,
    #[serde(skip)]
    pub forecast: Forecast,
}

impl CurrentConditions {
    fn from_forecast(forecast: Forecast, target: &str) -> Result<Self> {
        let offset = forecast.offset();
        let Some(current) = forecast.current() else {
            return Err(WeatherError::UpstreamFailure {
                target: target.to_string(),
                source: ApiError::EmptyResponse {
                    what: "forecast samples".to_string(),
                },
            });
        };

        Ok(Self {
            temperature: display::temperature(current.temperature),
            icon: current.icon.clone(),
            description: display::capitalize_words(&current.description),
            visibility: display::visibility(current.visibility),
            wind: display::wind(current.wind),
            humidity: display::humidity(current.humidity),
            pressure: display::pressure(current.pressure),
            date: display::long_date(current.timestamp, offset),
            times: display::time_labels(forecast.samples(), offset),
            forecast,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOutlook {
    pub day: String,
    pub min: String,
    pub max: String,
    pub icon: Option<String>,
}

/// Display fields of a weekly forecast
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyOutlook {
    pub days: Vec<DayOutlook>,
    #[serde(skip)]
    pub forecast: WeeklyForecast,
}

impl From<WeeklyForecast> for WeeklyOutlook {
    fn from(forecast: WeeklyForecast) -> Self {
        let offset = forecast.offset();
        let days = forecast
            .days()
            .iter()
            .map(|day| DayOutlook {
                day: display::day_name(day.date, offset),
                min: display::temperature(day.min),
                max: display::temperature(day.max),
                icon: day.icon.clone(),
            })
            .collect();

        Self { days, forecast }
    }
}

/// Both views of one city, published together or not at all
#[derive(Debug, Clone, Serialize)]
pub struct CombinedForecast {
    pub current: CurrentConditions,
    pub weekly: WeeklyOutlook,
}

/// One row of the favorites overview
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteSummary {
    pub name: String,
    pub degree: String,
    pub date: String,
    pub icon: String,
    #[serde(skip)]
    pub forecast: Forecast,
}

/// Favorites overview, in favorites order
#[derive(Debug, Clone, Default, Serialize)]
pub struct FavoritesOverview {
    pub entries: Vec<FavoriteSummary>,
}

/// Fetches forecasts and derives display fields
pub struct ForecastAggregator {
    service: Arc<dyn ForecastService>,
    daily_sample_count: u32,
    favorites_sample_count: u32,
    fan_out_limit: usize,
}

impl ForecastAggregator {
    #[must_use]
    pub fn new(service: Arc<dyn ForecastService>) -> Self {
        Self {
            service,
            daily_sample_count: DEFAULT_DAILY_SAMPLES,
            favorites_sample_count: DEFAULT_FAVORITE_SAMPLES,
            fan_out_limit: DEFAULT_FAN_OUT_LIMIT,
        }
    }

    #[must_use]
    pub fn from_config(service: Arc<dyn ForecastService>, config: &CityWeatherConfig) -> Self {
        Self::new(service)
            .with_sample_counts(
                config.forecast.daily_sample_count,
                config.forecast.favorites_sample_count,
            )
            .with_fan_out_limit(config.aggregation.fan_out_limit)
    }

    #[must_use]
    pub fn with_sample_counts(mut self, daily: u32, favorites: u32) -> Self {
        self.daily_sample_count = daily;
        self.favorites_sample_count = favorites;
        self
    }

    /// Limit the requests in flight for the favorites overview (at least 1)
    #[must_use]
    pub fn with_fan_out_limit(mut self, limit: usize) -> Self {
        self.fan_out_limit = limit.max(1);
        self
    }

    /// Current conditions and the short-range row for a city name
    #[instrument(skip(self))]
    pub async fn get_current_and_daily(&self, city: &str) -> Result<CurrentConditions> {
        let forecast = self
            .service
            .get_weather(city, self.daily_sample_count)
            .await?;
        CurrentConditions::from_forecast(forecast, city)
    }

    /// Day labels and min/max temperatures for a coordinate
    #[instrument(skip(self), fields(lat = position.latitude, lon = position.longitude))]
    pub async fn get_weekly(&self, position: GeoPosition) -> Result<WeeklyOutlook> {
        let weekly = self.service.get_weekly(position).await?;
        Ok(WeeklyOutlook::from(weekly))
    }

    /// Short-range and weekly forecasts fetched concurrently.
    ///
    /// Fails with [`WeatherError::MissingCoordinates`] before any request when
    /// the city has no position, and with the failing member's error if either
    /// request fails.
    #[instrument(skip(self, city), fields(city = %city.name))]
    pub async fn get_combined_forecast(&self, city: &Location) -> Result<CombinedForecast> {
        let Some(position) = city.position else {
            warn!("Cannot fetch combined forecast, '{}' has no coordinates", city.name);
            return Err(WeatherError::MissingCoordinates {
                city: city.name.clone(),
            });
        };

        let (forecast, weekly) = futures::try_join!(
            self.service.get_weather(&city.name, self.daily_sample_count),
            self.service.get_weekly(position),
        )?;

        let current = CurrentConditions::from_forecast(forecast, &city.name)?;
        let weekly = WeeklyOutlook::from(weekly);

        info!(
            "Combined forecast ready for '{}': {} samples, {} days",
            city.name,
            current.times.len(),
            weekly.days.len()
        );
        Ok(CombinedForecast { current, weekly })
    }

    /// One forecast per favorite, fetched concurrently and returned in
    /// favorites order. Any failed request fails the whole call.
    #[instrument(skip(self, favorites), fields(count = favorites.len()))]
    pub async fn get_forecast_for_favorites(
        &self,
        favorites: &[Location],
    ) -> Result<FavoritesOverview> {
        if favorites.is_empty() {
            debug!("No favorites, nothing to fetch");
            return Ok(FavoritesOverview::default());
        }

        let requested = favorites.len();
        let count = self.favorites_sample_count;
        let service = &self.service;

        let forecasts: Vec<Forecast> = stream::iter(favorites)
            .map(|city| async move { service.get_weather(&city.name, count).await })
            .buffer_unordered(self.fan_out_limit)
            .try_collect()
            .await
            .map_err(|first| {
                error!("Favorites fan-out failed: {}", first);
                WeatherError::aggregate(requested, first)
            })?;

        let entries = order_by_favorites(forecasts, favorites)
            .into_iter()
            .filter_map(|forecast| {
                let offset = forecast.offset();
                let Some(current) = forecast.current() else {
                    warn!("Forecast for {:?} has no samples, skipping", forecast.city);
                    return None;
                };
                Some(FavoriteSummary {
                    name: forecast
                        .city
                        .as_deref()
                        .map_or(UNKNOWN_CITY, display::strip_province)
                        .to_string(),
                    degree: display::temperature(current.temperature),
                    date: display::long_date(current.timestamp, offset),
                    icon: current.icon.clone(),
                    forecast,
                })
            })
            .collect::<Vec<_>>();

        info!("Favorites overview ready with {} entries", entries.len());
        Ok(FavoritesOverview { entries })
    }
}

/// Sort forecasts into favorites order by their provider city label.
///
/// Labels are compared with the " Province" suffix removed. Forecasts whose
/// label matches no favorite keep their relative order and go last.
#[must_use]
pub fn order_by_favorites(forecasts: Vec<Forecast>, favorites: &[Location]) -> Vec<Forecast> {
    let mut keyed: Vec<(usize, Forecast)> = forecasts
        .into_iter()
        .map(|forecast| {
            let position = forecast
                .city
                .as_deref()
                .map(display::strip_province)
                .and_then(|label| favorites.iter().position(|city| city.name == label));
            if position.is_none() {
                debug!("No favorite matches provider label {:?}", forecast.city);
            }
            (position.unwrap_or(usize::MAX), forecast)
        })
        .collect();

    // stable: unmatched entries keep response order
    keyed.sort_by_key(|(position, _)| *position);
    keyed.into_iter().map(|(_, forecast)| forecast).collect()
}
