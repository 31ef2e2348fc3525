//! Short-range and weekly forecast models

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use super::WeatherSample;

/// Ordered short-range weather samples for one place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "ForecastFields")]
pub struct Forecast {
    /// City name echoed back by the provider
    pub city: Option<String>,
    /// Provider's UTC offset for the city, in seconds
    pub utc_offset_seconds: i32,
    /// Samples sorted by timestamp, index 0 is the current one
    samples: Vec<WeatherSample>,
}

impl Forecast {
    /// Create new forecast, sorting the samples by timestamp
    #[must_use]
    pub fn new(city: Option<String>, utc_offset_seconds: i32, mut samples: Vec<WeatherSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self {
            city,
            utc_offset_seconds,
            samples,
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[WeatherSample] {
        &self.samples
    }

    /// Get current weather (first sample)
    #[must_use]
    pub fn current(&self) -> Option<&WeatherSample> {
        self.samples.first()
    }

    /// Offset used to render local times; falls back to UTC on a bad value
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        offset_or_utc(self.utc_offset_seconds)
    }
}

/// Summary of one calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailySummary {
    pub date: DateTime<Utc>,
    /// Minimum temperature in Celsius
    pub min: f64,
    /// Maximum temperature in Celsius
    pub max: f64,
    pub icon: Option<String>,
    pub description: Option<String>,
}

/// Daily summaries, one per calendar day, ascending
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "WeeklyForecastFields")]
pub struct WeeklyForecast {
    pub utc_offset_seconds: i32,
    days: Vec<DailySummary>,
}

impl WeeklyForecast {
    /// Sort the days and keep the first entry of each local calendar day
    #[must_use]
    pub fn new(utc_offset_seconds: i32, mut days: Vec<DailySummary>) -> Self {
        let offset = offset_or_utc(utc_offset_seconds);
        days.sort_by_key(|d| d.date);
        days.dedup_by_key(|d| local_date(d.date, offset));
        Self {
            utc_offset_seconds,
            days,
        }
    }

    #[must_use]
    pub fn days(&self) -> &[DailySummary] {
        &self.days
    }

    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        offset_or_utc(self.utc_offset_seconds)
    }
}

/// Decoded fields, passed through the constructors to restore ordering
#[derive(Deserialize)]
struct ForecastFields {
    city: Option<String>,
    utc_offset_seconds: i32,
    samples: Vec<WeatherSample>,
}

impl From<ForecastFields> for Forecast {
    fn from(fields: ForecastFields) -> Self {
        Self::new(fields.city, fields.utc_offset_seconds, fields.samples)
    }
}

#[derive(Deserialize)]
struct WeeklyForecastFields {
    utc_offset_seconds: i32,
    days: Vec<DailySummary>,
}

impl From<WeeklyForecastFields> for WeeklyForecast {
    fn from(fields: WeeklyForecastFields) -> Self {
        Self::new(fields.utc_offset_seconds, fields.days)
    }
}

fn offset_or_utc(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_at(hour: u32, temperature: f64) -> WeatherSample {
        WeatherSample {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            temperature,
            humidity: 50,
            pressure: 1013,
            visibility: Some(10_000),
            wind: None,
            icon: "01d".to_string(),
            description: "clear sky".to_string(),
        }
    }

    fn day(day: u32, hour: u32, min: f64, max: f64) -> DailySummary {
        DailySummary {
            date: Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(),
            min,
            max,
            icon: None,
            description: None,
        }
    }

    #[test]
    fn test_forecast_samples_are_ordered() {
        let forecast = Forecast::new(
            Some("Izmir".to_string()),
            10_800,
            vec![sample_at(15, 20.0), sample_at(9, 14.0), sample_at(12, 18.0)],
        );

        let temps: Vec<f64> = forecast.samples().iter().map(|s| s.temperature).collect();
        assert_eq!(temps, vec![14.0, 18.0, 20.0]);
        assert_eq!(forecast.current().unwrap().temperature, 14.0);
    }

    #[test]
    fn test_empty_forecast_has_no_current() {
        let forecast = Forecast::new(None, 0, Vec::new());
        assert!(forecast.current().is_none());
    }

    #[test]
    fn test_invalid_offset_falls_back_to_utc() {
        let forecast = Forecast::new(None, 999_999, Vec::new());
        assert_eq!(forecast.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_weekly_one_entry_per_day() {
        let weekly = WeeklyForecast::new(
            0,
            vec![day(3, 12, 10.0, 20.0), day(1, 12, 8.0, 18.0), day(1, 18, 0.0, 0.0), day(2, 12, 9.0, 19.0)],
        );

        let mins: Vec<f64> = weekly.days().iter().map(|d| d.min).collect();
        assert_eq!(mins, vec![8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_weekly_days_follow_local_offset() {
        // 22:00 UTC on the 1st is already the 2nd at UTC+3
        let weekly = WeeklyForecast::new(10_800, vec![day(1, 22, 1.0, 2.0), day(2, 12, 3.0, 4.0)]);
        assert_eq!(weekly.days().len(), 1);
    }

    #[test]
    fn test_decoding_keeps_ordering_invariants() {
        let unsorted = Forecast {
            city: None,
            utc_offset_seconds: 0,
            samples: vec![sample_at(15, 20.0), sample_at(9, 14.0)],
        };
        let decoded: Forecast =
            serde_json::from_str(&serde_json::to_string(&unsorted).unwrap()).unwrap();
        assert_eq!(decoded.current().unwrap().temperature, 14.0);

        let duplicated = WeeklyForecast {
            utc_offset_seconds: 0,
            days: vec![day(2, 12, 9.0, 19.0), day(1, 18, 0.0, 0.0), day(1, 12, 8.0, 18.0)],
        };
        let decoded: WeeklyForecast =
            serde_json::from_str(&serde_json::to_string(&duplicated).unwrap()).unwrap();
        let mins: Vec<f64> = decoded.days().iter().map(|d| d.min).collect();
        assert_eq!(mins, vec![8.0, 9.0]);
    }
}
