//! City lookup
//!
//! Turns free-text search input into candidate [`Location`] values. Every
//! upstream failure is reported as [`WeatherError::ServiceUnavailable`]; the
//! real cause stays available through `source()` and in the logs.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError, accuweather};
use crate::config::LookupConfig;
use crate::models::Location;
use crate::{Result, WeatherError};

/// Callers should not search before the input has this many characters
pub const MIN_QUERY_LENGTH: usize = 3;

/// Whether `query` is long enough to be worth a lookup
#[must_use]
pub fn should_search(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LENGTH
}

/// Free-text city search
#[async_trait]
pub trait CityService: Send + Sync {
    /// Candidate cities by name, without coordinates
    async fn find_city(&self, query: &str) -> Result<Vec<Location>>;

    /// Candidate cities including their geographic position
    async fn find_coordinate(&self, query: &str) -> Result<Vec<Location>>;
}

/// [`CityService`] backed by the AccuWeather locations API
pub struct CityLookup {
    client: ApiClient,
    base_url: String,
    api_key: Option<String>,
}

impl CityLookup {
    #[must_use]
    pub fn new(client: ApiClient, config: &LookupConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn search(
        &self,
        query: &str,
        build_url: fn(&str, &str, &str) -> String,
    ) -> Result<Vec<Location>> {
        let encoded = encode_query(query)?;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ApiError::MissingApiKey { provider: "lookup" })
            .map_err(unavailable)?;

        let url = build_url(&self.base_url, api_key, &encoded);
        reqwest::Url::parse(&url)
            .map_err(|e| WeatherError::invalid_query(format!("cannot build request URL: {e}")))?;

        let records: Vec<accuweather::CityRecord> =
            self.client.get_json(&url).await.map_err(unavailable)?;

        let locations: Vec<Location> = records.into_iter().map(Location::from).collect();

        if locations.is_empty() {
            warn!("No cities found for '{}'", query);
        } else {
            info!("Found {} cities for '{}'", locations.len(), query);
            debug!(
                "Lookup results: {:?}",
                locations.iter().map(Location::display_label).collect::<Vec<_>>()
            );
        }

        Ok(locations)
    }
}

#[async_trait]
impl CityService for CityLookup {
    #[instrument(skip(self))]
    async fn find_city(&self, query: &str) -> Result<Vec<Location>> {
        self.search(query, accuweather::autocomplete_url).await
    }

    #[instrument(skip(self))]
    async fn find_coordinate(&self, query: &str) -> Result<Vec<Location>> {
        self.search(query, accuweather::search_url).await
    }
}

/// Percent-encode the trimmed query; spaces become `%20`
fn encode_query(query: &str) -> Result<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::invalid_query("search text is empty"));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(WeatherError::invalid_query(
            "search text contains control characters",
        ));
    }
    Ok(urlencoding::encode(trimmed).into_owned())
}

fn unavailable(source: ApiError) -> WeatherError {
    warn!("City lookup failed: {}", source);
    WeatherError::ServiceUnavailable { source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_should_search_threshold() {
        assert!(!should_search("Iz"));
        assert!(!should_search("  Iz  "));
        assert!(should_search("Izm"));
        // counted in characters, not bytes
        assert!(!should_search("İz"));
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query(" New York ").unwrap(), "New%20York");
        assert_eq!(encode_query("Köln").unwrap(), "K%C3%B6ln");
    }

    #[test]
    fn test_encode_query_rejects_blank_and_control() {
        assert_eq!(encode_query("   ").unwrap_err().kind(), ErrorKind::InvalidQuery);
        assert_eq!(encode_query("Iz\nmir").unwrap_err().kind(), ErrorKind::InvalidQuery);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_service_unavailable() {
        let client = ApiClient::new(&crate::config::HttpConfig::default()).unwrap();
        let lookup = CityLookup::new(client, &LookupConfig::default());

        let err = lookup.find_city("Izmir").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(matches!(
            err,
            WeatherError::ServiceUnavailable {
                source: ApiError::MissingApiKey { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_blank_query_fails_before_key_check() {
        let client = ApiClient::new(&crate::config::HttpConfig::default()).unwrap();
        let lookup = CityLookup::new(client, &LookupConfig::default());

        let err = lookup.find_coordinate("  ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }
}
