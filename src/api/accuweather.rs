//! AccuWeather locations API: wire records and request URLs

use serde::Deserialize;

use crate::models::{GeoPosition, Location};

/// One city record; the provider uses PascalCase keys
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CityRecord {
    pub localized_name: String,
    pub country: CountryRecord,
    pub geo_position: Option<GeoPositionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountryRecord {
    pub localized_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeoPositionRecord {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<CityRecord> for Location {
    fn from(record: CityRecord) -> Self {
        Location {
            name: record.localized_name,
            country: record.country.localized_name,
            position: record.geo_position.map(|p| GeoPosition {
                latitude: p.latitude,
                longitude: p.longitude,
            }),
        }
    }
}

/// Autocomplete endpoint, names only
#[must_use]
pub fn autocomplete_url(base_url: &str, api_key: &str, encoded_query: &str) -> String {
    format!(
        "{}/locations/v1/cities/autocomplete?apikey={}&q={}",
        base_url.trim_end_matches('/'),
        api_key,
        encoded_query
    )
}

/// City search endpoint, results include a geo position
#[must_use]
pub fn search_url(base_url: &str, api_key: &str, encoded_query: &str) -> String {
    format!(
        "{}/locations/v1/cities/search?apikey={}&q={}",
        base_url.trim_end_matches('/'),
        api_key,
        encoded_query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_record_pascal_case() {
        let json = r#"[{
            "Version": 1,
            "Key": "318251",
            "LocalizedName": "Izmir",
            "Country": { "ID": "TR", "LocalizedName": "Turkey" },
            "GeoPosition": { "Latitude": 38.419, "Longitude": 27.129 }
        }]"#;

        let records: Vec<CityRecord> = serde_json::from_str(json).unwrap();
        let location: Location = records.into_iter().next().unwrap().into();

        assert_eq!(location.name, "Izmir");
        assert_eq!(location.country, "Turkey");
        assert_eq!(location.position.unwrap().latitude, 38.419);
    }

    #[test]
    fn test_autocomplete_record_without_position() {
        let json = r#"{"LocalizedName": "Bursa", "Country": {"LocalizedName": "Turkey"}}"#;
        let record: CityRecord = serde_json::from_str(json).unwrap();
        let location = Location::from(record);
        assert!(location.position.is_none());
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            search_url("https://host/", "key", "New%20York"),
            "https://host/locations/v1/cities/search?apikey=key&q=New%20York"
        );
        assert_eq!(
            autocomplete_url("https://host", "key", "Izm"),
            "https://host/locations/v1/cities/autocomplete?apikey=key&q=Izm"
        );
    }
}
