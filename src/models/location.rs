//! Location model for search results and favorite cities

use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// A resolved place, used both as a search result and as a stored favorite.
///
/// Identity is the display name; two locations with the same `name` are the
/// same city no matter what their coordinates say.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Display name (city, province, etc.)
    pub name: String,
    /// Country display name
    pub country: String,
    /// Needed to request a forecast by coordinates
    pub position: Option<GeoPosition>,
}

impl Location {
    /// Create a location without coordinates
    #[must_use]
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            position: None,
        }
    }

    /// Create location with coordinates
    #[must_use]
    pub fn with_position(
        name: impl Into<String>,
        country: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            position: Some(GeoPosition {
                latitude,
                longitude,
            }),
        }
    }

    #[must_use]
    pub fn is_same_city(&self, other: &Location) -> bool {
        self.name == other.name
    }

    /// "Name, Country" as shown in search results
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> Option<String> {
        self.position
            .map(|p| format!("{:.4}, {:.4}", p.latitude, p.longitude))
    }
}
