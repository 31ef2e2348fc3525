//! Error types and handling for the `CityWeather` library

use thiserror::Error;

use crate::api::ApiError;

/// Coarse error classification shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidQuery,
    ServiceUnavailable,
    MissingCoordinates,
    UpstreamFailure,
    AggregateFailure,
    DuplicateCity,
    CityNotFound,
    IndexOutOfRange,
    Storage,
    Config,
    Io,
}

/// Main error type for the `CityWeather` library
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The query could not be turned into a request
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// City lookup failed; the real cause is kept as the source
    #[error("City lookup service unavailable")]
    ServiceUnavailable {
        #[source]
        source: ApiError,
    },

    /// Operation needs a geographic position the city does not have
    #[error("City '{city}' has no geographic position")]
    MissingCoordinates { city: String },

    /// Forecast retrieval failed
    #[error("Forecast retrieval failed for {target}: {source}")]
    UpstreamFailure {
        target: String,
        #[source]
        source: ApiError,
    },

    /// A member of a fan-out failed, first error wins
    #[error("Forecast for {requested} cities failed: {source}")]
    AggregateFailure {
        requested: usize,
        #[source]
        source: Box<WeatherError>,
    },

    #[error("City '{name}' is already in the favorites list")]
    DuplicateCity { name: String },

    #[error("No city found for '{query}'")]
    CityNotFound { query: String },

    #[error("Index {index} out of range for {len} favorites")]
    IndexOutOfRange { index: usize, len: usize },

    /// Favorites storage errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// Create a new invalid query error
    pub fn invalid_query<S: Into<String>>(message: S) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error wrapping its cause
    pub fn storage<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap the first failed member of a fan-out
    #[must_use]
    pub fn aggregate(requested: usize, first: WeatherError) -> Self {
        Self::AggregateFailure {
            requested,
            source: Box::new(first),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuery { .. } => ErrorKind::InvalidQuery,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::MissingCoordinates { .. } => ErrorKind::MissingCoordinates,
            Self::UpstreamFailure { .. } => ErrorKind::UpstreamFailure,
            Self::AggregateFailure { .. } => ErrorKind::AggregateFailure,
            Self::DuplicateCity { .. } => ErrorKind::DuplicateCity,
            Self::CityNotFound { .. } => ErrorKind::CityNotFound,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Config { .. } => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::InvalidQuery { message } => format!("Invalid search: {message}"),
            WeatherError::ServiceUnavailable { .. } => {
                "City search is unavailable right now. Please check your connection and API key."
                    .to_string()
            }
            WeatherError::MissingCoordinates { city } => {
                format!("No coordinates stored for {city}. Remove and add the city again.")
            }
            WeatherError::UpstreamFailure { .. } | WeatherError::AggregateFailure { .. } => {
                "Unable to load the forecast. Please check your internet connection.".to_string()
            }
            WeatherError::DuplicateCity { name } => format!("{name} is already in your list."),
            WeatherError::CityNotFound { query } => format!("Location not found: {query}"),
            WeatherError::IndexOutOfRange { index, len } => {
                format!("There is no city at position {index} (you have {len}).")
            }
            WeatherError::Storage { .. } => {
                "Could not access the saved cities. Check the storage path.".to_string()
            }
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            WeatherError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
