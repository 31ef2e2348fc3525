//! HTTP client for the lookup and forecast providers
//!
//! Performs plain GET requests and decodes the JSON body into typed records.
//! Every failure (transport, status, decoding) is reported as an [`ApiError`].
//! No retry or rate limiting happens here.

pub mod accuweather;
pub mod openweather;

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::HttpConfig;

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Longest part of an error body kept for diagnostics
const MAX_BODY_EXCERPT: usize = 200;

/// Uniform error of the HTTP collaborator
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no API key configured for the {provider} provider")]
    MissingApiKey { provider: &'static str },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider returned no {what}")]
    EmptyResponse { what: String },
}

/// Thin JSON-over-HTTP client shared by both providers
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a new client from the HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// GET `url` and decode the JSON body
    #[instrument(name = "get_json", level = "debug", skip(self, url), fields(url = %redact(url)))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!("Network error for {}: {}", redact(url), e);
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            warn!("Failed to read response body from {}: {}", redact(url), e);
            ApiError::Transport(e)
        })?;
        let total_duration = start_time.elapsed();

        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            total_duration.as_secs_f64()
        );

        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        if !status.is_success() {
            error!("API request failed with status {}", status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let parsed = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse response from {}: {}", redact(url), e);
            ApiError::Decode(e)
        })?;

        info!(
            "Successful API request in {:.3}s",
            total_duration.as_secs_f64()
        );
        Ok(parsed)
    }
}

/// Strip API keys from a URL before it is logged
#[must_use]
pub fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let params = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == "apikey" || key == "appid" => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{params}")
}

fn excerpt(body: &str) -> String {
    body.chars().take(MAX_BODY_EXCERPT).collect()
}
