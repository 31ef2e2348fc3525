//! Display formatting shared by the forecast views
//!
//! All times are rendered in the forecast's own UTC offset so the labels match
//! the city, not the machine running the code.

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::{WeatherSample, Wind};

/// Label of the first sample in a time row
pub const NOW_LABEL: &str = "Now";

/// Suffix some provider city labels carry ("Izmir Province")
const PROVINCE_SUFFIX: &str = " Province";

/// Whole degrees, truncated toward zero: 21.7 -> "21°C"
#[must_use]
pub fn temperature(celsius: f64) -> String {
    format!("{}°C", celsius.trunc() as i64)
}

/// Whole kilometers, truncated: 10000 -> "10 km"
#[must_use]
pub fn visibility(meters: Option<u32>) -> String {
    match meters {
        Some(m) => format!("{} km", m / 1000),
        None => "n/a".to_string(),
    }
}

/// "3.6 m/s NE", or "n/a" when no wind was reported
#[must_use]
pub fn wind(wind: Option<Wind>) -> String {
    match wind {
        Some(w) => format!(
            "{:.1} m/s {}",
            w.speed,
            WeatherSample::wind_direction_to_cardinal(w.direction)
        ),
        None => "n/a".to_string(),
    }
}

#[must_use]
pub fn humidity(percent: u8) -> String {
    format!("%{percent}")
}

#[must_use]
pub fn pressure(hpa: u32) -> String {
    format!("{hpa} mbar")
}

/// Upper-case the first letter of every word: "light rain" -> "Light Rain"
#[must_use]
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// "Wednesday, May 1, 2024 15:00"
#[must_use]
pub fn long_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp
        .with_timezone(&offset)
        .format("%A, %B %-d, %Y %H:%M")
        .to_string()
}

/// 24-hour clock: "09:00"
#[must_use]
pub fn clock_time(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp.with_timezone(&offset).format("%H:%M").to_string()
}

/// Weekday name: "Wednesday"
#[must_use]
pub fn day_name(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp.with_timezone(&offset).format("%A").to_string()
}

/// "Now" for the first sample, clock time for the rest
#[must_use]
pub fn time_labels(samples: &[WeatherSample], offset: FixedOffset) -> Vec<String> {
    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            if index == 0 {
                NOW_LABEL.to_string()
            } else {
                clock_time(sample.timestamp, offset)
            }
        })
        .collect()
}

/// Drop the provider's " Province" suffix so labels compare with favorite names
#[must_use]
pub fn strip_province(label: &str) -> &str {
    label.strip_suffix(PROVINCE_SUFFIX).unwrap_or(label)
}
