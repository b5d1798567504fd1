//! Weather summary models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One day of forecast data
///
/// The sequence returned by the weather service is chronological; index 0 is
/// the first requested day. Read-only for the rest of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDaily {
    /// ISO date (YYYY-MM-DD) as returned by the weather service
    pub date: String,
    /// Daily maximum temperature in °C
    pub max_temp: f32,
    /// Daily minimum temperature in °C
    pub min_temp: f32,
    /// Maximum precipitation probability, 0..100
    pub precipitation_chance: f32,
    /// Localized human-readable description
    pub description: String,
}

/// Current conditions snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCurrent {
    /// Temperature in °C
    pub temperature: f32,
    /// Precipitation in mm
    pub precipitation: f32,
    /// Localized human-readable description
    pub description: String,
}

/// Aggregate weather answer for one planning request
///
/// Created fresh per query and discarded when a new query begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    /// Resolved place label, e.g. "Tokyo, Japan"
    pub location_label: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone reported by the weather service
    pub timezone: String,
    /// When this summary was retrieved
    pub updated_at: DateTime<Utc>,
    pub current: WeatherCurrent,
    /// Chronological daily forecast, at least as long as the requested days
    pub forecast: Vec<WeatherDaily>,
}

impl WeatherSummary {
    /// Forecast entry for a trip day index, if the forecast reaches that far
    #[must_use]
    pub fn day(&self, index: usize) -> Option<&WeatherDaily> {
        self.forecast.get(index)
    }
}
