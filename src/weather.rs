//! Weather resolution for the trip planning pipeline
//!
//! Resolves a destination name to a single best-matching place and fetches
//! current conditions plus a daily forecast from the Open-Meteo API.

use crate::config::WeatherConfig;
use crate::geo::GeocodingClient;
use crate::i18n::{Language, describe_weather_code};
use crate::models::{WeatherCurrent, WeatherDaily, WeatherSummary};
use crate::{Result, TabiPlanError};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Weather service combining destination geocoding and forecast retrieval
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    geocoder: GeocodingClient,
    forecast_base_url: String,
}

impl WeatherService {
    /// Create a new weather service
    pub fn new(client: reqwest::Client, config: &WeatherConfig) -> Self {
        let geocoder = GeocodingClient::new(client.clone(), config.geocode_base_url.clone());
        Self {
            client,
            geocoder,
            forecast_base_url: config.forecast_base_url.clone(),
        }
    }

    /// Resolve a destination and fetch its weather summary
    ///
    /// The forecast sequence in the returned summary is chronological and
    /// `days` entries long, so day-indexed lookups by the itinerary step
    /// stay in bounds as long as callers request enough days up front.
    #[instrument(skip(self))]
    pub async fn fetch_summary(
        &self,
        location: &str,
        days: u8,
        language: Language,
    ) -> Result<WeatherSummary> {
        let geocode = self
            .geocoder
            .lookup_first(location)
            .await?
            .ok_or_else(|| TabiPlanError::location_not_found(location))?;

        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current=temperature_2m,precipitation,weather_code&daily=temperature_2m_max,temperature_2m_min,precipitation_probability_max,weather_code&timezone=auto&forecast_days={}",
            self.forecast_base_url, geocode.latitude, geocode.longitude, days
        );

        debug!("Forecast request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TabiPlanError::weather_fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TabiPlanError::weather_fetch(format!(
                "forecast API returned HTTP {}",
                response.status()
            )));
        }

        let data: openmeteo::ForecastResponse = response
            .json()
            .await
            .map_err(|e| TabiPlanError::weather_fetch(format!("invalid forecast payload: {e}")))?;

        let forecast: Vec<WeatherDaily> = data
            .daily
            .time
            .iter()
            .enumerate()
            .map(|(i, date)| WeatherDaily {
                date: date.clone(),
                max_temp: data.daily.value_at(&data.daily.temperature_max, i),
                min_temp: data.daily.value_at(&data.daily.temperature_min, i),
                precipitation_chance: data.daily.value_at(&data.daily.precipitation_probability, i),
                description: describe_weather_code(data.daily.code_at(i), language).to_string(),
            })
            .collect();

        info!(
            "Fetched {} forecast days for {}",
            forecast.len(),
            geocode.display_label()
        );

        Ok(WeatherSummary {
            location_label: geocode.display_label(),
            latitude: geocode.latitude,
            longitude: geocode.longitude,
            timezone: data.timezone,
            updated_at: Utc::now(),
            current: WeatherCurrent {
                temperature: data.current.temperature,
                precipitation: data.current.precipitation,
                description: describe_weather_code(data.current.weather_code, language).to_string(),
            },
            forecast,
        })
    }
}

/// `OpenMeteo` API response structures
mod openmeteo {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub timezone: String,
        pub current: CurrentData,
        pub daily: DailyData,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        #[serde(rename = "temperature_2m")]
        pub temperature: f32,
        pub precipitation: f32,
        pub weather_code: u8,
    }

    /// Daily arrays; far-out entries can be null, so values are optional
    /// per element and default to zero when absent
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Vec<Option<f32>>,
        #[serde(rename = "temperature_2m_min")]
        pub temperature_min: Vec<Option<f32>>,
        #[serde(rename = "precipitation_probability_max")]
        pub precipitation_probability: Vec<Option<f32>>,
        pub weather_code: Vec<Option<u8>>,
    }

    impl DailyData {
        pub fn value_at(&self, values: &[Option<f32>], index: usize) -> f32 {
            values.get(index).copied().flatten().unwrap_or_default()
        }

        pub fn code_at(&self, index: usize) -> u8 {
            self.weather_code.get(index).copied().flatten().unwrap_or(0)
        }
    }
}
