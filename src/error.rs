//! Error types and handling for the `TabiPlan` application

use crate::i18n::Language;
use thiserror::Error;

/// Main error type for the `TabiPlan` application
#[derive(Error, Debug)]
pub enum TabiPlanError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The intent-extraction step returned something that is not a travel intent
    #[error("Intent parse error: {message}")]
    IntentParse { message: String },

    /// Geocoding produced no match for the requested destination
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// Transport or HTTP failure while retrieving the forecast
    #[error("Weather fetch failed: {message}")]
    WeatherFetch { message: String },

    /// Every requested day failed to generate
    #[error("No daily plans could be generated")]
    NoPlansGenerated,

    /// Speech-to-text transport or service failure
    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// External API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TabiPlanError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new intent-parse error
    pub fn intent_parse<S: Into<String>>(message: S) -> Self {
        Self::IntentParse {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new weather-fetch error
    pub fn weather_fetch<S: Into<String>>(message: S) -> Self {
        Self::WeatherFetch {
            message: message.into(),
        }
    }

    /// Create a new transcription error
    pub fn transcription<S: Into<String>>(message: S) -> Self {
        Self::Transcription {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Machine-readable kind, stable across languages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            TabiPlanError::Config { .. } => "config_error",
            TabiPlanError::IntentParse { .. } => "intent_parse_error",
            TabiPlanError::LocationNotFound { .. } => "location_not_found",
            TabiPlanError::WeatherFetch { .. } => "weather_fetch_failed",
            TabiPlanError::NoPlansGenerated => "no_plans_generated",
            TabiPlanError::Transcription { .. } => "transcription_failed",
            TabiPlanError::Validation { .. } => "validation_error",
            TabiPlanError::Api { .. } => "api_error",
            TabiPlanError::Io { .. } => "io_error",
        }
    }

    /// Get a user-friendly message in the active display language
    ///
    /// A missing location is the user's input problem and gets a friendlier,
    /// distinct message; every other failure collapses to the generic
    /// "couldn't plan that trip" string so service internals never leak.
    #[must_use]
    pub fn user_message(&self, language: Language) -> &'static str {
        match (self, language) {
            (TabiPlanError::LocationNotFound { .. }, Language::Ja) => {
                "申し訳ありません。その場所が見つかりませんでした。都市名を入れてもう一度お試しください。"
            }
            (TabiPlanError::LocationNotFound { .. }, Language::En) => {
                "Sorry, I couldn't find that location. Please try again with a city name."
            }
            (_, Language::Ja) => {
                "申し訳ありません。そのプランを作成できませんでした。もう一度お試しください。"
            }
            (_, Language::En) => "Sorry, I couldn't plan that trip. Please try again.",
        }
    }
}
