//! Configuration management for the `TabiPlan` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TabiPlanError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TabiPlan` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabiPlanConfig {
    /// Completion/transcription API configuration
    #[serde(default)]
    pub ai: AiConfig,
    /// Weather and geocoding API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Speech capture gate thresholds
    #[serde(default)]
    pub voice: VoiceConfig,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key; falls back to the GROQ_API_KEY environment variable
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible completion API
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Chat model used for intent extraction and itinerary generation
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Speech-to-text model
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the geocoding API
    #[serde(default = "default_geocode_base_url")]
    pub geocode_base_url: String,
    /// Base URL for the forecast API
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Speech capture gate thresholds
///
/// Empirically chosen values; keep them as named settings rather than
/// re-deriving new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Recordings stopped before this many milliseconds are discarded
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
    /// Payload floor of the no-speech heuristic, in bytes
    #[serde(default = "default_min_payload_bytes")]
    pub min_payload_bytes: usize,
    /// Normalized peak-amplitude floor of the no-speech heuristic, 0..1
    #[serde(default = "default_min_peak_level")]
    pub min_peak_level: f32,
    /// Maximum scale of the raw amplitude metric, used for normalization
    #[serde(default = "default_level_scale")]
    pub level_scale: f32,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Minimum number of forecast days requested regardless of trip length
    #[serde(default = "default_min_forecast_days")]
    pub min_forecast_days: u8,
    /// Maximum supported trip length in days
    #[serde(default = "default_max_trip_days")]
    pub max_trip_days: u8,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_ai_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_chat_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_transcription_model() -> String {
    "whisper-large-v3-turbo".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_geocode_base_url() -> String {
    "https://geocoding-api.open-meteo.com".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_min_duration_ms() -> u64 {
    500
}

fn default_min_payload_bytes() -> usize {
    1000
}

fn default_min_peak_level() -> f32 {
    0.08
}

fn default_level_scale() -> f32 {
    100.0
}

fn default_port() -> u16 {
    3000
}

fn default_min_forecast_days() -> u8 {
    5
}

fn default_max_trip_days() -> u8 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            chat_model: default_chat_model(),
            transcription_model: default_transcription_model(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocode_base_url: default_geocode_base_url(),
            forecast_base_url: default_forecast_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: default_min_duration_ms(),
            min_payload_bytes: default_min_payload_bytes(),
            min_peak_level: default_min_peak_level(),
            level_scale: default_level_scale(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_forecast_days: default_min_forecast_days(),
            max_trip_days: default_max_trip_days(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TabiPlanConfig {
    fn default() -> Self {
        Self {
            ai: AiConfig::default(),
            weather: WeatherConfig::default(),
            voice: VoiceConfig::default(),
            server: ServerConfig::default(),
            defaults: DefaultsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AiConfig {
    /// Resolve the API key from config or the GROQ_API_KEY environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        std::env::var("GROQ_API_KEY")
            .map_err(|_| TabiPlanError::config("Missing GROQ_API_KEY environment variable").into())
    }
}

impl TabiPlanConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with TABIPLAN_ prefix
        builder = builder.add_source(
            Environment::with_prefix("TABIPLAN")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TabiPlanConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tabiplan").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.ai.timeout_seconds == 0 || self.ai.timeout_seconds > 300 {
            return Err(
                TabiPlanError::config("AI API timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(TabiPlanError::config(
                "Weather API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        for (name, url) in [
            ("ai.base_url", &self.ai.base_url),
            ("weather.geocode_base_url", &self.weather.geocode_base_url),
            ("weather.forecast_base_url", &self.weather.forecast_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TabiPlanError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if !(0.0..=1.0).contains(&self.voice.min_peak_level) {
            return Err(
                TabiPlanError::config("voice.min_peak_level must be between 0 and 1").into(),
            );
        }

        if self.voice.level_scale <= 0.0 {
            return Err(TabiPlanError::config("voice.level_scale must be positive").into());
        }

        if self.defaults.max_trip_days == 0 {
            return Err(TabiPlanError::config("defaults.max_trip_days must be at least 1").into());
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TabiPlanError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
