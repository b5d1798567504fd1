//! `TabiPlan` - Bilingual conversational travel planning
//!
//! This library provides the core functionality for turning a free-text
//! travel request (Japanese or English, typed or spoken) into a day-by-day
//! itinerary with weather-aware suggestions and geocoded activities.

pub mod ai;
pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod i18n;
pub mod models;
pub mod pipeline;
pub mod voice;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use ai::{AudioClip, CompletionProvider, GroqClient};
pub use config::TabiPlanConfig;
pub use error::TabiPlanError;
pub use geo::{GeocodeResult, GeocodingClient};
pub use i18n::Language;
pub use models::{
    Activity, Coordinates, DailyPlan, TravelIntent, TripPlan, WeatherDaily, WeatherSummary,
};
pub use pipeline::{PlanPhase, PlanSession, Planner};
pub use voice::{GateOutcome, GateRejection, VoiceGate};
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TabiPlanError>;
