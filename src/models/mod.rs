//! Data models for the TabiPlan application
//!
//! This module contains the core domain models organized by concern:
//! - Intent: the structured travel request extracted from free text
//! - Weather: current conditions and the daily forecast summary
//! - Plan: activities, daily itineraries, and the final trip plan

pub mod intent;
pub mod plan;
pub mod weather;

// Re-export all public types for convenient access
pub use intent::TravelIntent;
pub use plan::{Activity, Coordinates, DailyPlan, DailySuggestion, TripPlan};
pub use weather::{WeatherCurrent, WeatherDaily, WeatherSummary};
