//! Itinerary models: activities, daily plans, and the final trip plan

use super::{TravelIntent, WeatherSummary};
use serde::{Deserialize, Serialize};

/// Map coordinates for a planned activity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One planned activity within a day
///
/// `coordinates` starts absent and is filled in by the post-generation
/// geocoding step; a geocoding miss leaves it unset, so consumers must
/// tolerate fewer map markers than activities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub title: String,
    pub description: String,
    /// Specific, geocodable place name in English
    pub location_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Raw per-day content as returned by the generation service, before a
/// forecast date is attached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySuggestion {
    pub morning: Activity,
    pub afternoon: Activity,
    pub evening: Activity,
    /// One recommended dining spot or dish
    pub meal: String,
    /// One weather-appropriate item to pack
    pub item: String,
    /// One tip for getting around the city
    pub transport: String,
    /// Outfit advice for the day's weather and activities
    pub outfit: String,
}

/// One day's finished itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    /// Taken verbatim from the forecast entry at this day's index, never
    /// recomputed, so weather and itinerary dates cannot drift apart
    pub date: String,
    pub morning: Activity,
    pub afternoon: Activity,
    pub evening: Activity,
    pub meal: String,
    pub item: String,
    pub transport: String,
    pub outfit: String,
}

impl DailyPlan {
    /// Attach a forecast date to generated day content
    #[must_use]
    pub fn from_suggestion(date: impl Into<String>, suggestion: DailySuggestion) -> Self {
        Self {
            date: date.into(),
            morning: suggestion.morning,
            afternoon: suggestion.afternoon,
            evening: suggestion.evening,
            meal: suggestion.meal,
            item: suggestion.item,
            transport: suggestion.transport,
            outfit: suggestion.outfit,
        }
    }

    /// The day's activities in chronological order
    #[must_use]
    pub fn activities(&self) -> [&Activity; 3] {
        [&self.morning, &self.afternoon, &self.evening]
    }
}

/// The pipeline's final artifact for one user query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub intent: TravelIntent,
    pub weather: WeatherSummary,
    /// Ordered daily plans; may be shorter than `intent.days` when
    /// individual days failed to generate
    pub plans: Vec<DailyPlan>,
}
