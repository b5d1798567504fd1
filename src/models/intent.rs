//! Travel intent extracted from a free-text user query

use serde::{Deserialize, Serialize};

/// Structured travel request produced by the intent-extraction step
///
/// `destination` is always an English place name regardless of the query
/// language, so it can be used directly as a geocoding key. Produced once
/// per user query and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TravelIntent {
    /// Destination city, in English
    pub destination: String,
    /// ISO date (YYYY-MM-DD) or a relative token such as "tomorrow"
    #[serde(default = "default_start_date")]
    pub start_date: String,
    /// Trip length in days
    #[serde(default = "default_days")]
    pub days: u8,
}

fn default_start_date() -> String {
    "tomorrow".to_string()
}

fn default_days() -> u8 {
    1
}

impl TravelIntent {
    /// Clamp the trip length into the supported `1..=max_days` window
    pub fn clamp_days(&mut self, max_days: u8) {
        self.days = self.days.clamp(1, max_days.max(1));
    }
}
