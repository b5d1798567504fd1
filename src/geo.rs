//! Geocoding client for the Open-Meteo search API
//!
//! Resolves free-text place names to coordinates plus a canonical label.
//! Queries always run with `language=en` because destination names are kept
//! in English internally regardless of the display language.

use crate::Result;
use serde::Deserialize;
use tracing::{debug, warn};

/// First matching place for a geocoding query
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub name: String,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeocodeResult {
    /// Display label of the form "name, admin1, country", skipping an
    /// admin1 that merely repeats the place name
    #[must_use]
    pub fn display_label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(admin1) = &self.admin1 {
            if !admin1.is_empty() && admin1 != &self.name {
                parts.push(admin1);
            }
        }
        if let Some(country) = &self.country {
            if !country.is_empty() {
                parts.push(country);
            }
        }
        parts.join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

/// HTTP client for the geocoding service
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    /// Create a new geocoding client against the given base URL
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Look up the single best match for a place-name query
    ///
    /// Returns `Ok(None)` both for an empty result set and for a failed
    /// request; a miss on an activity must degrade to a missing marker, so
    /// transport problems are logged here instead of propagated.
    pub async fn lookup_first(&self, query: &str) -> Result<Option<GeocodeResult>> {
        let url = format!(
            "{}/v1/search?name={}&count=1&language=en&format=json",
            self.base_url,
            urlencoding::encode(query)
        );

        debug!("Geocoding query: '{}'", query);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Geocoding request for '{}' failed: {}", query, e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            warn!(
                "Geocoding API returned {} for '{}'",
                response.status(),
                query
            );
            return Ok(None);
        }

        let payload: GeocodeResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to parse geocoding response for '{}': {}", query, e);
                return Ok(None);
            }
        };

        let first = payload.results.unwrap_or_default().into_iter().next();
        match &first {
            Some(result) => debug!(
                "Geocoded '{}' to {} ({:.4}, {:.4})",
                query,
                result.display_label(),
                result.latitude,
                result.longitude
            ),
            None => debug!("No geocoding results for '{}'", query),
        }

        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, admin1: Option<&str>, country: Option<&str>) -> GeocodeResult {
        GeocodeResult {
            name: name.to_string(),
            country: country.map(String::from),
            admin1: admin1.map(String::from),
            latitude: 35.6895,
            longitude: 139.6917,
        }
    }

    #[test]
    fn test_display_label_full() {
        let label = result("Tokyo", Some("Tokyo Prefecture"), Some("Japan")).display_label();
        assert_eq!(label, "Tokyo, Tokyo Prefecture, Japan");
    }

    #[test]
    fn test_display_label_skips_repeated_admin1() {
        let label = result("Tokyo", Some("Tokyo"), Some("Japan")).display_label();
        assert_eq!(label, "Tokyo, Japan");
    }

    #[test]
    fn test_display_label_name_only() {
        let label = result("Tokyo", None, None).display_label();
        assert_eq!(label, "Tokyo");
    }

    #[test]
    fn test_empty_results_deserialize_to_none() {
        let payload: GeocodeResponse = serde_json::from_str("{}").unwrap();
        assert!(payload.results.is_none());

        let payload: GeocodeResponse = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert!(payload.results.unwrap().is_empty());
    }
}
