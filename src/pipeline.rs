//! Trip planning pipeline
//!
//! Chains intent extraction, destination geocoding, weather retrieval,
//! per-day itinerary generation, and per-activity geocoding into a single
//! asynchronous workflow. Days are generated strictly in order; a day that
//! fails to generate is logged and skipped, so a partial result is preferred
//! over total failure.

use crate::ai::itinerary::DayContext;
use crate::ai::{self, CompletionProvider};
use crate::config::DefaultsConfig;
use crate::geo::GeocodingClient;
use crate::i18n::Language;
use crate::models::{Coordinates, DailyPlan, TripPlan};
use crate::weather::WeatherService;
use crate::{Result, TabiPlanError};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// UI-visible pipeline state
///
/// Transitions are one-way and driven by step completion; `Error` is
/// reachable from any in-flight state. `Success` and `Error` return to
/// `Idle` only through an explicit [`PlanSession::reset`], never
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    Idle,
    Processing,
    FetchingWeather,
    GeneratingPlan,
    Success,
    Error,
}

impl PlanPhase {
    /// Localized progress message for in-flight phases
    #[must_use]
    pub fn progress_message(self, language: Language) -> Option<&'static str> {
        match (self, language) {
            (PlanPhase::Processing, Language::Ja) => Some("入力を処理中..."),
            (PlanPhase::Processing, Language::En) => Some("Processing input..."),
            (PlanPhase::FetchingWeather, Language::Ja) => Some("天気データを取得中..."),
            (PlanPhase::FetchingWeather, Language::En) => Some("Fetching weather data..."),
            (PlanPhase::GeneratingPlan, Language::Ja) => Some("プランを生成中..."),
            (PlanPhase::GeneratingPlan, Language::En) => Some("Generating your plan..."),
            _ => None,
        }
    }
}

/// The trip planning pipeline
///
/// All collaborators are injected at construction so tests can point the
/// services at doubles.
pub struct Planner {
    ai: Arc<dyn CompletionProvider>,
    weather: WeatherService,
    geocoder: GeocodingClient,
    min_forecast_days: u8,
    max_trip_days: u8,
}

impl Planner {
    /// Create a new planner
    pub fn new(
        ai: Arc<dyn CompletionProvider>,
        weather: WeatherService,
        geocoder: GeocodingClient,
        defaults: &DefaultsConfig,
    ) -> Self {
        Self {
            ai,
            weather,
            geocoder,
            min_forecast_days: defaults.min_forecast_days,
            max_trip_days: defaults.max_trip_days,
        }
    }

    /// Turn one free-text request into an ordered sequence of daily plans
    ///
    /// Phase updates are published on `progress` as each step completes;
    /// `Success` or `Error` is always the final update.
    pub async fn plan_trip(
        &self,
        query: &str,
        language: Language,
        progress: &watch::Sender<PlanPhase>,
    ) -> Result<TripPlan> {
        match self.run_pipeline(query, language, progress).await {
            Ok(plan) => {
                progress.send_replace(PlanPhase::Success);
                Ok(plan)
            }
            Err(e) => {
                progress.send_replace(PlanPhase::Error);
                Err(e)
            }
        }
    }

    #[instrument(skip(self, query, progress))]
    async fn run_pipeline(
        &self,
        query: &str,
        language: Language,
        progress: &watch::Sender<PlanPhase>,
    ) -> Result<TripPlan> {
        progress.send_replace(PlanPhase::Processing);
        let intent =
            ai::intent::extract_intent(self.ai.as_ref(), query, language, self.max_trip_days)
                .await?;
        info!(
            "Intent: {} for {} day(s) starting {}",
            intent.destination, intent.days, intent.start_date
        );

        progress.send_replace(PlanPhase::FetchingWeather);
        // Request extra days so day-indexed lookups below never run off the
        // end of the forecast, even for short trips
        let forecast_days = intent.days.max(self.min_forecast_days);
        let weather = self
            .weather
            .fetch_summary(&intent.destination, forecast_days, language)
            .await?;

        progress.send_replace(PlanPhase::GeneratingPlan);
        let total_days = usize::from(intent.days);
        let mut plans = Vec::with_capacity(total_days);
        let mut prior_locations: Vec<String> = Vec::new();

        for day_index in 0..total_days {
            let Some(daily) = weather.day(day_index) else {
                warn!("No forecast entry for day {}, skipping", day_index);
                continue;
            };

            let ctx = DayContext {
                destination: &intent.destination,
                location_label: &weather.location_label,
                day_index,
                total_days,
                weather: daily,
                prior_locations: &prior_locations,
            };

            let mut suggestion =
                match ai::itinerary::generate_day(self.ai.as_ref(), &ctx, language).await {
                    Ok(suggestion) => suggestion,
                    Err(e) => {
                        warn!("Day {} generation failed, skipping: {}", day_index, e);
                        continue;
                    }
                };

            // The only fan-out in the pipeline: the day's three activities
            // are geocoded concurrently and joined before moving on
            let (morning, afternoon, evening) = tokio::join!(
                self.locate(&suggestion.morning.location_name, &intent.destination),
                self.locate(&suggestion.afternoon.location_name, &intent.destination),
                self.locate(&suggestion.evening.location_name, &intent.destination),
            );
            suggestion.morning.coordinates = morning;
            suggestion.afternoon.coordinates = afternoon;
            suggestion.evening.coordinates = evening;

            prior_locations.extend([
                suggestion.morning.location_name.clone(),
                suggestion.afternoon.location_name.clone(),
                suggestion.evening.location_name.clone(),
            ]);

            // The date comes verbatim from the forecast entry at this index
            plans.push(DailyPlan::from_suggestion(daily.date.clone(), suggestion));
        }

        if plans.is_empty() {
            return Err(TabiPlanError::NoPlansGenerated);
        }

        info!(
            "Generated {} of {} requested daily plans",
            plans.len(),
            total_days
        );

        Ok(TripPlan {
            intent,
            weather,
            plans,
        })
    }

    /// Geocode one activity, qualified by the destination city to
    /// disambiguate same-named places worldwide; a miss degrades to a
    /// missing map marker rather than failing the day
    async fn locate(&self, location_name: &str, destination: &str) -> Option<Coordinates> {
        if location_name.trim().is_empty() {
            return None;
        }
        let query = format!("{location_name}, {destination}");
        match self.geocoder.lookup_first(&query).await {
            Ok(Some(result)) => Some(Coordinates {
                lat: result.latitude,
                lng: result.longitude,
            }),
            Ok(None) => {
                debug!("No coordinates found for '{}'", query);
                None
            }
            Err(e) => {
                debug!("Geocoding '{}' failed: {}", query, e);
                None
            }
        }
    }
}

/// One user's planning session
///
/// Rapid repeated queries are not cancelled; instead every submission takes
/// a generation token and any phase update or result belonging to a
/// superseded token is discarded, so a stale response can never overwrite a
/// newer request's state.
pub struct PlanSession {
    planner: Arc<Planner>,
    generation: Arc<AtomicU64>,
    phase: Arc<watch::Sender<PlanPhase>>,
}

impl PlanSession {
    /// Create a session starting in `Idle`
    #[must_use]
    pub fn new(planner: Arc<Planner>) -> Self {
        let (phase, _) = watch::channel(PlanPhase::Idle);
        Self {
            planner,
            generation: Arc::new(AtomicU64::new(0)),
            phase: Arc::new(phase),
        }
    }

    /// Watch the session's published phase
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlanPhase> {
        self.phase.subscribe()
    }

    /// The most recently published phase
    #[must_use]
    pub fn current_phase(&self) -> PlanPhase {
        *self.phase.borrow()
    }

    /// Explicit user reset back to `Idle`; also invalidates any in-flight run
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.phase.send_replace(PlanPhase::Idle);
    }

    /// Run the pipeline for a query
    ///
    /// Returns `None` when a newer submission superseded this one while it
    /// was in flight; the stale result is dropped unseen.
    pub async fn submit(&self, query: &str, language: Language) -> Option<Result<TripPlan>> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (tx, mut rx) = watch::channel(PlanPhase::Idle);
        let phase = Arc::clone(&self.phase);
        let generation = Arc::clone(&self.generation);
        let forwarder = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let update = *rx.borrow_and_update();
                if generation.load(Ordering::SeqCst) == token {
                    phase.send_replace(update);
                }
            }
        });

        let result = self.planner.plan_trip(query, language, &tx).await;
        drop(tx);
        let _ = forwarder.await;

        if self.generation.load(Ordering::SeqCst) != token {
            debug!("Discarding result of superseded request");
            return None;
        }
        Some(result)
    }
}
