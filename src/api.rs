//! HTTP API for the planning pipeline, speech gate, and weather lookups
//!
//! Error bodies carry a machine-readable kind for the frontend plus a
//! human-readable message localized to the request's display language; raw
//! service errors never reach the user.

use crate::TabiPlanError;
use crate::i18n::Language;
use crate::models::{TripPlan, WeatherSummary};
use crate::pipeline::PlanSession;
use crate::voice::{GateOutcome, GateRejection, StopDecision, VoiceGate};
use crate::weather::WeatherService;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Shared handler state; every collaborator is injected at startup
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<PlanSession>,
    pub gate: Arc<VoiceGate>,
    pub weather: Arc<WeatherService>,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plan", post(create_plan))
        .route("/transcribe", post(transcribe))
        .route("/weather", get(get_weather))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PlanRequest {
    query: String,
    #[serde(default)]
    language: Language,
}

#[derive(Debug, Serialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    location: String,
    #[serde(default = "default_weather_days")]
    days: u8,
    #[serde(default)]
    language: Language,
}

fn default_weather_days() -> u8 {
    5
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: &'static str,
    message: &'static str,
}

/// Localized API error response
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: &'static str,
}

impl ApiError {
    fn from_planner(err: &TabiPlanError, language: Language) -> Self {
        let status = match err {
            TabiPlanError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            TabiPlanError::IntentParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TabiPlanError::Validation { .. } => StatusCode::BAD_REQUEST,
            TabiPlanError::WeatherFetch { .. }
            | TabiPlanError::NoPlansGenerated
            | TabiPlanError::Transcription { .. }
            | TabiPlanError::Api { .. } => StatusCode::BAD_GATEWAY,
            TabiPlanError::Config { .. } | TabiPlanError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            kind: err.kind(),
            message: err.user_message(language),
        }
    }

    fn from_rejection(rejection: GateRejection, language: Language) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            kind: rejection.kind(),
            message: rejection.user_message(language),
        }
    }

    fn recorder_busy(language: Language) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            kind: "recorder_busy",
            message: TabiPlanError::validation("busy").user_message(language),
        }
    }

    fn superseded(language: Language) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            kind: "superseded",
            message: TabiPlanError::validation("superseded").user_message(language),
        }
    }

    fn bad_request(language: Language) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: TabiPlanError::validation("invalid request").user_message(language),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                error: self.kind,
                message: self.message,
            }),
        )
            .into_response()
    }
}

async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<TripPlan>, ApiError> {
    let language = request.language;
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request(language));
    }

    match state.session.submit(&request.query, language).await {
        Some(Ok(plan)) => Ok(Json(plan)),
        Some(Err(e)) => Err(ApiError::from_planner(&e, language)),
        None => Err(ApiError::superseded(language)),
    }
}

/// Server half of the speech capture gate: receives a finished clip with
/// the duration and peak amplitude the client observed while recording
async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut audio: Option<(Vec<u8>, String)> = None;
    let mut language = Language::default();
    let mut duration_ms: u64 = 0;
    let mut peak_level: f32 = 0.0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request(language))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                let mime = field
                    .content_type()
                    .unwrap_or("audio/webm")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request(language))?;
                audio = Some((bytes.to_vec(), mime));
            }
            Some("language") => {
                let tag = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request(language))?;
                language = Language::from_tag(&tag);
            }
            Some("duration_ms") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request(language))?;
                duration_ms = text.trim().parse().unwrap_or(0);
            }
            Some("peak_level") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request(language))?;
                peak_level = text.trim().parse().unwrap_or(0.0);
            }
            _ => {}
        }
    }

    let (bytes, mime) = audio.ok_or_else(|| ApiError::bad_request(language))?;

    let mut session = state
        .gate
        .begin(mime)
        .map_err(|_| ApiError::recorder_busy(language))?;
    session.push_chunk(&bytes);
    session.push_level(peak_level);

    match session.stop_with_elapsed(Duration::from_millis(duration_ms)) {
        StopDecision::Rejected(rejection) => Err(ApiError::from_rejection(rejection, language)),
        StopDecision::Captured(captured) => {
            match state.gate.transcribe(captured, language).await {
                GateOutcome::Delivered(text) => Ok(Json(TranscribeResponse { text })),
                GateOutcome::Rejected(rejection) => {
                    Err(ApiError::from_rejection(rejection, language))
                }
            }
        }
    }
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherSummary>, ApiError> {
    if query.location.trim().is_empty() {
        return Err(ApiError::bad_request(query.language));
    }
    let summary = state
        .weather
        .fetch_summary(&query.location, query.days.max(1), query.language)
        .await
        .map_err(|e| ApiError::from_planner(&e, query.language))?;
    Ok(Json(summary))
}
