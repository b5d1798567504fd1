use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tabiplan::api::AppState;
use tabiplan::{
    CompletionProvider, GeocodingClient, GroqClient, PlanSession, Planner, TabiPlanConfig,
    VoiceGate, WeatherService,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = TabiPlanConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    tracing::info!("Starting TabiPlan v{}", tabiplan::VERSION);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.weather.timeout_seconds.into()))
        .user_agent(concat!("tabiplan/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    let provider: Arc<dyn CompletionProvider> = Arc::new(GroqClient::new(&config.ai)?);
    let weather = WeatherService::new(http.clone(), &config.weather);
    let geocoder = GeocodingClient::new(http, config.weather.geocode_base_url.clone());
    let planner = Arc::new(Planner::new(
        Arc::clone(&provider),
        weather.clone(),
        geocoder,
        &config.defaults,
    ));

    let state = AppState {
        session: Arc::new(PlanSession::new(planner)),
        gate: Arc::new(VoiceGate::new(provider, config.voice.clone())),
        weather: Arc::new(weather),
    };

    tabiplan::web::run(state, config.server.port).await
}
