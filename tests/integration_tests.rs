//! Integration tests for the trip planning pipeline
//!
//! External services (Open-Meteo geocoding/forecast and the completion API)
//! are replaced by wiremock doubles; the pipeline itself runs unmodified.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tabiplan::config::{AiConfig, DefaultsConfig, WeatherConfig};
use tabiplan::pipeline::{PlanPhase, PlanSession, Planner};
use tabiplan::{
    CompletionProvider, GeocodingClient, GroqClient, Language, TabiPlanError, WeatherService,
};
use tokio::sync::watch;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn geocode_hit(name: &str, admin1: &str, country: &str, lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "results": [{
            "name": name,
            "admin1": admin1,
            "country": country,
            "latitude": lat,
            "longitude": lng,
        }]
    })
}

fn forecast_payload(dates: &[&str]) -> serde_json::Value {
    let codes = [0u8, 61, 2, 3, 1, 45, 95];
    json!({
        "timezone": "Asia/Tokyo",
        "current": {"temperature_2m": 28.4, "precipitation": 0.0, "weather_code": 0},
        "daily": {
            "time": dates,
            "temperature_2m_max": dates.iter().enumerate().map(|(i, _)| 30.0 + i as f32).collect::<Vec<_>>(),
            "temperature_2m_min": dates.iter().enumerate().map(|(i, _)| 24.0 + i as f32).collect::<Vec<_>>(),
            "precipitation_probability_max": dates.iter().enumerate().map(|(i, _)| 10.0 * i as f32).collect::<Vec<_>>(),
            "weather_code": dates.iter().enumerate().map(|(i, _)| codes[i % codes.len()]).collect::<Vec<_>>(),
        }
    })
}

/// Wrap inner JSON the way the chat completions API returns it
fn chat_body(content: &serde_json::Value) -> serde_json::Value {
    json!({"choices": [{"message": {"content": content.to_string()}}]})
}

fn intent_content(destination: &str, days: u8) -> serde_json::Value {
    json!({"destination": destination, "startDate": "tomorrow", "days": days})
}

fn suggestion_content() -> serde_json::Value {
    json!({
        "morning": {"title": "Temple walk", "description": "Start in Asakusa", "locationName": "Senso-ji"},
        "afternoon": {"title": "City views", "description": "Observation deck", "locationName": "Tokyo Tower"},
        "evening": {"title": "Neon crossing", "description": "People watching", "locationName": "Shibuya Crossing"},
        "meal": "Ramen at Ichiran",
        "item": "Sunscreen",
        "transport": "Get a Suica card",
        "outfit": "Light clothing and comfortable shoes"
    })
}

fn planner_for(server: &MockServer) -> Planner {
    let ai_config = AiConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        ..AiConfig::default()
    };
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(GroqClient::new(&ai_config).expect("client should build"));

    let weather_config = WeatherConfig {
        geocode_base_url: server.uri(),
        forecast_base_url: server.uri(),
        ..WeatherConfig::default()
    };
    let http = reqwest::Client::new();
    let weather = WeatherService::new(http.clone(), &weather_config);
    let geocoder = GeocodingClient::new(http, server.uri());

    Planner::new(provider, weather, geocoder, &DefaultsConfig::default())
}

async fn mount_tokyo_geocoding(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_hit(
            "Tokyo",
            "Tokyo",
            "Japan",
            35.6895,
            139.6917,
        )))
        .mount(server)
        .await;
}

async fn mount_activity_geocoding(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Senso-ji, Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_hit(
            "Senso-ji",
            "Tokyo",
            "Japan",
            35.7148,
            139.7967,
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Tokyo Tower, Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocode_hit(
            "Tokyo Tower",
            "Tokyo",
            "Japan",
            35.6586,
            139.7454,
        )))
        .mount(server)
        .await;

    // One deliberate miss: the evening activity stays without coordinates
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Shibuya Crossing, Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn three_day_trip_produces_three_dated_plans() {
    let server = MockServer::start().await;
    mount_tokyo_geocoding(&server).await;
    mount_activity_geocoding(&server).await;

    // A 3-day trip must still request the 5-day forecast floor
    let dates = ["2026-08-08", "2026-08-09", "2026-08-10", "2026-08-11", "2026-08-12"];
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(&dates)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel assistant"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body(&intent_content("Tokyo", 3))),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel planner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&suggestion_content())))
        .expect(3)
        .mount(&server)
        .await;

    let planner = planner_for(&server);
    let (tx, rx) = watch::channel(PlanPhase::Idle);
    let plan = planner
        .plan_trip("3 day trip to Tokyo starting tomorrow", Language::En, &tx)
        .await
        .expect("pipeline should succeed");

    assert_eq!(plan.intent.destination, "Tokyo");
    assert_eq!(plan.intent.days, 3);
    assert_eq!(plan.weather.forecast.len(), 5);
    assert_eq!(plan.plans.len(), 3);

    // Dates come verbatim from the forecast entry at each generation index
    for (index, daily_plan) in plan.plans.iter().enumerate() {
        assert_eq!(daily_plan.date, dates[index]);
        assert!(!daily_plan.meal.is_empty());
        assert!(!daily_plan.item.is_empty());
        assert!(!daily_plan.transport.is_empty());
        assert!(!daily_plan.outfit.is_empty());
    }

    // Geocoded activities carry coordinates; the miss degrades gracefully
    let first = &plan.plans[0];
    assert!(first.morning.coordinates.is_some());
    assert!(first.afternoon.coordinates.is_some());
    assert!(first.evening.coordinates.is_none());

    assert_eq!(*rx.borrow(), PlanPhase::Success);
}

#[tokio::test]
async fn japanese_query_yields_localized_weather_and_one_plan() {
    let server = MockServer::start().await;
    mount_tokyo_geocoding(&server).await;
    mount_activity_geocoding(&server).await;

    let dates = ["2026-08-08", "2026-08-09", "2026-08-10", "2026-08-11", "2026-08-12"];
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(&dates)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("旅行アシスタント"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body(&intent_content("Tokyo", 1))),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("旅行プランナー"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&suggestion_content())))
        .expect(1)
        .mount(&server)
        .await;

    let planner = planner_for(&server);
    let (tx, _rx) = watch::channel(PlanPhase::Idle);
    let plan = planner
        .plan_trip("東京の明日のプラン", Language::Ja, &tx)
        .await
        .expect("pipeline should succeed");

    // Destination stays English internally; weather text is Japanese
    assert_eq!(plan.intent.destination, "Tokyo");
    assert_eq!(plan.plans.len(), 1);
    assert_eq!(plan.weather.forecast[0].description, "快晴");
    assert_eq!(plan.weather.current.description, "快晴");
    assert_eq!(plan.plans[0].date, dates[0]);
}

#[tokio::test]
async fn unresolvable_destination_stops_before_weather_and_generation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Zzzzznotacity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel assistant"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body(&intent_content("Zzzzznotacity", 2))),
        )
        .mount(&server)
        .await;

    // Neither the forecast nor the generation service may be called
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel planner"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let planner = planner_for(&server);
    let (tx, rx) = watch::channel(PlanPhase::Idle);
    let err = planner
        .plan_trip("Trip to Zzzzznotacity", Language::En, &tx)
        .await
        .expect_err("pipeline should fail");

    assert!(matches!(err, TabiPlanError::LocationNotFound { .. }));
    assert!(err.user_message(Language::En).contains("find that location"));
    assert!(err.user_message(Language::Ja).contains("見つかりませんでした"));
    assert_eq!(*rx.borrow(), PlanPhase::Error);
}

#[tokio::test]
async fn failed_day_is_skipped_and_partial_result_returned() {
    let server = MockServer::start().await;
    mount_tokyo_geocoding(&server).await;
    mount_activity_geocoding(&server).await;

    let dates = ["2026-08-08", "2026-08-09", "2026-08-10", "2026-08-11", "2026-08-12"];
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(&dates)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel assistant"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body(&intent_content("Tokyo", 2))),
        )
        .mount(&server)
        .await;

    // Day 0 comes back malformed and is skipped; day 1 succeeds
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel planner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "sorry, no JSON today"}}]
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel planner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&suggestion_content())))
        .with_priority(2)
        .mount(&server)
        .await;

    let planner = planner_for(&server);
    let (tx, _rx) = watch::channel(PlanPhase::Idle);
    let plan = planner
        .plan_trip("2 day trip to Tokyo", Language::En, &tx)
        .await
        .expect("partial result is still a success");

    assert_eq!(plan.plans.len(), 1);
    assert_eq!(plan.plans[0].date, dates[1]);
}

#[tokio::test]
async fn short_forecast_skips_days_beyond_its_end() {
    let server = MockServer::start().await;
    mount_tokyo_geocoding(&server).await;
    mount_activity_geocoding(&server).await;

    // The weather service only has two days despite the 5-day request
    let dates = ["2026-08-08", "2026-08-09"];
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(&dates)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel assistant"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body(&intent_content("Tokyo", 3))),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel planner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&suggestion_content())))
        .expect(2)
        .mount(&server)
        .await;

    let planner = planner_for(&server);
    let (tx, _rx) = watch::channel(PlanPhase::Idle);
    let plan = planner
        .plan_trip("3 day trip to Tokyo", Language::En, &tx)
        .await
        .expect("pipeline should succeed with the days it has");

    assert_eq!(plan.plans.len(), 2);
}

#[tokio::test]
async fn all_days_failing_is_a_pipeline_error() {
    let server = MockServer::start().await;
    mount_tokyo_geocoding(&server).await;

    let dates = ["2026-08-08", "2026-08-09", "2026-08-10", "2026-08-11", "2026-08-12"];
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(&dates)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel assistant"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body(&intent_content("Tokyo", 2))),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel planner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "still not JSON"}}]
        })))
        .mount(&server)
        .await;

    let planner = planner_for(&server);
    let (tx, rx) = watch::channel(PlanPhase::Idle);
    let err = planner
        .plan_trip("2 day trip to Tokyo", Language::En, &tx)
        .await
        .expect_err("no generated day should fail the pipeline");

    assert!(matches!(err, TabiPlanError::NoPlansGenerated));
    assert_eq!(*rx.borrow(), PlanPhase::Error);
}

#[tokio::test]
async fn superseded_submission_is_discarded() {
    let server = MockServer::start().await;
    mount_tokyo_geocoding(&server).await;
    mount_activity_geocoding(&server).await;

    let dates = ["2026-08-08", "2026-08-09", "2026-08-10", "2026-08-11", "2026-08-12"];
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(&dates)))
        .mount(&server)
        .await;

    // The first query's intent call is slow; a second query overtakes it
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("slow trip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body(&intent_content("Tokyo", 1)))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("fast trip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body(&intent_content("Tokyo", 1))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("travel planner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&suggestion_content())))
        .mount(&server)
        .await;

    let session = Arc::new(PlanSession::new(Arc::new(planner_for(&server))));

    let stale = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit("slow trip to Tokyo", Language::En).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let fresh = session.submit("fast trip to Tokyo", Language::En).await;

    let stale = stale.await.expect("task should not panic");
    assert!(stale.is_none(), "superseded run must be discarded");

    let fresh = fresh.expect("latest run must be kept").expect("and succeed");
    assert_eq!(fresh.plans.len(), 1);
    assert_eq!(session.current_phase(), PlanPhase::Success);

    // An explicit reset is the only way back to idle
    session.reset();
    assert_eq!(session.current_phase(), PlanPhase::Idle);
}
