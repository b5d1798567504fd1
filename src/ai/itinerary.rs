//! Per-day itinerary generation prompts and parsing

use crate::ai::CompletionProvider;
use crate::i18n::Language;
use crate::models::{DailySuggestion, WeatherDaily};
use crate::{Result, TabiPlanError};
use tracing::{debug, instrument};

const ITINERARY_TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT_JA: &str = r#"あなたはプロの旅行プランナーです。
目的地と特定の日の天気予報に基づいて、1日の旅行プランを作成してください。
以下のキーを持つJSONオブジェクトのみを返してください：
- "morning": { "title": "活動名", "description": "詳細な説明", "locationName": "場所の名前(英語で)" }
- "afternoon": { "title": "活動名", "description": "詳細な説明", "locationName": "場所の名前(英語で)" }
- "evening": { "title": "活動名", "description": "詳細な説明", "locationName": "場所の名前(英語で)" }
- "meal": おすすめの食事スポット（1つだけ）。
- "item": 天気に合わせた必須アイテム（例：雨なら傘、晴れなら日焼け止め）。
- "transport": その都市での移動のヒント（1行）。
- "outfit": 天気と活動に合わせた具体的な服装のアドバイス。

重要: "locationName" はGeocodingのために必ず英語の固有名詞（例: "Senso-ji", "Tokyo Tower"）にしてください。
トーンは親しみやすく、簡潔に。"#;

const SYSTEM_PROMPT_EN: &str = r#"You are a professional travel planner.
Based on the destination and the weather forecast for a specific day, create a one-day itinerary.
Return ONLY a JSON object with exactly these keys:
- "morning": { "title": "Activity Title", "description": "Details", "locationName": "Specific Place Name" }
- "afternoon": { "title": "Activity Title", "description": "Details", "locationName": "Specific Place Name" }
- "evening": { "title": "Activity Title", "description": "Details", "locationName": "Specific Place Name" }
- "meal": One specific recommended dining spot or dish.
- "item": One essential item to pack based on weather (e.g., Umbrella if rain, Sunscreen if sunny).
- "transport": One specific tip for getting around this city.
- "outfit": Detailed outfit recommendation based on weather and activities.

IMPORTANT: "locationName" must be a specific, geocodable place name in English (e.g., "Senso-ji", "Tokyo Tower").
Keep descriptions concise and engaging."#;

/// Everything the generation step needs to know about one trip day
#[derive(Debug)]
pub struct DayContext<'a> {
    /// Destination city, in English
    pub destination: &'a str,
    /// Resolved place label shown in the weather context
    pub location_label: &'a str,
    /// Zero-based index of this day within the trip
    pub day_index: usize,
    /// Total requested trip days
    pub total_days: usize,
    /// Forecast entry for this day
    pub weather: &'a WeatherDaily,
    /// Location names already used on earlier days
    pub prior_locations: &'a [String],
}

fn weather_context(ctx: &DayContext<'_>) -> String {
    format!(
        "Location: {}\nDate: {} (day {} of {})\nTemp: High {:.0}°C / Low {:.0}°C\nCondition: {}\nPrecipitation Chance: {:.0}%",
        ctx.location_label,
        ctx.weather.date,
        ctx.day_index + 1,
        ctx.total_days,
        ctx.weather.max_temp,
        ctx.weather.min_temp,
        ctx.weather.description,
        ctx.weather.precipitation_chance,
    )
}

fn system_prompt(ctx: &DayContext<'_>, language: Language) -> String {
    let base = match language {
        Language::Ja => SYSTEM_PROMPT_JA,
        Language::En => SYSTEM_PROMPT_EN,
    };

    // Soft constraint only; the pipeline performs no structural dedup check
    if ctx.prior_locations.is_empty() {
        return base.to_string();
    }

    let used = ctx.prior_locations.join(", ");
    match language {
        Language::Ja => format!(
            "{base}\n前日までのプランと同じ場所や活動を繰り返さないでください。既に使用した場所：{used}。"
        ),
        Language::En => format!(
            "{base}\nDo not repeat locations or activities already planned on earlier days. Already used: {used}."
        ),
    }
}

/// Generate one day's worth of structured itinerary content
#[instrument(skip(provider, ctx), fields(day_index = ctx.day_index, destination = ctx.destination))]
pub async fn generate_day(
    provider: &dyn CompletionProvider,
    ctx: &DayContext<'_>,
    language: Language,
) -> Result<DailySuggestion> {
    let system = system_prompt(ctx, language);
    let user = format!(
        "Destination: {}\nWeather Context: {}",
        ctx.destination,
        weather_context(ctx)
    );

    let text = provider
        .complete_json(&system, &user, ITINERARY_TEMPERATURE)
        .await?;

    debug!("Raw itinerary response: {} bytes", text.len());

    serde_json::from_str(&text)
        .map_err(|e| TabiPlanError::api(format!("invalid itinerary JSON: {e}")))
}
