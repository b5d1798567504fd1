//! Intent extraction: free-text query to structured [`TravelIntent`]

use crate::ai::CompletionProvider;
use crate::i18n::Language;
use crate::models::TravelIntent;
use crate::{Result, TabiPlanError};
use tracing::{debug, instrument};

const INTENT_TEMPERATURE: f32 = 0.1;

const SYSTEM_PROMPT_JA: &str = r#"あなたは旅行アシスタントです。ユーザーのクエリから目的地と日付と日数を抽出してください。
JSONオブジェクトのみを返してください。キー："destination"（文字列）、"startDate"（文字列）、"days"（数値）。
目的地は必ず**英語**で返してください（例："Tokyo", "Osaka"）。
日付は可能な限りISO形式（YYYY-MM-DD）に変換するか、相対的な言葉（"tomorrow", "next sunday"）をそのまま返してください。
日付が指定されていない場合は "tomorrow" をデフォルトとしてください。
日数は1〜7の数値で返してください。指定がない場合は1としてください。
例：「明日の東京のプラン」→ {"destination": "Tokyo", "startDate": "tomorrow", "days": 1}
例：「3日間の大阪観光」→ {"destination": "Osaka", "startDate": "tomorrow", "days": 3}"#;

const SYSTEM_PROMPT_EN: &str = r#"You are a travel assistant. Extract the destination, start date, and trip length from the user's query.
Return ONLY a JSON object with keys "destination" (string), "startDate" (string), and "days" (number).
For destination, extract the CITY NAME only and return it in **ENGLISH**.
For startDate, try to convert to ISO format (YYYY-MM-DD) if possible, or keep relative terms like "tomorrow", "next sunday".
If the date is not specified, default to "tomorrow".
For days, use the number of days mentioned, between 1 and 7. If not specified, use 1.
Example: "Plan for Tokyo tomorrow" -> {"destination": "Tokyo", "startDate": "tomorrow", "days": 1}
Example: "3 day trip to Osaka" -> {"destination": "Osaka", "startDate": "tomorrow", "days": 3}"#;

/// Extract a travel intent from a free-text query
///
/// The destination comes back in English regardless of the query language so
/// it can be used directly as a geocoding key. Fails with an intent-parse
/// error before any weather or generation cost is spent.
#[instrument(skip(provider, query))]
pub async fn extract_intent(
    provider: &dyn CompletionProvider,
    query: &str,
    language: Language,
    max_days: u8,
) -> Result<TravelIntent> {
    let system_prompt = match language {
        Language::Ja => SYSTEM_PROMPT_JA,
        Language::En => SYSTEM_PROMPT_EN,
    };

    let text = provider
        .complete_json(system_prompt, query, INTENT_TEMPERATURE)
        .await?;

    debug!("Raw intent response: {}", text);

    let mut intent: TravelIntent = serde_json::from_str(&text)
        .map_err(|e| TabiPlanError::intent_parse(format!("invalid intent JSON: {e}")))?;

    if intent.destination.trim().is_empty() {
        return Err(TabiPlanError::intent_parse("empty destination"));
    }

    intent.clamp_days(max_days);
    debug!("Parsed intent: {:?}", intent);

    Ok(intent)
}
