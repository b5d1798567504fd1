//! Display languages and bilingual weather descriptions
//!
//! All user-facing text in the application exists in Japanese and English.
//! Services receive the active [`Language`] and pick the matching literal;
//! raw provider error messages are never shown to the user.

use serde::{Deserialize, Serialize};

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Japanese
    Ja,
    /// English
    En,
}

impl Default for Language {
    fn default() -> Self {
        Language::Ja
    }
}

impl Language {
    /// ISO 639-1 code, also used as the transcription language hint
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }

    /// BCP 47 locale for date formatting on the client
    #[must_use]
    pub fn locale(self) -> &'static str {
        match self {
            Language::Ja => "ja-JP",
            Language::En => "en-US",
        }
    }

    /// Parse a language tag, falling back to Japanese (the app default)
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "en" | "en-US" => Language::En,
            _ => Language::Ja,
        }
    }
}

/// Convert an Open-Meteo weather code to a localized description
///
/// Codes outside the table fall back to a generic label in the active
/// language rather than leaking the raw numeric code.
#[must_use]
pub fn describe_weather_code(code: u8, language: Language) -> &'static str {
    match language {
        Language::En => match code {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            48 => "Depositing rime fog",
            51 => "Light drizzle",
            53 => "Moderate drizzle",
            55 => "Dense drizzle",
            56 => "Light freezing drizzle",
            57 => "Dense freezing drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            66 => "Light freezing rain",
            67 => "Heavy freezing rain",
            71 => "Slight snow",
            73 => "Moderate snow",
            75 => "Heavy snow",
            77 => "Snow grains",
            80 => "Light rain showers",
            81 => "Moderate rain showers",
            82 => "Violent rain showers",
            85 => "Light snow showers",
            86 => "Heavy snow showers",
            95 => "Thunderstorm",
            96 => "Thunderstorm with hail",
            99 => "Thunderstorm with heavy hail",
            _ => "Weather",
        },
        Language::Ja => match code {
            0 => "快晴",
            1 => "晴れ",
            2 => "晴れ時々曇り",
            3 => "曇り",
            45 => "霧",
            48 => "着氷性霧",
            51 => "弱い霧雨",
            53 => "やや強い霧雨",
            55 => "激しい霧雨",
            56 => "弱い着氷性霧雨",
            57 => "激しい着氷性霧雨",
            61 => "弱い雨",
            63 => "やや強い雨",
            65 => "激しい雨",
            66 => "弱い着氷性の雨",
            67 => "激しい着氷性の雨",
            71 => "弱い雪",
            73 => "やや強い雪",
            75 => "大雪",
            77 => "霰・雪粒",
            80 => "弱いにわか雨",
            81 => "やや強いにわか雨",
            82 => "激しいにわか雨",
            85 => "弱いにわか雪",
            86 => "激しいにわか雪",
            95 => "雷雨",
            96 => "雷雨（雹）",
            99 => "激しい雷雨（大きな雹）",
            _ => "天気情報",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Ja.code(), "ja");
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::Ja.locale(), "ja-JP");
        assert_eq!(Language::En.locale(), "en-US");
    }

    #[test]
    fn test_from_tag_defaults_to_japanese() {
        assert_eq!(Language::from_tag("en"), Language::En);
        assert_eq!(Language::from_tag("ja"), Language::Ja);
        assert_eq!(Language::from_tag("fr"), Language::Ja);
        assert_eq!(Language::from_tag(""), Language::Ja);
    }

    #[test]
    fn test_weather_code_descriptions() {
        assert_eq!(describe_weather_code(0, Language::En), "Clear sky");
        assert_eq!(describe_weather_code(0, Language::Ja), "快晴");
        assert_eq!(describe_weather_code(95, Language::En), "Thunderstorm");
        assert_eq!(describe_weather_code(95, Language::Ja), "雷雨");
    }

    #[test]
    fn test_unknown_code_falls_back_to_generic_label() {
        assert_eq!(describe_weather_code(42, Language::En), "Weather");
        assert_eq!(describe_weather_code(42, Language::Ja), "天気情報");
        assert_eq!(describe_weather_code(255, Language::En), "Weather");
    }

    #[test]
    fn test_language_serde_form() {
        assert_eq!(serde_json::to_string(&Language::Ja).unwrap(), "\"ja\"");
        let parsed: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Language::En);
    }
}
