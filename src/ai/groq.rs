//! Groq API client (OpenAI-compatible chat completions and transcription)

use crate::ai::{AudioClip, CompletionProvider};
use crate::config::AiConfig;
use crate::i18n::Language;
use crate::{Result, TabiPlanError};
use async_trait::async_trait;
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP client for the Groq completion API
///
/// Constructed explicitly and injected wherever a [`CompletionProvider`] is
/// needed; there is deliberately no process-wide cached instance.
pub struct GroqClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    transcription_model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl GroqClient {
    /// Create a new client from configuration
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().map_err(|e| {
            TabiPlanError::config(format!("Completion API key unavailable: {e}"))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("tabiplan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TabiPlanError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: config.chat_model.clone(),
            transcription_model: config.transcription_model.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    #[instrument(skip(self, system_prompt, user_prompt))]
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TabiPlanError::api(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TabiPlanError::api(format!(
                "completion API returned HTTP {}",
                response.status()
            )));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| TabiPlanError::api(format!("invalid completion payload: {e}")))?;

        let text = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(TabiPlanError::api("empty completion"));
        }

        debug!("Completion response: {} bytes", text.len());
        Ok(text)
    }

    #[instrument(skip(self, clip), fields(payload_bytes = clip.bytes.len()))]
    async fn transcribe(&self, clip: AudioClip, language: Language) -> Result<String> {
        let file = multipart::Part::bytes(clip.bytes)
            .file_name("audio.webm")
            .mime_str(&clip.mime_type)
            .map_err(|e| TabiPlanError::transcription(format!("invalid audio mime type: {e}")))?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("model", self.transcription_model.clone())
            .text("language", language.code())
            .text("response_format", "json")
            .text("temperature", "0");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TabiPlanError::transcription(format!("transcription request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TabiPlanError::transcription(format!(
                "transcription API returned HTTP {}",
                response.status()
            )));
        }

        let payload: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TabiPlanError::transcription(format!("invalid transcription payload: {e}")))?;

        Ok(payload.text)
    }
}
