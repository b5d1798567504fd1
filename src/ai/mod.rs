//! Completion and transcription provider abstraction
//!
//! The pipeline and the speech gate talk to the language-model service
//! through the [`CompletionProvider`] trait so tests can substitute doubles.
//! The production implementation is [`GroqClient`].

pub mod groq;
pub mod intent;
pub mod itinerary;

pub use groq::GroqClient;

use crate::Result;
use crate::i18n::Language;
use async_trait::async_trait;

/// Encoded audio captured by a recording session
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// MIME type of the encoded payload, e.g. "audio/webm"
    pub mime_type: String,
}

impl AudioClip {
    /// Create a clip from encoded bytes
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Interface to the external completion API
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run a single-turn chat completion constrained to a JSON object
    /// response and return the raw response text
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String>;

    /// Transcribe an audio clip, using the display language as a hint
    async fn transcribe(&self, clip: AudioClip, language: Language) -> Result<String>;
}
